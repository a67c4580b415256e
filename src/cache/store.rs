//! Cache Store Module
//!
//! The public cache: coordinates the memory tier, the disk tier and lazy
//! expiration.
//!
//! Every operation touches the memory tier synchronously on the caller's
//! thread and defers its disk half to the instance's disk worker. The two
//! tiers are not transactional: a write whose disk half fails stays
//! memory-only until it is evicted or the process exits.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{
    codec, CacheEntry, CacheIdentifier, CacheStats, Completion, DiskTier, ExpiresAfter,
    MemoryTier,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_disk_worker, DiskQueue};

// == Cache Location ==
/// The tier that served a read or ended up holding a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheLocation {
    Memory,
    Disk,
}

/// A value found by [`Cache::get`].
#[derive(Debug, Clone, PartialEq)]
pub struct Hit<V> {
    pub value: V,
    pub location: CacheLocation,
}

struct Inner<V> {
    name: String,
    root: Option<PathBuf>,
    memory: Mutex<MemoryTier<V>>,
    stats: Mutex<CacheStats>,
    queue: DiskQueue,
}

// == Cache ==
/// Two-tier key/value cache.
///
/// Cloning is cheap and every clone shares the same tiers and disk worker.
/// Separate caches opened with the same name share only the directory: last
/// atomic write wins, memory tiers are independent.
pub struct Cache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> std::fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.inner.name)
            .field("root", &self.inner.root)
            .finish_non_exhaustive()
    }
}

impl<V> Cache<V>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    // == Open ==
    /// Opens a cache named `name` using configuration from the environment.
    ///
    /// See [`Cache::open_with`].
    pub fn open(name: &str) -> Result<Self> {
        Self::open_with(name, CacheConfig::from_env())
    }

    /// Opens a cache named `name`.
    ///
    /// The disk root is `<base>/<app identifier>.<name>`; it is created on the
    /// disk worker, never on the caller's thread. If it cannot be resolved
    /// the cache runs memory-only.
    ///
    /// # Errors
    /// Returns `Runtime` when called outside a Tokio runtime.
    pub fn open_with(name: &str, config: CacheConfig) -> Result<Self> {
        let disk = DiskTier::resolve(name, &config).unwrap_or_else(|e| {
            warn!(cache = name, error = %e, "disk tier unavailable, running memory-only");
            DiskTier::unavailable()
        });
        let root = disk.root_path(false).ok();

        let (queue, _worker) = spawn_disk_worker(disk)?;
        queue.submit("prepare", |disk| {
            if let Err(e) = disk.root_path(true) {
                warn!(error = %e, "failed to create cache directory");
            }
        });

        info!(
            cache = name,
            root = ?root,
            memory_capacity = config.memory_capacity,
            "cache opened"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                name: name.to_string(),
                root,
                memory: Mutex::new(MemoryTier::new(config.memory_capacity)),
                stats: Mutex::new(CacheStats::new()),
                queue,
            }),
        })
    }

    // == Get ==
    /// Looks up `key`.
    ///
    /// A fresh memory entry resolves immediately. An expired memory entry
    /// resolves to `None` without consulting disk. Otherwise the disk tier is
    /// read on the worker; a fresh, decodable entry is copied back into memory
    /// and reported with [`CacheLocation::Disk`]. Missing, unreadable,
    /// corrupt and expired files all resolve to `None`. Expired entries are
    /// never deleted here.
    ///
    /// # Errors
    /// Returns `InvalidKey` if the key cannot be hashed.
    pub fn get(&self, key: &str) -> Result<Completion<Option<Hit<V>>>> {
        let id = CacheIdentifier::from_key(key)?;

        let (cached, seen_revision) = {
            let mut memory = self.inner.memory.lock();
            (memory.get(&id), memory.revision())
        };

        if let Some(entry) = cached {
            if entry.is_expired() {
                debug!(key, "memory entry expired");
                self.inner.stats.lock().record_miss();
                return Ok(Completion::ready(None));
            }

            debug!(key, "memory hit");
            self.inner.stats.lock().record_memory_hit();
            return Ok(Completion::ready(Some(Hit {
                value: entry.payload.clone(),
                location: CacheLocation::Memory,
            })));
        }

        let (tx, completion) = Completion::channel(None);
        let inner = Arc::clone(&self.inner);
        self.inner.queue.submit("read", move |disk| {
            let hit = inner.read_through(disk, id, seen_revision);
            let _ = tx.send(hit);
        });

        Ok(completion)
    }

    // == Set ==
    /// Stores `value` under `key`, optionally expiring `expires_after` past
    /// now.
    ///
    /// The memory tier is updated before this returns. The completion
    /// resolves to [`CacheLocation::Disk`] once the entry file is written, or
    /// [`CacheLocation::Memory`] if encoding or writing failed.
    ///
    /// # Errors
    /// Returns `InvalidKey` if the key cannot be hashed; nothing is stored.
    pub fn set(
        &self,
        key: &str,
        value: V,
        expires_after: Option<ExpiresAfter>,
    ) -> Result<Completion<CacheLocation>> {
        let id = CacheIdentifier::from_key(key)?;
        let entry = Arc::new(CacheEntry::new(key, value, expires_after));

        self.inner.memory.lock().put(id.clone(), Arc::clone(&entry));

        let (tx, completion) = Completion::channel(CacheLocation::Memory);
        let inner = Arc::clone(&self.inner);
        self.inner.queue.submit("write", move |disk| {
            let written = codec::encode(entry.as_ref()).and_then(|bytes| disk.write(&id, &bytes));
            let location = match written {
                Ok(()) => CacheLocation::Disk,
                Err(e) => {
                    warn!(
                        key = %entry.original_key,
                        error = %e,
                        "disk write failed, entry is memory-only"
                    );
                    inner.stats.lock().record_disk_write_failure();
                    CacheLocation::Memory
                }
            };
            let _ = tx.send(location);
        });

        Ok(completion)
    }

    // == Remove ==
    /// Removes `key` from both tiers. Removing an absent key is a no-op.
    ///
    /// # Errors
    /// Returns `InvalidKey` if the key cannot be hashed.
    pub fn remove(&self, key: &str) -> Result<Completion<()>> {
        let id = CacheIdentifier::from_key(key)?;
        self.inner.memory.lock().remove(&id);

        let (tx, completion) = Completion::channel(());
        self.inner.queue.submit("remove", move |disk| {
            if let Err(e) = disk.remove(&id) {
                warn!(id = %id, error = %e, "failed to remove entry file");
            }
            let _ = tx.send(());
        });

        Ok(completion)
    }

    // == Clear ==
    /// Removes every entry from both tiers. The cache stays usable.
    pub fn clear(&self) -> Completion<()> {
        self.inner.memory.lock().clear();

        let (tx, completion) = Completion::channel(());
        self.inner.queue.submit("clear", move |disk| {
            if let Err(e) = disk.clear_all() {
                warn!(error = %e, "failed to clear cache directory");
            }
            let _ = tx.send(());
        });

        completion
    }
}

impl<V> Cache<V> {
    // == Evict ==
    /// Drops `key` from the memory tier only, as memory pressure would. The
    /// entry file is untouched and a later `get` reads it back from disk.
    ///
    /// Returns whether an entry was dropped.
    ///
    /// # Errors
    /// Returns `InvalidKey` if the key cannot be hashed.
    pub fn evict(&self, key: &str) -> Result<bool> {
        let id = CacheIdentifier::from_key(key)?;
        Ok(self.inner.memory.lock().evict(&id))
    }

    // == Flush ==
    /// Resolves once every disk operation submitted before it has finished.
    pub fn flush(&self) -> Completion<()> {
        let (tx, completion) = Completion::channel(());
        self.inner.queue.submit("flush", move |_| {
            let _ = tx.send(());
        });
        completion
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let (evictions, memory_entries) = {
            let memory = self.inner.memory.lock();
            (memory.evictions(), memory.len())
        };

        let mut stats = self.inner.stats.lock().clone();
        stats.evictions = evictions;
        stats.memory_entries = memory_entries;
        stats
    }

    /// The name the cache was opened with.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Root directory of the disk tier, None when running memory-only.
    pub fn root_path(&self) -> Option<&PathBuf> {
        self.inner.root.as_ref()
    }

    /// Path of the entry file `key` maps to.
    ///
    /// # Errors
    /// Returns `InvalidKey` if the key cannot be hashed and `DirectoryUnavailable`
    /// when running memory-only.
    pub fn entry_path(&self, key: &str) -> Result<PathBuf> {
        let id = CacheIdentifier::from_key(key)?;
        self.inner
            .root
            .as_ref()
            .map(|root| root.join(id.as_str()))
            .ok_or_else(|| CacheError::directory_unavailable("cache is memory-only"))
    }
}

impl<V> Inner<V>
where
    V: DeserializeOwned + Clone,
{
    /// Disk half of `get`; runs on the worker.
    fn read_through(
        &self,
        disk: &DiskTier,
        id: CacheIdentifier,
        seen_revision: u64,
    ) -> Option<Hit<V>> {
        let entry = match disk.read(&id).and_then(|bytes| codec::decode::<V>(&bytes)) {
            Ok(entry) => entry,
            Err(CacheError::NotFound(_)) => {
                debug!(id = %id, "miss");
                self.stats.lock().record_miss();
                return None;
            }
            Err(e) => {
                warn!(id = %id, error = %e, "unreadable entry treated as miss");
                self.stats.lock().record_miss();
                return None;
            }
        };

        if entry.is_expired() {
            debug!(key = %entry.original_key, "disk entry expired");
            self.stats.lock().record_miss();
            return None;
        }

        let value = entry.payload.clone();
        let filled = self
            .memory
            .lock()
            .fill(id, Arc::new(entry), seen_revision);
        if !filled {
            debug!("memory tier changed during disk read, not repopulating");
        }

        self.stats.lock().record_disk_hit();
        Some(Hit {
            value,
            location: CacheLocation::Disk,
        })
    }
}
