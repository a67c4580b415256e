//! Memory Tier Module
//!
//! Bounded in-process map from identifier to entry with LRU eviction.
//! Never performs I/O; a `put` is no promise that a later `get` will hit.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use crate::cache::{CacheEntry, CacheIdentifier};

// == Memory Tier ==
/// Volatile tier of the cache.
#[derive(Debug)]
pub struct MemoryTier<V> {
    /// Identifier to entry storage, least recently used evicted first
    entries: LruCache<CacheIdentifier, Arc<CacheEntry<V>>>,
    /// Bumped on every caller-driven mutation
    revision: u64,
    /// Entries dropped by capacity pressure or `evict`
    evictions: u64,
}

impl<V> MemoryTier<V> {
    // == Constructor ==
    /// Creates an empty tier holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            revision: 0,
            evictions: 0,
        }
    }

    // == Get ==
    /// Looks up an entry and marks it recently used.
    pub fn get(&mut self, id: &CacheIdentifier) -> Option<Arc<CacheEntry<V>>> {
        self.entries.get(id).cloned()
    }

    // == Put ==
    /// Stores an entry, replacing any previous one for `id`.
    pub fn put(&mut self, id: CacheIdentifier, entry: Arc<CacheEntry<V>>) {
        self.revision += 1;
        self.insert(id, entry);
    }

    // == Fill ==
    /// Stores an entry read back from disk, but only if the tier has not
    /// been mutated since `seen_revision`.
    ///
    /// Returns whether the entry was stored.
    pub fn fill(
        &mut self,
        id: CacheIdentifier,
        entry: Arc<CacheEntry<V>>,
        seen_revision: u64,
    ) -> bool {
        if self.revision != seen_revision {
            return false;
        }
        self.insert(id, entry);
        true
    }

    // == Remove ==
    /// Removes an entry. Absence is not an error.
    pub fn remove(&mut self, id: &CacheIdentifier) -> Option<Arc<CacheEntry<V>>> {
        self.revision += 1;
        self.entries.pop(id)
    }

    // == Evict ==
    /// Drops an entry the way memory pressure would.
    ///
    /// Unlike [`MemoryTier::remove`] this does not count as a mutation, so
    /// reads in flight may still repopulate the entry.
    pub fn evict(&mut self, id: &CacheIdentifier) -> bool {
        if self.entries.pop(id).is_some() {
            self.evictions += 1;
            true
        } else {
            false
        }
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        self.revision += 1;
        self.entries.clear();
    }

    /// Current mutation revision.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, id: CacheIdentifier, entry: Arc<CacheEntry<V>>) {
        // `push` hands back either the replaced value for `id` or the least
        // recently used entry it pushed out.
        if let Some((displaced, _)) = self.entries.push(id.clone(), entry) {
            if displaced != id {
                self.evictions += 1;
            }
        }
    }
}
