//! Disk Tier Module
//!
//! One file per identifier under a per-cache root directory. All methods
//! block on file I/O and are only ever called from the disk worker.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::cache::CacheIdentifier;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Disk Tier ==
/// Persistent tier of the cache.
#[derive(Debug, Clone)]
pub struct DiskTier {
    /// Resolved root, None when no location could be determined
    root: Option<PathBuf>,
}

impl DiskTier {
    // == Constructor ==
    /// Creates a tier rooted at an explicit directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Creates a tier with no usable directory; every operation fails with
    /// `DirectoryUnavailable`.
    pub fn unavailable() -> Self {
        Self { root: None }
    }

    // == Resolve ==
    /// Resolves `<base>/<app identifier>.<name>` where base is the configured
    /// root directory or the platform cache directory.
    ///
    /// Does not touch the filesystem.
    pub fn resolve(name: &str, config: &CacheConfig) -> Result<Self> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(CacheError::directory_unavailable(format!(
                "cache name '{}' is not a single path component",
                name
            )));
        }

        let base = match &config.root_dir {
            Some(dir) => dir.clone(),
            None => dirs::cache_dir().ok_or_else(|| {
                CacheError::directory_unavailable("could not determine platform cache directory")
            })?,
        };

        Ok(Self::new(
            base.join(format!("{}.{}", config.app_identifier, name)),
        ))
    }

    // == Root Path ==
    /// Returns the root directory, creating it (and its parents) if asked.
    ///
    /// Creating is idempotent.
    pub fn root_path(&self, create: bool) -> Result<PathBuf> {
        let root = self
            .root
            .clone()
            .ok_or_else(|| CacheError::directory_unavailable("no cache directory resolved"))?;

        if create {
            fs::create_dir_all(&root).map_err(|e| CacheError::DirectoryUnavailable {
                reason: format!("failed to create {}", root.display()),
                source: Some(e),
            })?;
        }

        Ok(root)
    }

    /// Path of the entry file for `id`.
    pub fn entry_path(&self, id: &CacheIdentifier) -> Result<PathBuf> {
        Ok(self.root_path(false)?.join(id.as_str()))
    }

    // == Write ==
    /// Atomically replaces the entry file for `id` with `bytes`.
    ///
    /// The bytes go to a temporary file in the same directory which is then
    /// renamed over the target, so readers see either the old or the new
    /// content. On failure the previous file is left untouched.
    pub fn write(&self, id: &CacheIdentifier, bytes: &[u8]) -> Result<()> {
        let root = self.root_path(true)?;
        let path = root.join(id.as_str());
        let write_failed = |source: io::Error| CacheError::WriteFailed {
            path: path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&root).map_err(write_failed)?;
        tmp.write_all(bytes).map_err(write_failed)?;
        tmp.as_file().sync_all().map_err(write_failed)?;
        tmp.persist(&path).map_err(|e| write_failed(e.error))?;

        debug!(id = %id, bytes = bytes.len(), "entry written");
        Ok(())
    }

    // == Read ==
    /// Reads the entry file for `id`.
    ///
    /// # Errors
    /// `NotFound` if no file exists, `ReadFailed` if it exists but cannot be
    /// read.
    pub fn read(&self, id: &CacheIdentifier) -> Result<Vec<u8>> {
        let path = self.entry_path(id)?;
        fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => CacheError::NotFound(id.to_string()),
            _ => CacheError::ReadFailed { path, source },
        })
    }

    // == Remove ==
    /// Deletes the entry file for `id`. A missing file is not an error.
    pub fn remove(&self, id: &CacheIdentifier) -> Result<()> {
        let path = self.entry_path(id)?;
        remove_if_present(&path, |p| fs::remove_file(p))
    }

    // == Clear All ==
    /// Deletes the root directory with everything in it, then recreates it.
    pub fn clear_all(&self) -> Result<()> {
        let root = self.root_path(false)?;
        remove_if_present(&root, |p| fs::remove_dir_all(p))?;
        self.root_path(true)?;
        debug!(root = %root.display(), "cache directory cleared");
        Ok(())
    }
}

fn remove_if_present(path: &Path, op: fn(&Path) -> io::Result<()>) -> Result<()> {
    match op(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(CacheError::WriteFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}
