//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Namespace used when no application identifier is configured.
pub const DEFAULT_APP_IDENTIFIER: &str = "duocache";

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries the memory tier holds before evicting
    pub memory_capacity: usize,
    /// Overrides the platform cache directory when set
    pub root_dir: Option<PathBuf>,
    /// Application identifier prefixed to every cache directory name
    pub app_identifier: String,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DUOCACHE_MEMORY_CAPACITY` - Memory tier capacity (default: 1000)
    /// - `DUOCACHE_ROOT_DIR` - Base directory for cache roots (default: platform cache dir)
    /// - `DUOCACHE_APP_ID` - Application identifier (default: `duocache`)
    pub fn from_env() -> Self {
        Self {
            memory_capacity: env::var("DUOCACHE_MEMORY_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&capacity| capacity > 0)
                .unwrap_or(1000),
            root_dir: env::var_os("DUOCACHE_ROOT_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            app_identifier: env::var("DUOCACHE_APP_ID")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_APP_IDENTIFIER.to_string()),
        }
    }

    /// Returns a copy of this configuration rooted at `dir`.
    pub fn with_root_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(dir.into());
        self
    }

    /// Returns a copy of this configuration with a different memory capacity.
    pub fn with_memory_capacity(mut self, capacity: usize) -> Self {
        self.memory_capacity = capacity;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_capacity: 1000,
            root_dir: None,
            app_identifier: DEFAULT_APP_IDENTIFIER.to_string(),
        }
    }
}
