//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Only [`CacheError::InvalidKey`] and [`CacheError::Runtime`] ever reach a
/// caller of [`crate::Cache`]. The disk variants are produced by the disk tier
/// and absorbed by the orchestrator into a miss or a memory-only write.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key cannot be turned into an identifier (unreachable while hashing is SHA-1)
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Cache root directory cannot be resolved or created
    #[error("Cache directory unavailable: {reason}")]
    DirectoryUnavailable {
        reason: String,
        #[source]
        source: Option<io::Error>,
    },

    /// Entry file could not be written
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Entry file exists but could not be read
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No entry file exists for the identifier
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// Entry could not be serialized
    #[error("Failed to encode entry: {0}")]
    Encode(String),

    /// Stored bytes are not a readable entry
    #[error("Failed to decode entry: {0}")]
    Decode(String),

    /// No async runtime available to host the disk worker
    #[error("Runtime unavailable: {0}")]
    Runtime(String),
}

impl CacheError {
    pub(crate) fn directory_unavailable(reason: impl Into<String>) -> Self {
        CacheError::DirectoryUnavailable {
            reason: reason.into(),
            source: None,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
