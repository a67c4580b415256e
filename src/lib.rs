//! Duocache - A two-tier key/value cache
//!
//! Values live in a volatile memory tier for fast hits and in a persistent
//! disk tier that survives restarts. Entries may carry a calendar-aware
//! expiry that is checked lazily on read.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheLocation, CacheStats, Completion, ExpiresAfter, Hit};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
