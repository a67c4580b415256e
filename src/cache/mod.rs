//! Cache Module
//!
//! Two-tier caching: a bounded memory tier in front of a persistent disk
//! tier, with lazy calendar-aware expiration.

pub mod codec;
mod completion;
mod disk;
mod entry;
pub mod expiry;
mod key;
mod memory;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use completion::Completion;
pub use disk::DiskTier;
pub use entry::CacheEntry;
pub use expiry::{ExpiresAfter, ParseExpiresError};
pub use key::CacheIdentifier;
pub use memory::MemoryTier;
pub use stats::CacheStats;
pub use store::{Cache, CacheLocation, Hit};
