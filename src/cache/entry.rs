//! Cache Entry Module
//!
//! Defines the unit stored in both tiers.

use chrono::{DateTime, Utc};

use crate::cache::expiry::{self, ExpiresAfter};

// == Cache Entry ==
/// A stored value with its creation time and optional expiry offset.
///
/// Built once per `set` and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The key the caller used, kept for diagnostics
    pub original_key: String,
    /// The stored value
    pub payload: V,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Offset from `created_at` after which the entry is stale, None = never
    pub expires_after: Option<ExpiresAfter>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    pub fn new(key: impl Into<String>, payload: V, expires_after: Option<ExpiresAfter>) -> Self {
        Self {
            original_key: key.into(),
            payload,
            created_at: Utc::now(),
            expires_after,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Checks if the entry is expired at a given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        expiry::is_expired(self, now)
    }

    // == Expires At ==
    /// Returns the instant the entry goes stale, or None if it never does.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_after
            .and_then(|offset| offset.apply(self.created_at))
    }
}
