//! Cache Statistics Module
//!
//! Tracks which tier served reads and how often the disk tier failed.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads served by the memory tier
    pub memory_hits: u64,
    /// Reads served by the disk tier
    pub disk_hits: u64,
    /// Reads that found nothing fresh in either tier
    pub misses: u64,
    /// Writes that stayed memory-only because the disk tier failed
    pub disk_write_failures: u64,
    /// Entries dropped from the memory tier
    pub evictions: u64,
    /// Entries currently held by the memory tier
    pub memory_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses) across both tiers, or 0.0 before any read.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.memory_hits + self.disk_hits;
        let total = hits + self.misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn record_memory_hit(&mut self) {
        self.memory_hits += 1;
    }

    pub fn record_disk_hit(&mut self) {
        self.disk_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_disk_write_failure(&mut self) {
        self.disk_write_failures += 1;
    }
}
