//! Cache Statistics Module
//!
//! Serializable point-in-time snapshots of cache performance counters.

use serde::Serialize;

// == Entity Cache Stats ==
/// Counters for an entity lookup cache.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that found no entry
    pub misses: u64,
    /// Entries removed by explicit invalidation
    pub invalidations: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Snapshot Cache Stats ==
/// Counters for a staleness-gated snapshot cache.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SnapshotStats {
    /// Reads served from a fresh slot, no recompute involved
    pub fresh_hits: u64,
    /// Recompute executions started (joiners of a flight are not counted)
    pub recomputes: u64,
    /// Recompute executions that failed
    pub failures: u64,
}
