//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of lookups on absent keys
    pub misses: u64,
    /// Number of entries evicted due to LRU policy
    pub evictions: u64,
    /// Current number of entries in the cache
    pub size: usize,
    /// Maximum number of entries the cache holds
    pub capacity: usize,
    /// hits / (hits + misses), filled in when a snapshot is taken
    pub hit_rate: f64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn compute_hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Recording ==
    /// Counts a lookup that found its key.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Counts a lookup on an absent key.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Counts one least-recently-used entry dropped to make room.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Snapshot ==
    /// Returns a copy with the current size and derived hit rate filled in.
    pub fn snapshot(&self, size: usize) -> Self {
        Self {
            size,
            hit_rate: self.compute_hit_rate(),
            ..self.clone()
        }
    }
}
