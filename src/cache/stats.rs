//! Cache Statistics Module
//!
//! Tracks cache activity: hits, misses, inserts, updates, evictions,
//! expirations and deletes.

use serde::Serialize;

// == Cache Stats ==
/// Cache activity counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of gets that found a live entry
    pub hits: u64,
    /// Number of gets that found nothing (absent or expired)
    pub misses: u64,
    /// Number of sets that created a new entry
    pub inserts: u64,
    /// Number of sets that replaced the value of an existing entry
    pub updates: u64,
    /// Number of entries evicted to stay within capacity
    pub evictions: u64,
    /// Number of entries removed because their ttl elapsed
    pub expirations: u64,
    /// Number of explicit removals that found the key
    pub deletes: u64,
    /// Current number of entries in the cache
    pub size: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no gets have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_insert(&mut self) {
        self.inserts += 1;
    }

    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub fn record_delete(&mut self) {
        self.deletes += 1;
    }

    // == Update Entry Count ==
    /// Updates the live entry count.
    pub fn set_size(&mut self, size: usize) {
        self.size = size;
    }
}
