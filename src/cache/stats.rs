//! Cache Statistics Module
//!
//! Counters for reads, capacity evictions and rejected writes, plus an
//! occupancy snapshot filled in by the store when stats are requested.

use serde::Serialize;

// == Cache Stats ==
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped by `evict_oldest` to fit a new value
    pub evictions: u64,
    /// Puts dropped because the value exceeded the entry limit
    pub rejections: u64,
    pub total_entries: usize,
    /// Sum of serialized entry sizes
    pub total_size_bytes: u64,
    pub capacity_bytes: u64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the store's current occupancy to a copy of the counters.
    pub fn with_occupancy(mut self, entries: usize, size_bytes: u64, capacity_bytes: u64) -> Self {
        self.total_entries = entries;
        self.total_size_bytes = size_bytes;
        self.capacity_bytes = capacity_bytes;
        self
    }

    // == Ratios ==
    /// hits / (hits + misses), or 0.0 before any read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Fraction of the byte budget in use; 0.0 for a zero-capacity store.
    pub fn utilization(&self) -> f64 {
        if self.capacity_bytes == 0 {
            0.0
        } else {
            self.total_size_bytes as f64 / self.capacity_bytes as f64
        }
    }

    // == Recording ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_rejection(&mut self) {
        self.rejections += 1;
    }
}
