//! Cache Store Module
//!
//! Bounded key/value map with incremental size accounting and oldest-first
//! eviction.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::cache::entry::serialized_size;
use crate::cache::{CacheEntry, CacheStats, MAX_ENTRY_DIVISOR};
use crate::error::Result;

// == Put Outcome ==
/// Result of a single `put`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// Entry stored; lists keys evicted to make room, oldest first
    Stored { evicted: Vec<String> },
    /// Value exceeded the per-entry limit; store left unchanged
    Rejected { size_bytes: u64 },
}

// == Cache Store ==
/// Main cache storage bounded by the total serialized size of its values.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Sum of `size_bytes` across `entries`
    total_size: u64,
    /// Byte budget for `total_size`
    capacity_bytes: u64,
    /// Largest value accepted by `put`
    max_entry_bytes: u64,
    /// Next write sequence number
    next_sequence: u64,
    /// Performance statistics
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store with the given byte budget.
    ///
    /// A single entry may use at most one hundredth of the budget.
    pub fn new(capacity_bytes: u64) -> Self {
        Self::with_max_entry_bytes(capacity_bytes, capacity_bytes / MAX_ENTRY_DIVISOR)
    }

    /// Creates a store with an explicit per-entry limit.
    ///
    /// The limit is clamped to `capacity_bytes` so a stored entry always fits.
    pub fn with_max_entry_bytes(capacity_bytes: u64, max_entry_bytes: u64) -> Self {
        Self {
            entries: HashMap::new(),
            total_size: 0,
            capacity_bytes,
            max_entry_bytes: max_entry_bytes.min(capacity_bytes),
            next_sequence: 0,
            stats: CacheStats::new(),
        }
    }

    // == Put ==
    /// Stores `value` under `key`, evicting the oldest entries as needed.
    ///
    /// Values larger than the per-entry limit are dropped without error.
    /// Overwriting a key releases the previous entry's size first.
    ///
    /// # Errors
    /// Returns `CacheError::Serialization` if the value cannot be encoded.
    pub fn put(&mut self, key: String, value: Value) -> Result<PutOutcome> {
        let size_bytes = serialized_size(&value)?;

        if size_bytes > self.max_entry_bytes {
            debug!(
                "Rejected {}: {} bytes exceeds entry limit of {}",
                key, size_bytes, self.max_entry_bytes
            );
            self.stats.record_rejection();
            return Ok(PutOutcome::Rejected { size_bytes });
        }

        self.remove_entry(&key);

        let mut evicted = Vec::new();
        while size_bytes.saturating_add(self.total_size) > self.capacity_bytes {
            match self.evict_oldest() {
                Some(oldest) => evicted.push(oldest),
                None => break,
            }
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        debug!("Putting {} ({} bytes)", key, size_bytes);
        self.entries
            .insert(key, CacheEntry::new(value, size_bytes, sequence));
        self.total_size += size_bytes;

        Ok(PutOutcome::Stored { evicted })
    }

    // == Get ==
    /// Returns a copy of the stored value, or None on a miss.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        match self.entries.get(key) {
            Some(entry) => {
                debug!("Cache hit {}", key);
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            None => {
                debug!("Cache miss {}", key);
                self.stats.record_miss();
                None
            }
        }
    }

    // == Evict ==
    /// Removes an entry by key. Returns whether an entry was present.
    pub fn evict(&mut self, key: &str) -> bool {
        debug!("Evicting {}", key);
        self.remove_entry(key).is_some()
    }

    // == Evict Oldest ==
    /// Evicts the entry with the smallest insertion timestamp.
    ///
    /// Entries written within the same millisecond are ordered by write
    /// sequence. Returns the evicted key, or None if the store is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.age_key())
            .map(|(key, _)| key.clone())?;

        debug!("Evicting oldest entry {}", oldest);
        self.remove_entry(&oldest);
        self.stats.record_eviction();
        Some(oldest)
    }

    // == Batch Operations ==
    /// Evicts every key in `keys`; absent keys are ignored.
    pub fn batch_evict<S: AsRef<str>>(&mut self, keys: &[S]) -> usize {
        keys.iter().filter(|key| self.evict(key.as_ref())).count()
    }

    /// Looks up every key, preserving input order.
    pub fn batch_get<S: AsRef<str>>(&mut self, keys: &[S]) -> Vec<Option<Value>> {
        keys.iter().map(|key| self.get(key.as_ref())).collect()
    }

    /// Puts every pair independently; one failure does not undo the others.
    pub fn batch_put<I>(&mut self, entries: I) -> Vec<Result<PutOutcome>>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        entries
            .into_iter()
            .map(|(key, value)| self.put(key, value))
            .collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats
            .clone()
            .with_occupancy(self.entries.len(), self.total_size, self.capacity_bytes)
    }

    // == Accessors ==
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    pub fn max_entry_bytes(&self) -> u64 {
        self.max_entry_bytes
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.total_size -= entry.size_bytes;
        Some(entry)
    }
}
