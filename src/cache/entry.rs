//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with size accounting.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

use crate::error::Result;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// The entry owns its value outright; the store hands out clones, so no
/// caller ever holds a reference into stored state.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Insertion timestamp (Unix milliseconds)
    pub inserted_at: u64,
    /// Store-wide write counter, breaks ties between equal timestamps
    pub sequence: u64,
    /// Length of the compact JSON serialization of `value`
    pub size_bytes: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `size_bytes` - Precomputed serialized size (see [`serialized_size`])
    /// * `sequence` - Monotonic write counter assigned by the store
    pub fn new(value: Value, size_bytes: u64, sequence: u64) -> Self {
        Self {
            value,
            inserted_at: current_timestamp_ms(),
            sequence,
            size_bytes,
        }
    }

    // == Age Key ==
    /// Ordering key used for oldest-first eviction.
    pub fn age_key(&self) -> (u64, u64) {
        (self.inserted_at, self.sequence)
    }
}

// == Utility Functions ==
/// Returns the byte length of the compact JSON encoding of `value`.
pub fn serialized_size(value: &Value) -> Result<u64> {
    Ok(serde_json::to_vec(value)?.len() as u64)
}

/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
