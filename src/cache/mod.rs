//! Cache Module
//!
//! Provides the capacity-bounded in-memory store with oldest-first eviction.

use std::sync::Arc;

use tokio::sync::RwLock;

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, serialized_size, CacheEntry};
pub use stats::CacheStats;
pub use store::{CacheStore, PutOutcome};

/// Store handle shared between the façade, the broadcaster and handlers.
pub type SharedStore = Arc<RwLock<CacheStore>>;

// == Public Constants ==
/// A single entry may occupy at most `capacity / MAX_ENTRY_DIVISOR` bytes.
pub const MAX_ENTRY_DIVISOR: u64 = 100;
