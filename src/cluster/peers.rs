//! Peer Set
//!
//! Snapshot of currently healthy peer addresses, swapped atomically.

use std::sync::Arc;

use arc_swap::ArcSwap;

// == Peer Set ==
/// Shared handle to the current peer snapshot.
///
/// Clones share the same underlying slot. Writers replace the whole list;
/// readers get either the previous or the new snapshot, never a mix.
#[derive(Debug, Clone)]
pub struct PeerSet {
    current: Arc<ArcSwap<Vec<String>>>,
}

impl PeerSet {
    /// Creates an empty peer set.
    pub fn new() -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(Vec::new())),
        }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<Vec<String>> {
        self.current.load_full()
    }

    /// Replaces the snapshot wholesale.
    pub fn replace(&self, peers: Vec<String>) {
        self.current.store(Arc::new(peers));
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }
}

impl Default for PeerSet {
    fn default() -> Self {
        Self::new()
    }
}
