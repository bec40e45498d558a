//! Cluster Module
//!
//! Peer discovery through a directory service, health probing, and
//! best-effort invalidation broadcast.
//!
//! Every network call made from here is bounded by its own timeout and its
//! failure only affects the peer involved.

mod broadcast;
mod client;
mod directory;
mod membership;
mod mode;
mod peers;

#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;
use std::time::Duration;

use crate::error::ClusterError;

// Re-export public types
pub use broadcast::{Broadcaster, DeliveryOutcome, PeerDelivery};
pub use client::{HttpPeerClient, PeerClient};
pub use directory::{DirectoryService, StaticDirectory};
pub use membership::{MembershipSettings, MembershipTracker};
pub use mode::ClusterMode;
pub use peers::PeerSet;

/// Runs `future` with an upper bound, mapping expiry to `ClusterError::Timeout`.
pub(crate) async fn bounded<T, F>(limit: Duration, future: F) -> Result<T, ClusterError>
where
    F: Future<Output = Result<T, ClusterError>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(ClusterError::Timeout(limit.as_millis() as u64)),
    }
}
