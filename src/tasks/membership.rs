//! Membership Refresh Task
//!
//! Background task that keeps the peer snapshot current.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cluster::MembershipTracker;

/// Spawns a task that refreshes membership now and then every interval.
///
/// Failed cycles are already logged by the tracker and leave the previous
/// snapshot in place, so the loop just moves on to the next tick.
///
/// # Arguments
/// * `tracker` - Tracker whose peer set is refreshed
/// * `refresh_interval_secs` - Seconds between refresh cycles
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_membership_task(node.tracker(), 60);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_membership_task(
    tracker: Arc<MembershipTracker>,
    refresh_interval_secs: u64,
) -> JoinHandle<()> {
    let period = Duration::from_secs(refresh_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting membership refresh task with interval of {} seconds",
            refresh_interval_secs
        );

        // First tick completes immediately, giving a refresh at startup
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;

            if let Ok(peers) = tracker.refresh().await {
                debug!("Membership refresh: {} healthy peer(s)", peers.len());
            }
        }
    })
}
