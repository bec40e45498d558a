//! Invalidation Broadcaster
//!
//! Fans invalidations out to the current peer snapshot. Delivery is
//! attempted once per peer; failures are logged and reported per peer but
//! never turned into an error for the caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{bounded, ClusterMode, PeerClient, PeerSet};
use crate::cache::SharedStore;
use crate::error::ClusterError;
use crate::models::{BatchInvalidateRequest, InvalidateRequest};

// == Delivery Report ==
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered,
    Failed(String),
    TimedOut,
}

/// Outcome of one fire-and-forget request to one peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerDelivery {
    pub peer: String,
    pub outcome: DeliveryOutcome,
}

// == Broadcaster ==
pub struct Broadcaster {
    mode: ClusterMode,
    store: SharedStore,
    peers: PeerSet,
    client: Arc<dyn PeerClient>,
    secret: String,
    timeout: Duration,
}

impl Broadcaster {
    pub fn new(
        mode: ClusterMode,
        store: SharedStore,
        peers: PeerSet,
        client: Arc<dyn PeerClient>,
        secret: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            mode,
            store,
            peers,
            client,
            secret: secret.into(),
            timeout,
        }
    }

    /// Secret sent with outgoing invalidations and expected on incoming ones.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    // == Invalidate ==
    /// Evicts `key` locally and, when clustered, on every known peer.
    pub async fn invalidate(&self, key: &str) -> Vec<PeerDelivery> {
        info!("Invalidating {}", key);
        self.store.write().await.evict(key);

        if !self.mode.is_clustered() {
            return Vec::new();
        }

        let request = InvalidateRequest {
            secret: self.secret.clone(),
            key: key.to_string(),
        };
        let peers = self.peers.snapshot();
        self.fan_out(&peers, |addr| self.client.invalidate(addr, &request))
            .await
    }

    // == Batch Invalidate ==
    /// Same as [`invalidate`](Self::invalidate) with one request per peer for all keys.
    pub async fn batch_invalidate(&self, keys: &[String]) -> Vec<PeerDelivery> {
        info!("Batch invalidating [{}]", keys.join(", "));
        self.store.write().await.batch_evict(keys);

        if !self.mode.is_clustered() {
            return Vec::new();
        }

        let request = BatchInvalidateRequest {
            secret: self.secret.clone(),
            keys: keys.to_vec(),
        };
        let peers = self.peers.snapshot();
        self.fan_out(&peers, |addr| self.client.batch_invalidate(addr, &request))
            .await
    }

    /// Sends to every peer concurrently, each bounded by the timeout, and
    /// waits for all of them to finish or time out.
    async fn fan_out<'a, F, Fut>(&self, peers: &'a [String], send: F) -> Vec<PeerDelivery>
    where
        F: Fn(&'a str) -> Fut,
        Fut: Future<Output = Result<(), ClusterError>> + 'a,
    {
        let limit = self.timeout;
        let deliveries = peers.iter().map(|addr| {
            let request = send(addr.as_str());
            async move {
                let outcome = match bounded(limit, request).await {
                    Ok(()) => {
                        debug!("Invalidation delivered to {}", addr);
                        DeliveryOutcome::Delivered
                    }
                    Err(ClusterError::Timeout(ms)) => {
                        warn!("Invalidation to {} timed out after {}ms", addr, ms);
                        DeliveryOutcome::TimedOut
                    }
                    Err(e) => {
                        warn!("Invalidation to {} failed: {}", addr, e);
                        DeliveryOutcome::Failed(e.to_string())
                    }
                };
                PeerDelivery {
                    peer: addr.clone(),
                    outcome,
                }
            }
        });

        join_all(deliveries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::cluster::testing::{MockPeerClient, PeerBehavior, PeerCall};
    use serde_json::json;
    use tokio::sync::RwLock;

    fn store_with(keys: &[&str]) -> SharedStore {
        let mut store = CacheStore::new(100_000);
        for key in keys {
            store.put(key.to_string(), json!("cached")).unwrap();
        }
        Arc::new(RwLock::new(store))
    }

    fn broadcaster(
        mode: ClusterMode,
        store: SharedStore,
        peers: &[&str],
        client: Arc<MockPeerClient>,
    ) -> Broadcaster {
        let peer_set = PeerSet::new();
        peer_set.replace(peers.iter().map(|p| p.to_string()).collect());
        Broadcaster::new(
            mode,
            store,
            peer_set,
            client,
            "s3cret",
            Duration::from_millis(100),
        )
    }

    fn clustered() -> ClusterMode {
        ClusterMode::Clustered {
            group: "cache-asg".to_string(),
        }
    }

    #[tokio::test]
    async fn test_standalone_invalidate_evicts_without_network() {
        let store = store_with(&["card:1"]);
        let client = Arc::new(MockPeerClient::new());
        let broadcaster = broadcaster(
            ClusterMode::Standalone,
            store.clone(),
            &["10.0.0.1:3000"],
            client.clone(),
        );

        let deliveries = broadcaster.invalidate("card:1").await;

        assert!(deliveries.is_empty());
        assert!(client.calls().is_empty());
        assert!(!store.read().await.contains("card:1"));
    }

    #[tokio::test]
    async fn test_clustered_invalidate_reaches_every_peer() {
        let store = store_with(&["card:1"]);
        let client = Arc::new(MockPeerClient::new());
        let broadcaster = broadcaster(
            clustered(),
            store.clone(),
            &["10.0.0.1:3000", "10.0.0.2:3000"],
            client.clone(),
        );

        let deliveries = broadcaster.invalidate("card:1").await;

        assert_eq!(deliveries.len(), 2);
        assert!(deliveries
            .iter()
            .all(|d| d.outcome == DeliveryOutcome::Delivered));
        assert!(client.calls().contains(&PeerCall::Invalidate {
            addr: "10.0.0.2:3000".to_string(),
            secret: "s3cret".to_string(),
            key: "card:1".to_string(),
        }));
        assert!(!store.read().await.contains("card:1"));
    }

    #[tokio::test]
    async fn test_peer_failures_do_not_fail_the_call() {
        let client = Arc::new(
            MockPeerClient::new()
                .with("10.0.0.1:3000", PeerBehavior::Refuse)
                .with("10.0.0.2:3000", PeerBehavior::Hang(Duration::from_secs(10))),
        );
        let broadcaster = broadcaster(
            clustered(),
            store_with(&[]),
            &["10.0.0.1:3000", "10.0.0.2:3000", "10.0.0.3:3000"],
            client.clone(),
        );

        let started = std::time::Instant::now();
        let deliveries = broadcaster.invalidate("card:1").await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(deliveries[0].outcome, DeliveryOutcome::Failed(_)));
        assert_eq!(deliveries[1].outcome, DeliveryOutcome::TimedOut);
        assert_eq!(deliveries[2].outcome, DeliveryOutcome::Delivered);
        // At most one attempt per peer
        assert_eq!(client.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_batch_invalidate_sends_one_request_per_peer() {
        let store = store_with(&["a", "b", "c"]);
        let client = Arc::new(MockPeerClient::new());
        let broadcaster = broadcaster(
            clustered(),
            store.clone(),
            &["10.0.0.1:3000", "10.0.0.2:3000"],
            client.clone(),
        );

        let keys = vec!["a".to_string(), "b".to_string()];
        let deliveries = broadcaster.batch_invalidate(&keys).await;

        assert_eq!(deliveries.len(), 2);
        let calls = client.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.contains(&PeerCall::BatchInvalidate {
            addr: "10.0.0.1:3000".to_string(),
            secret: "s3cret".to_string(),
            keys: keys.clone(),
        }));

        let store = store.read().await;
        assert!(!store.contains("a"));
        assert!(!store.contains("b"));
        assert!(store.contains("c"));
    }

    #[tokio::test]
    async fn test_clustered_with_no_peers_is_local_only() {
        let store = store_with(&["a"]);
        let client = Arc::new(MockPeerClient::new());
        let broadcaster = broadcaster(clustered(), store.clone(), &[], client.clone());

        let deliveries = broadcaster.invalidate("a").await;

        assert!(deliveries.is_empty());
        assert!(client.calls().is_empty());
        assert!(!store.read().await.contains("a"));
    }

    #[test]
    fn test_delivery_outcome_serialization() {
        let failed = serde_json::to_value(DeliveryOutcome::Failed("refused".into())).unwrap();
        assert_eq!(failed, json!({"status": "failed", "reason": "refused"}));

        let delivered = serde_json::to_value(DeliveryOutcome::Delivered).unwrap();
        assert_eq!(delivered, json!({"status": "delivered"}));
    }
}
