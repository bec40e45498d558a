//! Membership Tracker
//!
//! Discovers group members through the directory, probes each candidate,
//! and publishes the healthy subset as the new peer snapshot.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{join_all, try_join_all};
use tracing::{debug, info, warn};

use super::{bounded, ClusterMode, DirectoryService, PeerClient, PeerSet};
use crate::error::ClusterError;

// == Membership Settings ==
#[derive(Debug, Clone)]
pub struct MembershipSettings {
    /// Port appended to resolved addresses that lack one
    pub peer_port: u16,
    /// Bound on each health probe
    pub probe_timeout: Duration,
    /// Bound on each directory call
    pub directory_timeout: Duration,
}

impl Default for MembershipSettings {
    fn default() -> Self {
        Self {
            peer_port: 3000,
            probe_timeout: Duration::from_secs(5),
            directory_timeout: Duration::from_secs(5),
        }
    }
}

// == Membership Tracker ==
pub struct MembershipTracker {
    mode: ClusterMode,
    directory: Arc<dyn DirectoryService>,
    client: Arc<dyn PeerClient>,
    peers: PeerSet,
    settings: MembershipSettings,
}

impl MembershipTracker {
    pub fn new(
        mode: ClusterMode,
        directory: Arc<dyn DirectoryService>,
        client: Arc<dyn PeerClient>,
        peers: PeerSet,
        settings: MembershipSettings,
    ) -> Self {
        Self {
            mode,
            directory,
            client,
            peers,
            settings,
        }
    }

    pub fn peers(&self) -> &PeerSet {
        &self.peers
    }

    // == Refresh ==
    /// Runs one discovery cycle and returns the resulting snapshot.
    ///
    /// Standalone nodes skip discovery and keep an empty snapshot. A failed
    /// directory call aborts the cycle and leaves the previous snapshot in
    /// place; failed probes only exclude the affected peer.
    pub async fn refresh(&self) -> Result<Arc<Vec<String>>, ClusterError> {
        let Some(group) = self.mode.group() else {
            return Ok(self.peers.snapshot());
        };

        let candidates = match self.discover(group).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Membership refresh for group {} aborted: {}", group, e);
                return Err(e);
            }
        };
        info!("Peers: [{}]", candidates.join(", "));

        let healthy = self.probe_all(candidates).await;
        info!("Healthy peers: [{}]", healthy.join(", "));

        self.peers.replace(healthy);
        Ok(self.peers.snapshot())
    }

    async fn discover(&self, group: &str) -> Result<Vec<String>, ClusterError> {
        let limit = self.settings.directory_timeout;
        let members = bounded(limit, self.directory.list_group_members(group)).await?;
        debug!("Group {} has {} members", group, members.len());

        let addresses = try_join_all(
            members
                .iter()
                .map(|id| bounded(limit, self.directory.resolve_address(id))),
        )
        .await?;

        Ok(addresses
            .iter()
            .map(|addr| with_default_port(addr, self.settings.peer_port))
            .collect())
    }

    async fn probe_all(&self, candidates: Vec<String>) -> Vec<String> {
        let limit = self.settings.probe_timeout;
        let probes = candidates.into_iter().map(|addr| async move {
            let result = bounded(limit, self.client.health(&addr)).await;
            (addr, result)
        });

        join_all(probes)
            .await
            .into_iter()
            .filter_map(|(addr, result)| match result {
                Ok(()) => Some(addr),
                Err(e) => {
                    warn!("Dropping peer {} for this cycle: {}", addr, e);
                    None
                }
            })
            .collect()
    }
}

/// Appends `port` to bare hosts and IPs; leaves `host:port` untouched.
fn with_default_port(addr: &str, port: u16) -> String {
    if addr.parse::<SocketAddr>().is_ok() {
        return addr.to_string();
    }
    if let Ok(ip) = addr.parse::<IpAddr>() {
        return SocketAddr::new(ip, port).to_string();
    }
    match addr.rsplit_once(':') {
        Some((_, p)) if p.parse::<u16>().is_ok() => addr.to_string(),
        _ => format!("{}:{}", addr, port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::testing::{MockPeerClient, PeerBehavior, PeerCall};
    use crate::cluster::StaticDirectory;

    fn clustered() -> ClusterMode {
        ClusterMode::Clustered {
            group: "cache-asg".to_string(),
        }
    }

    fn directory() -> StaticDirectory {
        StaticDirectory::with_group(
            "cache-asg",
            vec![
                ("i-1".to_string(), "10.0.0.1".to_string()),
                ("i-2".to_string(), "10.0.0.2".to_string()),
                ("i-3".to_string(), "10.0.0.3:8080".to_string()),
            ],
        )
    }

    fn settings() -> MembershipSettings {
        MembershipSettings {
            peer_port: 3000,
            probe_timeout: Duration::from_millis(100),
            directory_timeout: Duration::from_millis(100),
        }
    }

    fn tracker(
        mode: ClusterMode,
        directory: StaticDirectory,
        client: Arc<MockPeerClient>,
    ) -> MembershipTracker {
        MembershipTracker::new(mode, Arc::new(directory), client, PeerSet::new(), settings())
    }

    #[tokio::test]
    async fn test_refresh_keeps_healthy_peers() {
        let client = Arc::new(MockPeerClient::new());
        let tracker = tracker(clustered(), directory(), client.clone());

        let peers = tracker.refresh().await.unwrap();

        assert_eq!(
            *peers,
            vec![
                "10.0.0.1:3000".to_string(),
                "10.0.0.2:3000".to_string(),
                "10.0.0.3:8080".to_string(),
            ]
        );
        assert_eq!(client.calls().len(), 3);
        assert_eq!(tracker.peers().len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_drops_unhealthy_and_slow_peers() {
        let client = Arc::new(
            MockPeerClient::new()
                .with("10.0.0.1:3000", PeerBehavior::Unhealthy)
                .with("10.0.0.3:8080", PeerBehavior::Hang(Duration::from_secs(10))),
        );
        let tracker = tracker(clustered(), directory(), client);

        let peers = tracker.refresh().await.unwrap();

        assert_eq!(*peers, vec!["10.0.0.2:3000".to_string()]);
    }

    #[tokio::test]
    async fn test_directory_failure_keeps_previous_snapshot() {
        let client = Arc::new(MockPeerClient::new());
        let tracker = tracker(clustered(), StaticDirectory::new(), client.clone());
        tracker.peers().replace(vec!["10.0.0.9:3000".to_string()]);

        let result = tracker.refresh().await;

        assert!(matches!(result, Err(ClusterError::Directory(_))));
        assert_eq!(*tracker.peers().snapshot(), vec!["10.0.0.9:3000".to_string()]);
        assert!(client.calls().is_empty());
    }

    /// Lists members but cannot resolve any of them.
    struct UnresolvableDirectory;

    #[async_trait::async_trait]
    impl DirectoryService for UnresolvableDirectory {
        async fn list_group_members(&self, _group: &str) -> Result<Vec<String>, ClusterError> {
            Ok(vec!["i-1".to_string(), "i-2".to_string()])
        }

        async fn resolve_address(&self, member_id: &str) -> Result<String, ClusterError> {
            Err(ClusterError::Directory(format!("{} terminated", member_id)))
        }
    }

    #[tokio::test]
    async fn test_unresolvable_member_aborts_cycle() {
        let client = Arc::new(MockPeerClient::new());
        let tracker = MembershipTracker::new(
            clustered(),
            Arc::new(UnresolvableDirectory),
            client.clone(),
            PeerSet::new(),
            settings(),
        );
        tracker.peers().replace(vec!["10.0.0.9:3000".to_string()]);

        assert!(tracker.refresh().await.is_err());
        assert_eq!(*tracker.peers().snapshot(), vec!["10.0.0.9:3000".to_string()]);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_standalone_never_probes() {
        let client = Arc::new(MockPeerClient::new());
        let tracker = tracker(ClusterMode::Standalone, directory(), client.clone());

        let peers = tracker.refresh().await.unwrap();

        assert!(peers.is_empty());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_probes_hit_every_candidate() {
        let client = Arc::new(MockPeerClient::new());
        let tracker = tracker(clustered(), directory(), client.clone());

        tracker.refresh().await.unwrap();

        let calls = client.calls();
        assert!(calls.contains(&PeerCall::Health("10.0.0.1:3000".to_string())));
        assert!(calls.contains(&PeerCall::Health("10.0.0.3:8080".to_string())));
    }

    #[test]
    fn test_with_default_port() {
        assert_eq!(with_default_port("10.0.0.1", 80), "10.0.0.1:80");
        assert_eq!(with_default_port("10.0.0.1:8080", 80), "10.0.0.1:8080");
        assert_eq!(with_default_port("::1", 80), "[::1]:80");
        assert_eq!(with_default_port("cache-1.internal", 80), "cache-1.internal:80");
        assert_eq!(with_default_port("cache-1.internal:81", 80), "cache-1.internal:81");
    }
}
