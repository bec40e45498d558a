//! Cache Node
//!
//! The per-process façade. Owns the store, the peer snapshot, the
//! membership tracker and the broadcaster, and applies the cache feature
//! toggle: with caching disabled, reads miss and writes are discarded while
//! evictions and invalidations still run, so a disabled node never holds
//! stale data.

use std::sync::Arc;

use serde_json::Value;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::{CacheStats, CacheStore, PutOutcome, SharedStore};
use crate::cluster::{
    Broadcaster, ClusterMode, DirectoryService, HttpPeerClient, MembershipSettings,
    MembershipTracker, PeerClient, PeerDelivery, PeerSet, StaticDirectory,
};
use crate::config::Config;
use crate::error::{ClusterError, Result};

// == Cache Node ==
pub struct CacheNode {
    store: SharedStore,
    enabled: bool,
    mode: ClusterMode,
    peers: PeerSet,
    tracker: Arc<MembershipTracker>,
    broadcaster: Broadcaster,
}

impl CacheNode {
    // == Constructors ==
    /// Builds a node with a store sized from `config`.
    pub fn new(
        config: &Config,
        directory: Arc<dyn DirectoryService>,
        client: Arc<dyn PeerClient>,
    ) -> Self {
        Self::with_store(config, CacheStore::new(config.capacity_bytes), directory, client)
    }

    /// Builds a node around a preconfigured store.
    pub fn with_store(
        config: &Config,
        store: CacheStore,
        directory: Arc<dyn DirectoryService>,
        client: Arc<dyn PeerClient>,
    ) -> Self {
        let mode = config.cluster_mode();
        let store = Arc::new(RwLock::new(store));
        let peers = PeerSet::new();

        let tracker = MembershipTracker::new(
            mode.clone(),
            directory,
            client.clone(),
            peers.clone(),
            MembershipSettings {
                peer_port: config.peer_port,
                probe_timeout: config.probe_timeout(),
                directory_timeout: config.directory_timeout(),
            },
        );
        let broadcaster = Broadcaster::new(
            mode.clone(),
            store.clone(),
            peers.clone(),
            client,
            config.cache_secret.clone(),
            config.invalidate_timeout(),
        );

        Self {
            store,
            enabled: config.cache_enabled,
            mode,
            peers,
            tracker: Arc::new(tracker),
            broadcaster,
        }
    }

    /// Builds a node using the configured static member table and HTTP peers.
    pub fn from_config(config: &Config) -> Self {
        let directory = match &config.cluster_group {
            Some(group) => StaticDirectory::with_group(group.clone(), config.cluster_members.clone()),
            None => StaticDirectory::new(),
        };
        Self::new(config, Arc::new(directory), Arc::new(HttpPeerClient::new()))
    }

    // == Reads and Writes ==
    /// Stores a value. Returns None when caching is disabled.
    ///
    /// # Errors
    /// Returns `CacheError::Serialization` if the value cannot be sized.
    pub async fn put(&self, key: impl Into<String>, value: Value) -> Result<Option<PutOutcome>> {
        let key = key.into();
        if !self.enabled {
            debug!("Cache disabled, discarding put of {}", key);
            return Ok(None);
        }
        let outcome = self.store.write().await.put(key, value)?;
        Ok(Some(outcome))
    }

    /// Returns a copy of the cached value; always None when disabled.
    pub async fn get(&self, key: &str) -> Option<Value> {
        if !self.enabled {
            return None;
        }
        self.store.write().await.get(key)
    }

    /// Looks up each key in order. Missing keys (or a disabled cache) yield None.
    pub async fn batch_get(&self, keys: &[String]) -> Vec<Option<Value>> {
        if !self.enabled {
            return vec![None; keys.len()];
        }
        self.store.write().await.batch_get(keys)
    }

    /// Puts each pair independently. Returns no results when disabled.
    pub async fn batch_put<I>(&self, entries: I) -> Vec<Result<PutOutcome>>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if !self.enabled {
            debug!("Cache disabled, discarding batch put");
            return Vec::new();
        }
        self.store.write().await.batch_put(entries)
    }

    // == Local Eviction ==
    /// Removes a key from this node only.
    pub async fn evict(&self, key: &str) -> bool {
        self.store.write().await.evict(key)
    }

    /// Removes keys from this node only. Returns how many were present.
    pub async fn batch_evict(&self, keys: &[String]) -> usize {
        self.store.write().await.batch_evict(keys)
    }

    // == Cluster-wide Invalidation ==
    /// Evicts `key` here and, when clustered, on every healthy peer.
    pub async fn invalidate(&self, key: &str) -> Vec<PeerDelivery> {
        self.broadcaster.invalidate(key).await
    }

    pub async fn batch_invalidate(&self, keys: &[String]) -> Vec<PeerDelivery> {
        self.broadcaster.batch_invalidate(keys).await
    }

    // == Membership ==
    /// Runs one membership refresh immediately.
    pub async fn refresh_membership(&self) -> std::result::Result<Arc<Vec<String>>, ClusterError> {
        let peers = self.tracker.refresh().await?;
        info!("Membership refreshed: {} healthy peer(s)", peers.len());
        Ok(peers)
    }

    pub fn tracker(&self) -> Arc<MembershipTracker> {
        self.tracker.clone()
    }

    pub fn peers(&self) -> Arc<Vec<String>> {
        self.peers.snapshot()
    }

    // == Peer Authentication ==
    /// True if `presented` matches the cluster secret. An unset secret matches nothing.
    pub fn accepts_secret(&self, presented: &str) -> bool {
        let secret = self.broadcaster.secret();
        !secret.is_empty() && bool::from(presented.as_bytes().ct_eq(secret.as_bytes()))
    }

    // == Introspection ==
    pub fn mode(&self) -> &ClusterMode {
        &self.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }
}
