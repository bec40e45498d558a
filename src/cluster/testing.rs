//! In-memory peer client used by the cluster unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::client::PeerClient;
use crate::error::ClusterError;
use crate::models::{BatchInvalidateRequest, InvalidateRequest};

#[derive(Debug, Clone, Copy)]
pub enum PeerBehavior {
    Ok,
    Unhealthy,
    Refuse,
    Hang(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerCall {
    Health(String),
    Invalidate { addr: String, secret: String, key: String },
    BatchInvalidate { addr: String, secret: String, keys: Vec<String> },
}

/// Peers default to `Ok`; individual addresses can be overridden.
#[derive(Debug, Default)]
pub struct MockPeerClient {
    behaviors: HashMap<String, PeerBehavior>,
    calls: Mutex<Vec<PeerCall>>,
}

impl MockPeerClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, addr: &str, behavior: PeerBehavior) -> Self {
        self.behaviors.insert(addr.to_string(), behavior);
        self
    }

    pub fn calls(&self) -> Vec<PeerCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn respond(&self, addr: &str, call: PeerCall) -> Result<(), ClusterError> {
        self.calls.lock().unwrap().push(call);
        match self.behaviors.get(addr).copied().unwrap_or(PeerBehavior::Ok) {
            PeerBehavior::Ok => Ok(()),
            PeerBehavior::Unhealthy => Err(ClusterError::Unhealthy(addr.to_string())),
            PeerBehavior::Refuse => Err(ClusterError::Directory(format!("{} refused", addr))),
            PeerBehavior::Hang(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl PeerClient for MockPeerClient {
    async fn health(&self, addr: &str) -> Result<(), ClusterError> {
        self.respond(addr, PeerCall::Health(addr.to_string())).await
    }

    async fn invalidate(
        &self,
        addr: &str,
        request: &InvalidateRequest,
    ) -> Result<(), ClusterError> {
        let call = PeerCall::Invalidate {
            addr: addr.to_string(),
            secret: request.secret.clone(),
            key: request.key.clone(),
        };
        self.respond(addr, call).await
    }

    async fn batch_invalidate(
        &self,
        addr: &str,
        request: &BatchInvalidateRequest,
    ) -> Result<(), ClusterError> {
        let call = PeerCall::BatchInvalidate {
            addr: addr.to_string(),
            secret: request.secret.clone(),
            keys: request.keys.clone(),
        };
        self.respond(addr, call).await
    }
}
