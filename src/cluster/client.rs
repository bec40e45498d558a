//! Peer Client
//!
//! Outbound calls from one cache node to another: health probes and
//! invalidation requests. Timeouts are applied by the callers, which wrap
//! every call in `tokio::time::timeout`.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::ClusterError;
use crate::models::{BatchInvalidateRequest, HealthResponse, InvalidateRequest};

// == Peer Client Trait ==
#[async_trait]
pub trait PeerClient: Send + Sync {
    /// Succeeds only if the peer reports an ok status.
    async fn health(&self, addr: &str) -> Result<(), ClusterError>;

    async fn invalidate(&self, addr: &str, request: &InvalidateRequest)
        -> Result<(), ClusterError>;

    async fn batch_invalidate(
        &self,
        addr: &str,
        request: &BatchInvalidateRequest,
    ) -> Result<(), ClusterError>;
}

// == HTTP Peer Client ==
/// Talks to the `/cache/*` routes of other nodes over plain HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpPeerClient {
    http: reqwest::Client,
}

impl HttpPeerClient {
    /// Peers are addressed directly, so system proxy settings are ignored.
    pub fn new() -> Self {
        let http = match reqwest::Client::builder().no_proxy().build() {
            Ok(http) => http,
            Err(e) => {
                warn!("Falling back to default HTTP client, proxy settings apply: {}", e);
                reqwest::Client::new()
            }
        };
        Self { http }
    }

    fn url(addr: &str, path: &str) -> String {
        format!("http://{}{}", addr, path)
    }
}

#[async_trait]
impl PeerClient for HttpPeerClient {
    async fn health(&self, addr: &str) -> Result<(), ClusterError> {
        let body: HealthResponse = self
            .http
            .get(Self::url(addr, "/cache/health"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if body.is_ok() {
            Ok(())
        } else {
            Err(ClusterError::Unhealthy(format!(
                "{} reported status '{}'",
                addr, body.status
            )))
        }
    }

    async fn invalidate(
        &self,
        addr: &str,
        request: &InvalidateRequest,
    ) -> Result<(), ClusterError> {
        debug!("Sending invalidation of {} to {}", request.key, addr);
        self.http
            .post(Self::url(addr, "/cache/invalidate"))
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn batch_invalidate(
        &self,
        addr: &str,
        request: &BatchInvalidateRequest,
    ) -> Result<(), ClusterError> {
        debug!(
            "Sending batch invalidation of {} keys to {}",
            request.keys.len(),
            addr
        );
        self.http
            .post(Self::url(addr, "/cache/batchinvalidate"))
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
