//! API Handlers
//!
//! HTTP request handlers for the `/cache/*` endpoints. The invalidation
//! handlers are the receiving side of peer broadcasts: they check the
//! shared secret and evict locally only, never re-broadcasting.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tracing::warn;

use crate::cache::PutOutcome;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    BatchInvalidateRequest, GetResponse, HealthResponse, InvalidateRequest, InvalidateResponse,
    PutResponse, RefreshResponse, StatsResponse,
};
use crate::node::CacheNode;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The node façade, which also holds the cluster secret
    pub node: Arc<CacheNode>,
}

impl AppState {
    /// Creates a new AppState around an existing node.
    pub fn new(node: CacheNode) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheNode::from_config(config))
    }

    fn authorize(&self, presented: &str) -> Result<()> {
        if !self.node.accepts_secret(presented) {
            warn!("Rejected invalidation request with invalid secret");
            return Err(CacheError::Unauthorized("invalid secret".to_string()));
        }
        Ok(())
    }
}

/// Handler for GET /cache/health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Handler for POST /cache/invalidate
///
/// Evicts one key on this node after validating the shared secret.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    state.authorize(&req.secret)?;
    state.node.evict(&req.key).await;

    Ok(Json(InvalidateResponse::new(1, Vec::new())))
}

/// Handler for POST /cache/batchinvalidate
pub async fn batch_invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<BatchInvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    state.authorize(&req.secret)?;
    state.node.batch_evict(&req.keys).await;

    Ok(Json(InvalidateResponse::new(req.keys.len(), Vec::new())))
}

/// Handler for GET /cache/entries/:key
pub async fn get_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.node.get(&key).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for PUT /cache/entries/:key
///
/// The request body is the JSON value to cache.
pub async fn put_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(value): Json<Value>,
) -> Result<Json<PutResponse>> {
    let response = match state.node.put(key.clone(), value).await? {
        Some(PutOutcome::Stored { evicted }) => PutResponse {
            key,
            stored: true,
            evicted,
        },
        Some(PutOutcome::Rejected { .. }) | None => PutResponse {
            key,
            stored: false,
            evicted: Vec::new(),
        },
    };

    Ok(Json(response))
}

/// Handler for DELETE /cache/entries/:key
///
/// Invalidates the key across the cluster.
pub async fn delete_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<InvalidateResponse> {
    let deliveries = state.node.invalidate(&key).await;
    Json(InvalidateResponse::new(1, deliveries))
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let node = &state.node;
    Json(StatsResponse::new(
        node.is_enabled(),
        node.mode().to_string(),
        node.peers().to_vec(),
        node.stats().await,
    ))
}

/// Handler for POST /cache/refresh
pub async fn refresh_handler(State(state): State<AppState>) -> Result<Json<RefreshResponse>> {
    let peers = state
        .node
        .refresh_membership()
        .await
        .map_err(|e| CacheError::Internal(e.to_string()))?;

    Ok(Json(RefreshResponse {
        peers: peers.to_vec(),
    }))
}
