//! Error types for the cache node
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Errors surfaced by cache operations and the HTTP layer.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Shared secret missing or mismatched
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Value could not be serialized to compute its size
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            CacheError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

// == Cluster Error Enum ==
/// Failures talking to the directory service or to peers.
///
/// These never reach callers of cache operations; the cluster module logs
/// them and degrades (drops the peer, skips the delivery, keeps the old
/// peer set).
#[derive(Error, Debug)]
pub enum ClusterError {
    /// Directory service lookup failed
    #[error("Directory lookup failed: {0}")]
    Directory(String),

    /// HTTP transport failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Peer answered but did not report an ok status
    #[error("Peer unhealthy: {0}")]
    Unhealthy(String),

    /// Call did not complete within its bound
    #[error("Timed out after {0}ms")]
    Timeout(u64),
}

// == Result Type Alias ==
/// Convenience Result type for the cache node.
pub type Result<T> = std::result::Result<T, CacheError>;
