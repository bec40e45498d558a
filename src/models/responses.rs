//! Response DTOs for the cache node API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::CacheStats;
use crate::cluster::PeerDelivery;

/// Status string a healthy node reports.
pub const HEALTH_OK: &str = "ok";

/// Response body for `GET /cache/health`
///
/// Also parsed by peers probing this node, so only `status` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status, `"ok"` when serving
    pub status: String,
    /// Current timestamp in ISO 8601 format
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn ok() -> Self {
        Self {
            status: HEALTH_OK.to_string(),
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == HEALTH_OK
    }
}

/// Response body for `GET /cache/entries/:key`
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for `PUT /cache/entries/:key`
#[derive(Debug, Clone, Serialize)]
pub struct PutResponse {
    pub key: String,
    /// False when the cache is disabled or the value exceeded the entry limit
    pub stored: bool,
    /// Keys evicted to make room
    pub evicted: Vec<String>,
}

/// Response body for invalidation endpoints
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Success message
    pub message: String,
    /// Per-peer delivery results; empty for local-only invalidation
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deliveries: Vec<PeerDelivery>,
}

impl InvalidateResponse {
    pub fn new(count: usize, deliveries: Vec<PeerDelivery>) -> Self {
        Self {
            message: format!("Invalidated {} key(s)", count),
            deliveries,
        }
    }
}

/// Response body for `GET /cache/stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub enabled: bool,
    pub mode: String,
    pub peers: Vec<String>,
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
    /// total_size_bytes / capacity_bytes
    pub utilization: f64,
}

impl StatsResponse {
    pub fn new(enabled: bool, mode: String, peers: Vec<String>, stats: CacheStats) -> Self {
        Self {
            enabled,
            mode,
            peers,
            hit_rate: stats.hit_rate(),
            utilization: stats.utilization(),
            stats,
        }
    }
}

/// Response body for `POST /cache/refresh`
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub peers: Vec<String>,
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}
