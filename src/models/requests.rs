//! Request DTOs for the cache node API
//!
//! Defines the structure of incoming HTTP request bodies. The invalidation
//! requests are also what a node sends to its peers.

use serde::{Deserialize, Serialize};

/// Request body for `POST /cache/invalidate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidateRequest {
    /// Shared cluster secret
    pub secret: String,
    /// Key to evict
    pub key: String,
}

/// Request body for `POST /cache/batchinvalidate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInvalidateRequest {
    /// Shared cluster secret
    pub secret: String,
    /// Keys to evict; any string is a valid key, including the empty one
    pub keys: Vec<String>,
}
