//! API Module
//!
//! HTTP handlers and routing for the cache node REST API.
//!
//! # Endpoints
//! - `GET /cache/health` - Health probe used by peers
//! - `POST /cache/invalidate` - Peer-authenticated single-key eviction
//! - `POST /cache/batchinvalidate` - Peer-authenticated multi-key eviction
//! - `GET|PUT|DELETE /cache/entries/:key` - Read, write, invalidate an entry
//! - `GET /cache/stats` - Cache statistics
//! - `POST /cache/refresh` - Manual membership refresh

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
