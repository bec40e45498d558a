//! API Routes
//!
//! Configures the Axum router with all cache node endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    batch_invalidate_handler, delete_entry_handler, get_entry_handler, health_handler,
    invalidate_handler, put_entry_handler, refresh_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /cache/health` - Health probe used by peers
/// - `POST /cache/invalidate` - Evict one key locally (peer-authenticated)
/// - `POST /cache/batchinvalidate` - Evict several keys locally (peer-authenticated)
/// - `GET /cache/entries/:key` - Read a cached value
/// - `PUT /cache/entries/:key` - Cache a JSON value
/// - `DELETE /cache/entries/:key` - Invalidate a key across the cluster
/// - `GET /cache/stats` - Counters, sizes and current peers
/// - `POST /cache/refresh` - Trigger a membership refresh
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cache/health", get(health_handler))
        .route("/cache/invalidate", post(invalidate_handler))
        .route("/cache/batchinvalidate", post(batch_invalidate_handler))
        .route(
            "/cache/entries/:key",
            get(get_entry_handler)
                .put(put_entry_handler)
                .delete(delete_entry_handler),
        )
        .route("/cache/stats", get(stats_handler))
        .route("/cache/refresh", post(refresh_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
