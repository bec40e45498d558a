//! Cluster Cache - A capacity-bounded in-memory content cache
//!
//! Serves the `/cache/*` HTTP surface for one cluster node.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cluster_cache::{api::create_router, spawn_membership_task, AppState, Config};

/// Main entry point for the cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache node (store, peer set, tracker, broadcaster)
/// 4. Start the membership refresh task when clustered
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cluster_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cache node");

    let config = Config::from_env();
    info!(
        "Configuration loaded: enabled={}, capacity={}B, mode={}, port={}, refresh_interval={}s",
        config.cache_enabled,
        config.capacity_bytes,
        config.cluster_mode(),
        config.server_port,
        config.refresh_interval
    );
    if config.cluster_mode().is_clustered() && config.cache_secret.is_empty() {
        warn!("CACHE_SECRET is empty; peer invalidations to this node will be rejected");
    }

    let state = AppState::from_config(&config);

    let membership_handle = if state.node.mode().is_clustered() {
        info!("Membership refresh task started");
        Some(spawn_membership_task(
            state.node.tracker(),
            config.refresh_interval,
        ))
    } else {
        None
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(membership_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the membership task and allows graceful shutdown.
async fn shutdown_signal(membership_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = membership_handle {
        handle.abort();
        warn!("Membership task aborted");
    }
}
