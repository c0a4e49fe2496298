//! Object Cache Proxy - An HTTP front-end for object storage
//!
//! Serves objects from an S3-compatible backend through a bounded,
//! TTL-based in-memory cache.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use object_cache_proxy::api::create_router;
use object_cache_proxy::gateway::ObjectStoreGateway;
use object_cache_proxy::{AppState, Config, Janitor};

/// Main entry point for the proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the backend gateway and the cache store
/// 4. Start the background janitor
/// 5. Serve HTTP until SIGINT/SIGTERM
/// 6. Stop the janitor
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "object_cache_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Object Cache Proxy");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_max_size={}, cache_ttl={}s, cleanup_interval={}s, port={}",
        config.cache_max_size, config.cache_ttl, config.cleanup_interval, config.server_port
    );

    let gateway = Arc::new(ObjectStoreGateway::from_config(&config.s3));
    let state = AppState::from_config(&config, gateway);
    info!("Cache store initialized");

    let janitor = Janitor::spawn(state.cache.clone(), config.cleanup_interval());

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    janitor.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}
