//! Redis Lite - A lightweight in-memory key-value server
//!
//! Serves GET/SET/DEL/PING/INFO over a line protocol with LRU eviction.

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use redis_lite::{serve, spawn_stats_reporter, Config, Dispatcher, ServerSettings, SharedCache};

/// Main entry point for the Redis Lite server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the shared cache with the configured capacity
/// 4. Start the optional stats reporter
/// 5. Bind the TCP listener and serve clients
/// 6. Stop accepting on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redis_lite=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Redis Lite server");

    let config = Config::from_env().context("Invalid configuration")?;
    info!(
        "Configuration loaded: capacity={}, addr={}, max_line_length={}, max_connections={}",
        config.capacity,
        config.listen_addr(),
        config.max_line_length,
        config.max_connections
    );

    let cache = SharedCache::with_capacity(config.capacity).context("Failed to create cache")?;
    info!("LRU cache capacity: {}", config.capacity);

    let reporter = (config.stats_interval > 0)
        .then(|| spawn_stats_reporter(cache.clone(), config.stats_interval));

    let listener = TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr()))?;
    info!("Server listening on {}", listener.local_addr()?);

    serve(
        listener,
        Dispatcher::new(cache),
        ServerSettings::from(&config),
        shutdown_signal(),
    )
    .await?;

    if let Some(handle) = reporter {
        handle.abort();
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
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
