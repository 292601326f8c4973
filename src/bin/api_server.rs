// API Server Binary Entry Point
//
// Purpose: Load the model stack and serve predictions + heatmaps over Axum
// Usage: cargo run --features api --bin api_server

use anyhow::Context;
use catch_scorer_rust::{create_router, AppState, ServiceConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "catch_scorer_rust=info,tower_http=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // Configuration from environment variables
    let config = ServiceConfig::from_env().context("Invalid server configuration")?;
    config.log_summary();
    let port = config.port;

    // Load models; a missing required artifact stops the server here
    tracing::info!("Initializing application state...");
    let state = AppState::new(config).await?;
    tracing::info!(
        "Application state initialized (hybrid pipeline: {})",
        if state.models.hybrid_available() { "loaded" } else { "absent" }
    );

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
