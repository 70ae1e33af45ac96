// Main entry point for the crawl control-plane gateway

use std::sync::Arc;

use anyhow::{Context, Result};
use gateway_core::server::{build_app, AxumAppState};
use gateway_core::{kernel::EngineClient, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gateway_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting crawl control-plane gateway");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(engine = %config.elasticsearch_url, "Configuration loaded");

    // Connect to the search engine and provision schemas. A gateway that
    // cannot schema-check its store must not accept traffic.
    let engine = Arc::new(
        EngineClient::new(&config.elasticsearch_url, config.engine_timeout)
            .context("Failed to create engine client")?,
    );
    engine
        .ensure_schemas()
        .await
        .context("Failed to provision search indices")?;
    tracing::info!("Search indices ready");

    // Build application
    let state = AxumAppState::from_config(&config, engine);
    let app = build_app(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
