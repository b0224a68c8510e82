//! # seal-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for the seal registry.
//! Binds to configurable port (default 8080).

use metrics_exporter_prometheus::PrometheusBuilder;

use seal_api::state::{AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {e}");
        e
    })?;
    if config.sectors.is_empty() {
        tracing::warn!("SEAL_SECTORS is empty; every distribution will be rejected");
    }

    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        tracing::error!("Metrics recorder installation failed: {e}");
        e
    })?;

    let state = AppState::new(&config).with_metrics(handle);
    let app = seal_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(sectors = config.sectors.len(), "Seal API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
