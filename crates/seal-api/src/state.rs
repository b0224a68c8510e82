//! # Application State
//!
//! Shared state handed to every handler: the seal registry and the
//! Prometheus handle used by `/metrics`. Cloning is cheap; everything
//! behind it is reference-counted.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use seal_registry::{
    parse_sectors, ConfigError, RegistryConfig, SealRegistry, SectorInfo, StaticDirectory,
};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Sectors known to the directory collaborator.
    pub sectors: Vec<SectorInfo>,
    pub registry: RegistryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            sectors: Vec::new(),
            registry: RegistryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 8080)
    /// - `SEAL_SECTORS`: comma-separated `id=Display Name` pairs
    /// - everything read by [`RegistryConfig::from_env`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let sectors = match std::env::var("SEAL_SECTORS") {
            Ok(raw) => parse_sectors(&raw)?,
            Err(_) => Vec::new(),
        };
        Ok(Self {
            port,
            sectors,
            registry: RegistryConfig::from_env()?,
        })
    }
}

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub registry: Arc<SealRegistry>,
    /// Present when the binary installed a Prometheus recorder.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// In-memory registry over the configured sectors, no metrics recorder.
    pub fn new(config: &AppConfig) -> Self {
        let directory: StaticDirectory = config.sectors.iter().cloned().collect();
        let registry = SealRegistry::in_memory(Arc::new(directory), config.registry.clone());
        Self {
            registry: Arc::new(registry),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
