//! Prometheus exporter for Presto clusters.
//!
//! On every scrape the exporter queries the coordinator's status API and
//! translates the answers into gauges served on an HTTP `/metrics` endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │   Coordinator   │<────│    Collector    │<────│   HTTP Server   │
//! │ (/v1/cluster,   │     │ (fetch, decode, │     │   (/metrics)    │
//! │  /v1/info,      │     │  map, encode)   │     │                 │
//! │  /v1/query)     │     │                 │     │                 │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! A scrape fetches the three resources in order and stops at the first
//! failure; a failed scrape yields an empty metrics page.
//!
//! # Usage
//!
//! ```bash
//! presto-exporter --web.url http://coordinator:8080
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for configuration options.

pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod http;
pub mod mapping;
pub mod model;

pub use client::PrestoClient;
pub use collector::{PrestoCollector, SharedCollector};
pub use config::{ConfigError, ExporterConfig, LogFormat, LoggingConfig};
pub use error::ScrapeError;
pub use http::HttpServer;

/// Initialize tracing with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .try_init()
            .map_err(|e| ConfigError::Logging(e.to_string()))?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .try_init()
            .map_err(|e| ConfigError::Logging(e.to_string()))?,
    }

    Ok(())
}
