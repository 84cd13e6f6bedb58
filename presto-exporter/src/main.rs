//! Prometheus exporter for Presto clusters.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use presto_exporter::config::parse_listen_address;
use presto_exporter::{
    ExporterConfig, HttpServer, LogFormat, PrestoClient, PrestoCollector, init_tracing,
};

/// Prometheus exporter for Presto.
#[derive(Parser, Debug)]
#[command(name = "presto-exporter")]
#[command(about = "Export Presto cluster status as Prometheus metrics")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address on which to expose metrics and web interface [default: :9483].
    #[arg(long = "web.listen-address")]
    listen_address: Option<String>,

    /// Path under which to expose metrics [default: /metrics].
    #[arg(long = "web.telemetry-path")]
    telemetry_path: Option<String>,

    /// Presto cluster address [default: http://localhost:8080].
    #[arg(long = "web.url")]
    url: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long = "log.level")]
    log_level: Option<String>,

    /// Log output format.
    #[arg(long = "log.format", value_enum)]
    log_format: Option<LogFormat>,
}

impl Args {
    /// Apply CLI overrides on top of the loaded configuration.
    fn apply(self, config: &mut ExporterConfig) {
        if let Some(listen_address) = self.listen_address {
            config.web.listen_address = listen_address;
        }
        if let Some(telemetry_path) = self.telemetry_path {
            config.web.telemetry_path = telemetry_path;
        }
        if let Some(url) = self.url {
            config.presto.url = url;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => ExporterConfig::load_from_file(path)?,
        None => ExporterConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    init_tracing(&config.logging)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting {}",
        env!("CARGO_PKG_NAME")
    );

    let listen_addr = parse_listen_address(&config.web.listen_address)?;
    let hostname = config.resolve_hostname();

    let client = PrestoClient::new(&config.presto.url, config.presto.timeout())?;
    let collector = Arc::new(PrestoCollector::new(client, hostname));

    info!(
        upstream = %config.presto.url,
        hostname = %collector.hostname(),
        timeout_secs = config.presto.timeout_secs,
        "Collector configured"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let http_server = HttpServer::new(
        collector,
        listen_addr,
        config.web.telemetry_path.clone(),
    );
    let mut http_task = tokio::spawn(async move { http_server.run(shutdown_rx).await });

    // Wait for shutdown signal, or for the server to exit on its own (bind failure)
    tokio::select! {
        result = &mut http_task => {
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => {
                    error!("HTTP server error: {}", e);
                    Err(e)
                }
                Err(e) => Err(anyhow::anyhow!("HTTP server task failed: {}", e)),
            };
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate_signal() => {
            info!("Received SIGTERM, shutting down...");
        }
    }

    // Signal shutdown
    shutdown_tx.send(true)?;

    let _ = tokio::time::timeout(Duration::from_secs(5), http_task).await;

    info!("Exporter stopped");
    Ok(())
}

#[cfg(unix)]
async fn terminate_signal() {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate_signal() {
    std::future::pending::<()>().await;
}
