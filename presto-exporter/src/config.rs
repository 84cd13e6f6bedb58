//! Configuration for the Presto exporter.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

/// Complete exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Upstream coordinator settings.
    #[serde(default)]
    pub presto: PrestoConfig,

    /// Exporter HTTP endpoint settings.
    #[serde(default)]
    pub web: WebConfig,

    /// Value of the `hostname` label, or "auto" to use the machine hostname.
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Presto coordinator connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrestoConfig {
    /// Base URL of the coordinator (default: "http://localhost:8080").
    #[serde(default = "default_url")]
    pub url: String,

    /// Timeout for each upstream request (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl PrestoConfig {
    /// Upstream request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PrestoConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Exporter HTTP endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Address to listen on (default: ":9483").
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Path for the metrics endpoint (default: "/metrics").
    #[serde(default = "default_telemetry_path")]
    pub telemetry_path: String,
}

fn default_listen_address() -> String {
    ":9483".to_string()
}

fn default_telemetry_path() -> String {
    "/metrics".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            telemetry_path: default_telemetry_path(),
        }
    }
}

fn default_hostname() -> String {
    "auto".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Resolve a listen address, accepting the `:port` shorthand for all interfaces.
pub fn parse_listen_address(addr: &str) -> Result<SocketAddr, ConfigError> {
    let normalized = if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    };

    normalized
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| ConfigError::Validation(format!("Invalid listen address: {}", addr)))
}

impl ExporterConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.presto.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        match reqwest::Url::parse(&self.presto.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::Validation(format!(
                    "Unsupported URL scheme '{}' in {}",
                    url.scheme(),
                    self.presto.url
                )));
            }
            Err(e) => {
                return Err(ConfigError::Validation(format!(
                    "Invalid presto URL {}: {}",
                    self.presto.url, e
                )));
            }
        }

        parse_listen_address(&self.web.listen_address)?;

        let path = &self.web.telemetry_path;
        if !path.starts_with('/') {
            return Err(ConfigError::Validation(
                "Telemetry path must start with /".to_string(),
            ));
        }
        // Route syntax would turn the path into a capture or wildcard.
        if let Some(c) = path.chars().find(|c| matches!(c, ':' | '*' | '{' | '}')) {
            return Err(ConfigError::Validation(format!(
                "Telemetry path {} contains reserved character '{}'",
                path, c
            )));
        }
        // Both are served by fixed routes.
        if path == "/" || path == "/health" {
            return Err(ConfigError::Validation(format!(
                "Telemetry path {} collides with a built-in route",
                path
            )));
        }

        if self.hostname.is_empty() {
            return Err(ConfigError::Validation(
                "hostname must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the hostname label value, resolving "auto" if needed.
    pub fn resolve_hostname(&self) -> String {
        if self.hostname == "auto" {
            hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "unknown".to_string())
        } else {
            self.hostname.clone()
        }
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            presto: PrestoConfig::default(),
            web: WebConfig::default(),
            hostname: default_hostname(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = ExporterConfig::parse("{}").unwrap();

        assert_eq!(config.presto.url, "http://localhost:8080");
        assert_eq!(config.presto.timeout_secs, 10);
        assert_eq!(config.web.listen_address, ":9483");
        assert_eq!(config.web.telemetry_path, "/metrics");
        assert_eq!(config.hostname, "auto");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            presto: {
                url: "http://coordinator.example:8080",
                timeout_secs: 3
            },
            web: {
                listen_address: "127.0.0.1:19483",
                telemetry_path: "/presto/metrics"
            },
            hostname: "exporter-01",
            logging: {
                level: "debug",
                format: "json"
            }
        }"#;

        let config = ExporterConfig::parse(json).unwrap();

        assert_eq!(config.presto.url, "http://coordinator.example:8080");
        assert_eq!(config.presto.timeout(), Duration::from_secs(3));
        assert_eq!(config.web.listen_address, "127.0.0.1:19483");
        assert_eq!(config.web.telemetry_path, "/presto/metrics");
        assert_eq!(config.resolve_hostname(), "exporter-01");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ presto: {{ url: 'https://presto:8443' }} }}").unwrap();

        let config = ExporterConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.presto.url, "https://presto:8443");
    }

    #[test]
    fn test_load_missing_file() {
        let result = ExporterConfig::load_from_file("/nonexistent/presto-exporter.json5");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_parse_listen_address_go_shorthand() {
        let addr = parse_listen_address(":9483").unwrap();
        assert_eq!(addr, "0.0.0.0:9483".parse::<SocketAddr>().unwrap());

        let addr = parse_listen_address("127.0.0.1:8000").unwrap();
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_validate_invalid_listen() {
        let result = ExporterConfig::parse(r#"{ web: { listen_address: "not-an-address" } }"#);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid listen address")
        );
    }

    #[test]
    fn test_validate_invalid_path() {
        let result = ExporterConfig::parse(r#"{ web: { telemetry_path: "metrics" } }"#);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("must start with /")
        );
    }

    #[test]
    fn test_validate_path_collides_with_builtin_route() {
        assert!(ExporterConfig::parse(r#"{ web: { telemetry_path: "/" } }"#).is_err());
        assert!(ExporterConfig::parse(r#"{ web: { telemetry_path: "/health" } }"#).is_err());
    }

    #[test]
    fn test_validate_path_rejects_route_syntax() {
        for path in ["/metrics/:x", "/a*b", "/metrics/{id}", "/m}"] {
            let json = format!(r#"{{ web: {{ telemetry_path: "{}" }} }}"#, path);
            let err = ExporterConfig::parse(&json).unwrap_err();
            assert!(
                err.to_string().contains("reserved character"),
                "path {} should be rejected, got: {}",
                path,
                err
            );
        }

        assert!(ExporterConfig::parse(r#"{ web: { telemetry_path: "/presto-metrics_v1" } }"#).is_ok());
    }

    #[test]
    fn test_validate_invalid_url() {
        assert!(ExporterConfig::parse(r#"{ presto: { url: "localhost" } }"#).is_err());
        assert!(ExporterConfig::parse(r#"{ presto: { url: "ftp://presto" } }"#).is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let result = ExporterConfig::parse(r#"{ presto: { timeout_secs: 0 } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_hostname_auto() {
        let config = ExporterConfig::default();
        assert!(!config.resolve_hostname().is_empty());
    }
}
