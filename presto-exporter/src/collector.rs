//! Per-scrape collector and Prometheus text encoding.

use std::io::Write;
use std::sync::Arc;

use tracing::{debug, error};

use crate::client::PrestoClient;
use crate::error::Result;
use crate::mapping::{DESCRIPTORS, Metric, MetricDesc, Sample, map_snapshots};

/// Collects a fresh snapshot of the coordinator on every call.
///
/// Holds no mutable state, so concurrent scrapes never observe each other.
#[derive(Debug, Clone)]
pub struct PrestoCollector {
    client: PrestoClient,
    hostname: String,
}

/// Shareable collector handle.
pub type SharedCollector = Arc<PrestoCollector>;

impl PrestoCollector {
    /// Create a collector. `hostname` is attached to every sample.
    pub fn new(client: PrestoClient, hostname: impl Into<String>) -> Self {
        Self {
            client,
            hostname: hostname.into(),
        }
    }

    /// The hostname label value.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// The fixed set of metric families this collector can produce.
    pub fn describe(&self) -> &'static [MetricDesc] {
        &DESCRIPTORS
    }

    /// Fetch cluster, info and query list in order, stopping at the first
    /// failure.
    pub async fn try_collect(&self) -> Result<Vec<Sample>> {
        let cluster = self.client.cluster().await?;
        let info = self.client.info().await?;
        let queries = self.client.queries().await?;

        Ok(map_snapshots(&self.hostname, &cluster, &info, &queries))
    }

    /// Collect samples, or nothing if any upstream stage fails.
    pub async fn collect(&self) -> Vec<Sample> {
        match self.try_collect().await {
            Ok(samples) => {
                debug!(samples = samples.len(), "Scrape completed");
                samples
            }
            Err(e) => {
                error!(url = %e.url(), error = %e, "Scrape failed");
                Vec::new()
            }
        }
    }

    /// Collect and encode in Prometheus exposition format.
    pub async fn render(&self) -> String {
        encode_text(&self.collect().await)
    }
}

/// Encode samples in Prometheus text format 0.0.4.
///
/// Families appear in descriptor order; families without samples are omitted.
pub fn encode_text(samples: &[Sample]) -> String {
    let mut output = Vec::with_capacity(samples.len() * 100);

    for metric in Metric::ALL {
        let mut family = samples.iter().filter(|s| s.metric == metric).peekable();
        if family.peek().is_none() {
            continue;
        }

        let desc = metric.desc();
        let name = desc.fq_name();
        writeln!(output, "# HELP {} {}", name, desc.help).ok();
        writeln!(output, "# TYPE {} gauge", name).ok();

        for sample in family {
            writeln!(
                output,
                "{}{} {}",
                name,
                format_labels(sample),
                format_value(sample.value)
            )
            .ok();
        }
    }

    String::from_utf8(output).unwrap_or_default()
}

/// Escape special characters in label values.
fn escape_label_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

/// Format a floating point value for Prometheus.
fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Format a sample's labels for Prometheus exposition format.
fn format_labels(sample: &Sample) -> String {
    if sample.labels.is_empty() {
        return String::new();
    }

    let parts: Vec<String> = sample
        .label_pairs()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
        .collect();

    format!("{{{}}}", parts.join(","))
}
