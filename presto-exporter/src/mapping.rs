//! Mapping from coordinator snapshots to Prometheus gauge samples.

use tracing::warn;

use crate::model::{ClusterSnapshot, NodeInfoSnapshot, QueryRecord};

/// Prefix shared by every exported metric name.
pub const NAMESPACE: &str = "presto_cluster";

/// Immutable description of one metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDesc {
    /// Name without the namespace prefix.
    pub name: &'static str,
    /// HELP text.
    pub help: &'static str,
    /// Label names, in the order sample label values are stored.
    pub labels: &'static [&'static str],
}

impl MetricDesc {
    /// Fully qualified metric name, e.g. `presto_cluster_running_queries`.
    pub fn fq_name(&self) -> String {
        format!("{}_{}", NAMESPACE, self.name)
    }
}

const HOSTNAME_LABELS: &[&str] = &["hostname"];

/// Label schema of the per-query gauge.
///
/// Names match the Go exporter exactly, including `PeakUserMemoryReservation`,
/// so existing dashboards keep working.
pub const QUERY_LABELS: &[&str] = &[
    "hostname",
    "queryId",
    "state",
    "scheduled",
    "query",
    "queuedTime",
    "elapsedTime",
    "executionTime",
    "totalDrivers",
    "rawInputDataSize",
    "cumulativeUserMemory",
    "PeakUserMemoryReservation",
    "totalCpuTime",
    "totalScheduledTime",
];

/// The exported metric families. Discriminants index [`DESCRIPTORS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    RunningQueries,
    BlockedQueries,
    QueuedQueries,
    ActiveWorkers,
    RunningDrivers,
    ReservedMemory,
    TotalInputRows,
    TotalInputBytes,
    TotalCpuTimeSecs,
    Uptime,
    Querys,
}

impl Metric {
    /// All families, in exposition order.
    pub const ALL: [Metric; 11] = [
        Metric::RunningQueries,
        Metric::BlockedQueries,
        Metric::QueuedQueries,
        Metric::ActiveWorkers,
        Metric::RunningDrivers,
        Metric::ReservedMemory,
        Metric::TotalInputRows,
        Metric::TotalInputBytes,
        Metric::TotalCpuTimeSecs,
        Metric::Uptime,
        Metric::Querys,
    ];

    /// The static descriptor for this family.
    pub fn desc(self) -> &'static MetricDesc {
        &DESCRIPTORS[self as usize]
    }
}

/// Descriptor table, indexed by [`Metric`].
pub static DESCRIPTORS: [MetricDesc; 11] = [
    MetricDesc {
        name: "running_queries",
        help: "Running requests of the presto cluster.",
        labels: HOSTNAME_LABELS,
    },
    MetricDesc {
        name: "blocked_queries",
        help: "Blocked queries of the presto cluster.",
        labels: HOSTNAME_LABELS,
    },
    MetricDesc {
        name: "queued_queries",
        help: "Queued queries of the presto cluster.",
        labels: HOSTNAME_LABELS,
    },
    MetricDesc {
        name: "active_workers",
        help: "Active workers of the presto cluster.",
        labels: HOSTNAME_LABELS,
    },
    MetricDesc {
        name: "running_drivers",
        help: "Running drivers of the presto cluster.",
        labels: HOSTNAME_LABELS,
    },
    MetricDesc {
        name: "reserved_memory",
        help: "Reserved memory of the presto cluster.",
        labels: HOSTNAME_LABELS,
    },
    MetricDesc {
        name: "total_input_rows",
        help: "Total input rows of the presto cluster.",
        labels: HOSTNAME_LABELS,
    },
    MetricDesc {
        name: "total_input_bytes",
        help: "Total input bytes of the presto cluster.",
        labels: HOSTNAME_LABELS,
    },
    MetricDesc {
        name: "total_cpu_time_secs",
        help: "Total cpu time of the presto cluster.",
        labels: HOSTNAME_LABELS,
    },
    MetricDesc {
        name: "uptime",
        help: "Total up time of the presto cluster in days.",
        labels: HOSTNAME_LABELS,
    },
    MetricDesc {
        name: "querys",
        help: "Querys of the presto cluster.",
        labels: QUERY_LABELS,
    },
];

/// One gauge sample. Label values follow the order of the family's schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub metric: Metric,
    pub labels: Vec<String>,
    pub value: f64,
}

impl Sample {
    /// Look up a label value by name.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.metric
            .desc()
            .labels
            .iter()
            .position(|l| *l == name)
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }

    /// Label name/value pairs in schema order.
    pub fn label_pairs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.metric
            .desc()
            .labels
            .iter()
            .copied()
            .zip(self.labels.iter().map(String::as_str))
    }
}

/// Map the nine cluster counters, one hostname-labeled sample each.
pub fn cluster_samples(cluster: &ClusterSnapshot, hostname: &str) -> Vec<Sample> {
    [
        (Metric::RunningQueries, cluster.running_queries),
        (Metric::BlockedQueries, cluster.blocked_queries),
        (Metric::QueuedQueries, cluster.queued_queries),
        (Metric::ActiveWorkers, cluster.active_workers),
        (Metric::RunningDrivers, cluster.running_drivers),
        (Metric::ReservedMemory, cluster.reserved_memory),
        (Metric::TotalInputRows, cluster.total_input_rows),
        (Metric::TotalInputBytes, cluster.total_input_bytes),
        (Metric::TotalCpuTimeSecs, cluster.total_cpu_time_secs),
    ]
    .into_iter()
    .map(|(metric, value)| Sample {
        metric,
        labels: vec![hostname.to_string()],
        value,
    })
    .collect()
}

/// Map the coordinator uptime to days.
///
/// An unparseable uptime is reported as 0 rather than failing the scrape.
pub fn uptime_sample(info: &NodeInfoSnapshot, hostname: &str) -> Sample {
    let value = parse_uptime_days(&info.uptime).unwrap_or_else(|| {
        warn!(uptime = %info.uptime, "Unparseable coordinator uptime, reporting 0");
        0.0
    });

    Sample {
        metric: Metric::Uptime,
        labels: vec![hostname.to_string()],
        value,
    }
}

/// Map one query to a `querys` sample valued at its cumulative user memory.
pub fn query_sample(query: &QueryRecord, hostname: &str) -> Sample {
    let stats = &query.query_stats;

    Sample {
        metric: Metric::Querys,
        labels: vec![
            hostname.to_string(),
            query.query_id.clone(),
            query.state.clone(),
            query.scheduled.to_string(),
            query.query.clone(),
            stats.queued_time.clone(),
            stats.elapsed_time.clone(),
            stats.execution_time.clone(),
            stats.total_drivers.to_string(),
            stats.raw_input_data_size.clone(),
            format_float32_exp(stats.cumulative_user_memory),
            stats.peak_user_memory_reservation.clone(),
            stats.total_cpu_time.clone(),
            stats.total_scheduled_time.clone(),
        ],
        value: stats.cumulative_user_memory,
    }
}

/// Map a full set of snapshots into samples, in exposition order.
pub fn map_snapshots(
    hostname: &str,
    cluster: &ClusterSnapshot,
    info: &NodeInfoSnapshot,
    queries: &[QueryRecord],
) -> Vec<Sample> {
    let mut samples = cluster_samples(cluster, hostname);
    samples.reserve(1 + queries.len());
    samples.push(uptime_sample(info, hostname));
    samples.extend(queries.iter().map(|q| query_sample(q, hostname)));
    samples
}

/// Parse a Presto duration string ("5.20d", "12h", "350.00ms") into days.
///
/// A bare number is taken as days. Returns `None` for an empty number or an
/// unknown unit.
pub fn parse_uptime_days(uptime: &str) -> Option<f64> {
    let trimmed = uptime.trim();
    let unit_start = trimmed
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .len();
    let (number, unit) = trimmed.split_at(unit_start);

    let number = number.trim();
    if number.is_empty() {
        return None;
    }
    let value: f64 = number.parse().ok()?;

    let per_day = match unit {
        "" | "d" => 1.0,
        "h" => 24.0,
        "m" => 24.0 * 60.0,
        "s" => 86_400.0,
        "ms" => 86_400.0 * 1e3,
        "us" => 86_400.0 * 1e6,
        "ns" => 86_400.0 * 1e9,
        _ => return None,
    };

    Some(value / per_day)
}

/// Format a value the way Go's `strconv.FormatFloat(v, 'E', -1, 32)` does:
/// shortest f32 digits, uppercase `E`, signed exponent of at least two digits.
pub fn format_float32_exp(value: f64) -> String {
    let narrowed = value as f32;
    if narrowed.is_nan() {
        return "NaN".to_string();
    }
    if narrowed.is_infinite() {
        return if narrowed.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        };
    }

    let formatted = format!("{:E}", narrowed);
    let Some((mantissa, exponent)) = formatted.split_once('E') else {
        return formatted;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };

    format!("{}E{}{:02}", mantissa, sign, exponent.abs())
}
