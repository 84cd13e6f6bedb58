//! Snapshot types decoded from the coordinator's `/v1/*` endpoints.
//!
//! Missing or `null` fields decode to their zero value and unknown fields are
//! ignored, so the exporter keeps working across coordinator versions that add
//! or drop fields.

use serde::{Deserialize, Deserializer};

/// Read an optional value, mapping `null` to the type's default.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Cluster-wide counters from `/v1/cluster`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterSnapshot {
    #[serde(deserialize_with = "null_default")]
    pub running_queries: f64,
    #[serde(deserialize_with = "null_default")]
    pub blocked_queries: f64,
    #[serde(deserialize_with = "null_default")]
    pub queued_queries: f64,
    #[serde(deserialize_with = "null_default")]
    pub active_workers: f64,
    #[serde(deserialize_with = "null_default")]
    pub running_drivers: f64,
    #[serde(deserialize_with = "null_default")]
    pub reserved_memory: f64,
    #[serde(deserialize_with = "null_default")]
    pub total_input_rows: f64,
    #[serde(deserialize_with = "null_default")]
    pub total_input_bytes: f64,
    #[serde(deserialize_with = "null_default")]
    pub total_cpu_time_secs: f64,
}

/// Coordinator node identity from `/v1/info`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeInfoSnapshot {
    #[serde(deserialize_with = "null_default")]
    pub node_version: NodeVersion,
    #[serde(deserialize_with = "null_default")]
    pub environment: String,
    #[serde(deserialize_with = "null_default")]
    pub coordinator: bool,
    #[serde(deserialize_with = "null_default")]
    pub starting: bool,
    /// Presto duration string, e.g. "5.20d".
    #[serde(deserialize_with = "null_default")]
    pub uptime: String,
}

/// Version block of `/v1/info`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeVersion {
    #[serde(deserialize_with = "null_default")]
    pub version: String,
}

/// One entry of the `/v1/query` list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryRecord {
    #[serde(deserialize_with = "null_default")]
    pub query_id: String,
    #[serde(deserialize_with = "null_default")]
    pub state: String,
    #[serde(deserialize_with = "null_default")]
    pub scheduled: bool,
    #[serde(deserialize_with = "null_default")]
    pub query: String,
    #[serde(deserialize_with = "null_default")]
    pub query_stats: QueryStats,
}

/// Per-query statistics. Durations and data sizes stay in the coordinator's
/// textual form ("1.50s", "12.3MB").
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryStats {
    #[serde(deserialize_with = "null_default")]
    pub queued_time: String,
    #[serde(deserialize_with = "null_default")]
    pub elapsed_time: String,
    #[serde(deserialize_with = "null_default")]
    pub execution_time: String,
    #[serde(deserialize_with = "null_default")]
    pub total_drivers: i64,
    #[serde(deserialize_with = "null_default")]
    pub raw_input_data_size: String,
    #[serde(deserialize_with = "null_default")]
    pub cumulative_user_memory: f64,
    #[serde(deserialize_with = "null_default")]
    pub peak_user_memory_reservation: String,
    #[serde(deserialize_with = "null_default")]
    pub total_cpu_time: String,
    #[serde(deserialize_with = "null_default")]
    pub total_scheduled_time: String,
}

/// The `/v1/query` list. A `null` body decodes as an empty list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryList(pub Vec<QueryRecord>);

impl<'de> Deserialize<'de> for QueryList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        null_default(deserializer).map(QueryList)
    }
}
