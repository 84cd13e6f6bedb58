//! HTTP client for the coordinator's `/v1` status API.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{Result, ScrapeError};
use crate::model::{ClusterSnapshot, NodeInfoSnapshot, QueryList, QueryRecord};

/// Client for a single coordinator.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PrestoClient {
    http: reqwest::Client,
    base_url: String,
}

impl PrestoClient {
    /// Create a client for `base_url` with the given per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ScrapeError::Request {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self::with_client(http, base_url))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The normalized base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of a `/v1` resource.
    pub fn resource_url(&self, resource: &str) -> String {
        format!("{}/v1/{}", self.base_url, resource)
    }

    /// Fetch `/v1/cluster`.
    pub async fn cluster(&self) -> Result<ClusterSnapshot> {
        self.fetch("cluster").await
    }

    /// Fetch `/v1/info`.
    pub async fn info(&self) -> Result<NodeInfoSnapshot> {
        self.fetch("info").await
    }

    /// Fetch `/v1/query`. A `null` list is treated as empty.
    pub async fn queries(&self) -> Result<Vec<QueryRecord>> {
        self.fetch::<QueryList>("query").await.map(|list| list.0)
    }

    /// GET a resource, require 200, read the body and decode it as JSON.
    async fn fetch<T: DeserializeOwned>(&self, resource: &str) -> Result<T> {
        let url = self.resource_url(resource);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ScrapeError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScrapeError::Status { url, status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ScrapeError::Body {
                url: url.clone(),
                source,
            })?;

        trace!(url = %url, bytes = body.len(), "Fetched upstream resource");

        serde_json::from_slice(&body).map_err(|source| ScrapeError::Decode { url, source })
    }
}
