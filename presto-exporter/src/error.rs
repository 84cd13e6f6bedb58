use reqwest::StatusCode;
use thiserror::Error;

/// Failure of one stage of a scrape against the coordinator.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: StatusCode },

    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ScrapeError {
    /// The upstream URL that failed.
    pub fn url(&self) -> &str {
        match self {
            ScrapeError::Request { url, .. }
            | ScrapeError::Status { url, .. }
            | ScrapeError::Body { url, .. }
            | ScrapeError::Decode { url, .. } => url,
        }
    }
}

/// Result type alias for scrape operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;
