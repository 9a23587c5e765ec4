//! Error types for the indexer client.

use thiserror::Error;

/// Errors that can occur when talking to the indexing API.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Typed error returned by the API.
    #[error("API error: {error} - {message}")]
    Api { error: String, message: String },

    /// Rate limited.
    #[error("rate limited{}", match retry_after_secs {
        Some(secs) => format!(" (retry after {}s)", secs),
        None => String::new(),
    })]
    RateLimited {
        /// Seconds to wait before retrying (from Retry-After header, optional).
        retry_after_secs: Option<u64>,
    },

    /// The API is temporarily unavailable (5xx).
    #[error("indexer unavailable: HTTP {status}")]
    Unavailable { status: u16 },

    /// Invalid response from server.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
