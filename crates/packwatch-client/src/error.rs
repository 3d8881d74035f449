//! Error types for the packwatch HTTP clients

use thiserror::Error;

/// Errors that can occur when talking to the catalog or a webhook
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Remote returned an error status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Catalog returned no candidate versions
    #[error("no versions found for project")]
    NoReleases,

    /// Client is missing required settings
    #[error("not configured: {0}")]
    NotConfigured(String),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
