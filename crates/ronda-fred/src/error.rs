//! Error types for the FRED API client.

use ronda_traits::RondaError;
use thiserror::Error;

/// Errors that can occur when using the FRED API.
#[derive(Debug, Error)]
pub enum FredError {
    /// Missing API key.
    #[error("FRED_API_KEY environment variable not set")]
    MissingApiKey,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error.
    #[error("FRED API error: {0}")]
    Api(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded. FRED allows 120 requests per minute.")]
    RateLimitExceeded,

    /// No data available.
    #[error("No data available for {0}")]
    NoData(String),

    /// Observations could not be turned into a series.
    #[error("Invalid series data: {0}")]
    Data(#[from] RondaError),

    /// Environment variable error.
    #[error("Environment error: {0}")]
    Env(#[from] dotenvy::Error),
}
