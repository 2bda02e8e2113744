//! Error types for advisory pipeline operations

use thiserror::Error;

/// Advisory pipeline specific errors
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Rate limit signalled by a provider (HTTP 429 or equivalent)
    #[error("Rate limit exceeded for {provider}")]
    RateLimited {
        provider: String,
    },

    /// Resource does not exist and never will (HTTP 404 or equivalent)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Provider returned an unexpected error response
    #[error("API error: {0}")]
    Api(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generative model call failed
    #[error("Model error: {0}")]
    Model(String),

    /// Prompt template rendering error
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Caller supplied input that violates a provider contract
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl AdvisorError {
    /// True for rate-limit signals, which retry after a fixed backoff.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// True for transient failures worth retrying.
    ///
    /// Not-found, malformed-payload and configuration errors are permanent:
    /// retrying them spins uselessly, so they fail on the first attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Network(_) | Self::Api(_)
        )
    }
}

/// Result type alias for advisory operations
pub type Result<T> = std::result::Result<T, AdvisorError>;
