//! Error types for the GitHub gateway boundary.
//!
//! Everything above the gateway degrades these to empty results, so the
//! variants mainly exist to drive retry decisions and log messages.

use thiserror::Error;

/// Failure talking to the GitHub REST API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The repository or path does not exist (or is not visible to the token).
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// GitHub asked us to slow down (HTTP 429, or 403 with an exhausted quota).
    #[error("rate limited by GitHub")]
    RateLimited { retry_after_ms: Option<u64> },

    /// Any other non-success status.
    #[error("GitHub returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport failure (DNS, connect, timeout, body read).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Whether a retry has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::NotFound { .. } | Self::Decode(_) => false,
        }
    }

    /// Server-provided wait hint, if any.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_ms } => *retry_after_ms,
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
