//! Error types for the Hyperbolic adapter.
//!
//! Only configuration and credential failures escape a constructed client.
//! Request-time variants exist so the retry loop can reason about them
//! before they are absorbed into fallback values.

use super::{ConfigError, KeyError};
use thiserror::Error;

/// Top-level error type for the adapter.
#[derive(Debug, Error)]
pub enum ProviderError {
    // ═══════════════════════════════════════════════════════════════════
    // Construction — surfaced to the caller
    // ═══════════════════════════════════════════════════════════════════

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Credential error: {0}")]
    Credential(#[from] KeyError),

    // ═══════════════════════════════════════════════════════════════════
    // Request time — absorbed into fallback results
    // ═══════════════════════════════════════════════════════════════════

    #[error("Rate limited (status {status})")]
    RateLimited { status: u16 },

    #[error("Hyperbolic API error: {status} - {body}")]
    Remote { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Build the error for a non-success HTTP response.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 429 {
            Self::RateLimited { status }
        } else {
            Self::Remote { status, body }
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { status } | Self::Remote { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is a rate limit and may be retried after backoff.
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }
}

/// Result type alias for the adapter.
pub type Result<T> = std::result::Result<T, ProviderError>;
