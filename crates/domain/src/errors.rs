//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for SyncBridge
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SyncError {
    /// Login against an external system failed with bad credentials. Fatal,
    /// surfaced to the caller, never retried by the token manager.
    #[error("Authentication failure: {0}")]
    AuthenticationFailure(String),

    /// All retry attempts against an upstream system were exhausted.
    #[error("Upstream unavailable after {attempts} attempts: {last_error}")]
    UpstreamUnavailable { attempts: u32, last_error: String },

    /// Upstream returned 404. Surfaced to the caller, never cached.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed webhook event or unmappable payload. Client error, not
    /// retried.
    #[error("Validation failure: {0}")]
    ValidationFailure(String),

    /// Webhook signature verification failed. Fatal, logged with source IP.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for SyncBridge operations
pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    /// True for failures that a caller may reasonably retry later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable { .. } | Self::Network(_))
    }
}
