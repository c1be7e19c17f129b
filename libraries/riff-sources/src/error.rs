//! Error types for the track providers.

use riff_core::CoreError;
use thiserror::Error;

/// Errors that can occur when talking to a streaming backend.
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend is offline or unreachable
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    /// Backend answered with a non-success status
    #[error("Backend error ({status}): {message}")]
    Status { status: u16, message: String },

    /// Invalid base URL
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse backend response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl SourceError {
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Unreachable(err.to_string())
        } else {
            Self::Request(err)
        }
    }
}

impl From<SourceError> for CoreError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::ParseError(msg) => CoreError::Parse(msg),
            other => CoreError::Network(other.to_string()),
        }
    }
}

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, SourceError>;
