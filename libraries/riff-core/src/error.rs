/// Core error types for Riff
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Riff
#[derive(Error, Debug)]
pub enum CoreError {
    /// Network errors (request failed, unreachable backend)
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with something we could not interpret
    #[error("Parse error: {0}")]
    Parse(String),
}

impl CoreError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
