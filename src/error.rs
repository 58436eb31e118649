//! Error types for todocore.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias for todo operations
pub type TodoResult<T> = Result<T, TodoError>;

/// Main error type for todo operations
#[derive(Error, Debug)]
pub enum TodoError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("server rejected request with status {0}")]
    ServerRejected(u16),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TodoError {
    /// Create a new network error
    pub fn network(message: impl Into<String>) -> Self {
        TodoError::Network(message.into())
    }

    /// Create a new decode error
    pub fn decode(message: impl Into<String>) -> Self {
        TodoError::Decode(message.into())
    }

    /// Create a new storage error
    pub fn storage(message: impl Into<String>) -> Self {
        TodoError::Storage(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_rejected_display() {
        let err = TodoError::ServerRejected(409);
        assert_eq!(err.to_string(), "server rejected request with status 409");
    }

    #[test]
    fn test_network_helper() {
        let err = TodoError::network("connection refused");
        assert!(matches!(err, TodoError::Network(_)));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: TodoError = io.into();
        assert!(matches!(err, TodoError::Io(_)));
    }
}
