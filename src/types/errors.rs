//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation. The core
//! only ever raises two kinds: `Validation` (rejected before any remote call)
//! and `Remote` (whatever the resource client reported, passed through as-is).

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the RDS MySQL tool server.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller arguments violate a documented constraint. Never reaches the network.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failure reported by the resource client for a forwarded request.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Unknown operation name.
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing or malformed process configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure of the transport runtime carrying tool invocations.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Failures of the remote call itself.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Connection, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status without a structured service error.
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// The service rejected the request.
    #[error("{code}: {message} (request id: {request_id})")]
    Service {
        code: String,
        message: String,
        request_id: String,
    },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl Error {
    /// Stable error code surfaced to tool callers.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "INVALID_ARGUMENT",
            Error::Remote(_) => "REMOTE_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Config(_) | Error::Serialization(_) | Error::Transport(_) => "INTERNAL",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::validation("x").code(), "INVALID_ARGUMENT");
        assert_eq!(Error::not_found("x").code(), "NOT_FOUND");
        assert_eq!(Error::config("x").code(), "INTERNAL");
        let remote = Error::from(RemoteError::Decode("eof".to_string()));
        assert_eq!(remote.code(), "REMOTE_ERROR");
    }

    #[test]
    fn test_service_error_display_keeps_code_and_request_id() {
        let err = Error::from(RemoteError::Service {
            code: "InvalidInstanceId.NotFound".to_string(),
            message: "instance does not exist".to_string(),
            request_id: "20240101-abc".to_string(),
        });
        let text = err.to_string();
        assert!(text.contains("InvalidInstanceId.NotFound"));
        assert!(text.contains("20240101-abc"));
        assert!(!err.is_validation());
    }
}
