//! Error types for neuron client operations

use std::path::PathBuf;

use neuron_core::{ApiError, CodecError, ContextError, ErrorKind};
use reqwest::Method;
use thiserror::Error;

/// Result type alias for neuron client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during neuron client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection settings failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),

    /// Configuration file could not be read or parsed
    #[error("Failed to load configuration from {path}: {message}")]
    ConfigLoad { path: PathBuf, message: String },

    /// Startup health check did not pass
    #[error("Health check failed: {0}")]
    HealthCheck(String),

    /// The HTTP request could not be constructed
    #[error("Failed to create {method} request for {url}: {source}")]
    RequestBuild {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Local IO failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level failure (connect, DNS, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Response used a Content-Encoding the client does not decode
    #[error("Unsupported Content-Encoding value: {0}")]
    UnsupportedContentEncoding(String),

    /// Compressed response body could not be decoded
    #[error("Failed to decompress response body: {0}")]
    Decompression(#[source] std::io::Error),

    /// Identifier-addressed operation on a scope without primary filters
    #[error("Scope has no primary filters")]
    NoPrimaryFilters,

    /// Payload encode/decode failure
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Server answered with an error status and no body
    #[error("Server error: {0}")]
    Status(ApiError),

    /// Server answered with a JSON:API error document
    #[error("Server returned {} error(s): {}", .0.len(), join_errors(.0))]
    MultipleErrors(Vec<ApiError>),

    /// Scope context was cancelled or its deadline passed
    #[error("Request aborted: {0}")]
    Context(#[from] ContextError),
}

fn join_errors(errors: &[ApiError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ClientError {
    /// Kind of the status-derived error, if this is one
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Status(err) => Some(err.kind),
            _ => None,
        }
    }

    /// API errors carried by this error, in server order
    pub fn api_errors(&self) -> &[ApiError] {
        match self {
            Self::Status(err) => std::slice::from_ref(err),
            Self::MultipleErrors(errs) => errs,
            _ => &[],
        }
    }

    /// True when the scope context ended the call
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Context(_))
    }

    /// True when the server was never reached or the exchange broke off
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_errors_display() {
        let err = ClientError::MultipleErrors(vec![
            ApiError::new(ErrorKind::Payload, "A", "First"),
            ApiError::new(ErrorKind::Payload, "B", "Second"),
        ]);
        assert_eq!(err.to_string(), "Server returned 2 error(s): First; Second");
        assert_eq!(err.api_errors().len(), 2);
        assert_eq!(err.kind(), None);
    }

    #[test]
    fn test_status_kind() {
        let err = ClientError::Status(ApiError::new(ErrorKind::NotFound, "NOT_FOUND", "Not found"));
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
        assert!(!err.is_cancelled());
    }
}
