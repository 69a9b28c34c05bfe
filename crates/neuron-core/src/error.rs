//! Error types shared by repositories and the JSON:API codec

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding JSON:API documents
#[derive(Debug, Error)]
pub enum CodecError {
    /// Malformed JSON or a document that does not fit the model
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Model did not serialize to a JSON object
    #[error("model '{0}' does not serialize to a JSON object")]
    NotAnObject(&'static str),

    /// Resource type in the document does not match the target model
    #[error("resource type mismatch: expected '{expected}', got '{actual}'")]
    TypeMismatch {
        expected: &'static str,
        actual: String,
    },

    /// Resource type is not known to the model registry
    #[error("unregistered resource type: {0}")]
    UnregisteredType(String),

    /// Scope value holds nothing to encode
    #[error("scope has no value to encode")]
    NoValue,
}

/// Classification of an [`ApiError`]
///
/// Status-derived kinds are produced when the server answers with an error
/// status and an empty body. `Payload` marks errors parsed from a JSON:API
/// error document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    NotAcceptable,
    Conflict,
    Internal,
    ServerBusy,
    #[default]
    Undefined,
    Payload,
}

/// A JSON:API error object
///
/// `status` is kept as a string, as it travels on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip, default = "payload_kind")]
    pub kind: ErrorKind,
}

fn payload_kind() -> ErrorKind {
    ErrorKind::Payload
}

impl ApiError {
    /// Create an error of the given kind
    pub fn new(kind: ErrorKind, code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: None,
            status: None,
            code: code.into(),
            title: title.into(),
            detail: None,
            kind,
        }
    }

    /// Attach a human-readable detail
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attach the HTTP status code
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status.to_string());
        self
    }

    /// HTTP status code, if present and numeric
    pub fn status_code(&self) -> Option<u16> {
        self.status.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "{}", self.code)?;
        } else {
            write!(f, "{}", self.title)?;
        }
        if let Some(status) = &self.status {
            write!(f, " (status {})", status)?;
        }
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// JSON:API error document: `{"errors": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorsPayload {
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_errors_are_payload_kind() {
        let payload: ErrorsPayload = serde_json::from_str(
            r#"{"errors":[{"status":"400","code":"INVALID_FIELD","title":"Invalid field","detail":"name is required"}]}"#,
        )
        .unwrap();

        assert_eq!(payload.errors.len(), 1);
        let err = &payload.errors[0];
        assert_eq!(err.kind, ErrorKind::Payload);
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(err.detail.as_deref(), Some("name is required"));
    }

    #[test]
    fn test_display() {
        let err = ApiError::new(ErrorKind::NotFound, "RESOURCE_NOT_FOUND", "Resource not found")
            .with_status(404)
            .with_detail("article 7");
        assert_eq!(err.to_string(), "Resource not found (status 404): article 7");
    }

    #[test]
    fn test_serialize_skips_empty_fields() {
        let err = ApiError::new(ErrorKind::Conflict, "CONFLICT", "");
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"code":"CONFLICT"}"#);
    }
}
