//! HTTP status translation into typed errors
//!
//! An error status with a body is read as a JSON:API error document; an
//! error status without one maps through [`STATUS_ERRORS`], falling back to
//! an `UNDEFINED` error tagged with the status.

use std::io::Read;

use neuron_core::{ApiError, CodecError, ErrorKind, ErrorsPayload};
use reqwest::{Method, StatusCode};

use crate::error::{ClientError, Result};

type ErrorConstructor = fn(&Method) -> ApiError;

/// Status codes with a fixed error
pub const STATUS_ERRORS: &[(u16, ErrorConstructor)] = &[
    (400, |_| ApiError::new(ErrorKind::BadRequest, "BAD_REQUEST", "Bad request")),
    (403, |_| ApiError::new(ErrorKind::Forbidden, "ENDPOINT_FORBIDDEN", "Endpoint forbidden")),
    (404, |_| ApiError::new(ErrorKind::NotFound, "RESOURCE_NOT_FOUND", "Resource not found")),
    (405, |method| {
        ApiError::new(ErrorKind::MethodNotAllowed, "METHOD_NOT_ALLOWED", "Method not allowed")
            .with_detail(format!("The method: '{}'.", method))
    }),
    (406, |_| ApiError::new(ErrorKind::NotAcceptable, "NOT_ACCEPTABLE", "Not acceptable")),
    (409, |_| {
        ApiError::new(ErrorKind::Conflict, "RESOURCE_ALREADY_EXISTS", "Resource already exists")
    }),
    (500, |_| {
        ApiError::new(ErrorKind::Internal, "INTERNAL_ERROR", "Internal server error")
            .with_detail("server encountered undefined internal error")
    }),
    (503, |_| ApiError::new(ErrorKind::ServerBusy, "SERVER_BUSY", "Server busy")),
];

/// The fixed error for `status`, or an undefined error tagged with it
pub fn status_error(status: StatusCode, method: &Method) -> ApiError {
    let code = status.as_u16();
    STATUS_ERRORS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, construct)| construct(method))
        .unwrap_or_else(|| ApiError::new(ErrorKind::Undefined, "UNDEFINED", "Undefined Error"))
        .with_status(code)
}

/// Classify a response: `Ok` for success statuses, the typed error otherwise
///
/// `body_len` is the declared body length (or the received length when
/// none was declared). Any parsed error document is returned as
/// `MultipleErrors`, even one without entries.
pub fn translate(
    status: StatusCode,
    method: &Method,
    body: &mut dyn Read,
    body_len: u64,
) -> Result<()> {
    if status.as_u16() < 400 {
        return Ok(());
    }

    if body_len != 0 {
        let payload: ErrorsPayload = serde_json::from_reader(body).map_err(CodecError::from)?;
        return Err(ClientError::MultipleErrors(payload.errors));
    }

    Err(ClientError::Status(status_error(status, method)))
}
