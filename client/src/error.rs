//! Error types for the todo API client.
//!
//! # Design
//! The server answers each failure class with a distinct status and an
//! `{"error": ...}` body. Statuses the server is known to produce get their
//! own variant carrying that message; anything else lands in `HttpError`
//! with the raw status and body.

use thiserror::Error;

/// Errors returned by `TodoClient` parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400: validation failure or missing login fields.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// 401: no token sent, or wrong username/password on login.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 403: a token was sent but is not the accepted one.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// 404: the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// Any other unexpected status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),
}
