//! Request-level failures and their HTTP mapping.
//!
//! # Design
//! Every failure is resolved where it is detected and surfaces here as one
//! variant. Status codes and the `{"error": ...}` body are decided only in
//! `IntoResponse`, so the store and the access gate stay transport-free.
//! `Internal` carries a detail string for the log; clients only ever see the
//! generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::model::ValidationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Access token required")]
    AuthenticationMissing,

    #[error("Invalid token")]
    AuthenticationInvalid,

    #[error("Username and password are required")]
    MissingCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Todo not found")]
    NotFound,

    #[error("Endpoint not found")]
    EndpointNotFound,

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::AuthenticationMissing | ApiError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::AuthenticationInvalid => StatusCode::FORBIDDEN,
            ApiError::MissingCredentials | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::EndpointNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(%detail, "request failed");
        }
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

/// Generic 500 body, also used for panics caught at the outermost layer.
pub fn internal_error_response() -> Response {
    ApiError::Internal("handler panicked".to_string()).into_response()
}
