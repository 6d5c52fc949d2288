//! Access gate and login for the `/items` routes.
//!
//! # Design
//! The accepted token is a static shared secret from configuration, not a
//! signed credential. `authorize` is a pure function over the raw
//! `Authorization` header so it can be tested without a router;
//! `require_token` adapts it into an axum middleware that either forwards the
//! request untouched or answers 401/403 itself.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::model::{is_truthy, LoginRequest, LoginResponse, User, ADMIN_ROLE};
use crate::routes::AppState;

pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin";
pub const DEFAULT_TOKEN: &str = "fake-jwt-token";

/// The single account and the token handed out for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub token: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            token: DEFAULT_TOKEN.to_string(),
        }
    }
}

impl Credentials {
    /// Exchange a username/password pair for the static token.
    pub fn login(&self, request: LoginRequest) -> Result<LoginResponse, ApiError> {
        let (username, password) = match (request.username, request.password) {
            (Some(u), Some(p)) if is_truthy(&u) && is_truthy(&p) => (u, p),
            _ => return Err(ApiError::MissingCredentials),
        };
        match (username, password) {
            (Value::String(u), Value::String(p)) if u == self.username && p == self.password => {
                Ok(LoginResponse {
                    token: self.token.clone(),
                    user: User {
                        username: u,
                        role: ADMIN_ROLE.to_string(),
                    },
                })
            }
            _ => Err(ApiError::InvalidCredentials),
        }
    }
}

/// Second space-separated segment of the header, if non-empty.
/// The scheme word itself is not checked.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header?.split(' ').nth(1).filter(|token| !token.is_empty())
}

pub fn authorize(header: Option<&str>, accepted: &str) -> Result<(), ApiError> {
    match bearer_token(header) {
        None => Err(ApiError::AuthenticationMissing),
        Some(token) if token == accepted => Ok(()),
        Some(_) => Err(ApiError::AuthenticationInvalid),
    }
}

pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if let Err(err) = authorize(header, &state.credentials.token) {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            reason = %err,
            "rejected request"
        );
        return Err(err);
    }
    Ok(next.run(request).await)
}
