//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds a `base_url` and, once logged in, the bearer token.
//! Nothing changes between calls: `with_token` returns a new client rather
//! than mutating this one. Each operation is a `build_*` method producing an
//! `HttpRequest` and a `parse_*` method consuming an `HttpResponse`; the
//! caller performs the round-trip in between.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    ClearResponse, CreateTodo, DeleteResponse, ErrorBody, Health, LoginRequest, LoginResponse,
    Todo, UpdateTodo,
};

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
    token: Option<String>,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// A copy of this client that authenticates `/items` requests.
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            base_url: self.base_url.clone(),
            token: Some(token.to_string()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    // --- open endpoints ---

    pub fn build_login(&self, input: &LoginRequest) -> Result<HttpRequest, ApiError> {
        let mut req = self.request(HttpMethod::Post, "/login");
        attach_json(&mut req, input)?;
        Ok(req)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginResponse, ApiError> {
        parse_json(response, 200)
    }

    pub fn build_health(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/health")
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<Health, ApiError> {
        parse_json(response, 200)
    }

    // --- todo collection ---

    pub fn build_list_todos(&self) -> HttpRequest {
        self.authorized(HttpMethod::Get, "/items".to_string())
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        parse_json(response, 200)
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        let mut req = self.authorized(HttpMethod::Post, "/items".to_string());
        attach_json(&mut req, input)?;
        Ok(req)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response, 201)
    }

    pub fn build_clear_todos(&self) -> HttpRequest {
        self.authorized(HttpMethod::Delete, "/items".to_string())
    }

    pub fn parse_clear_todos(&self, response: HttpResponse) -> Result<ClearResponse, ApiError> {
        parse_json(response, 200)
    }

    // --- single todo ---

    pub fn build_get_todo(&self, id: u64) -> HttpRequest {
        self.authorized(HttpMethod::Get, format!("/items/{id}"))
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response, 200)
    }

    pub fn build_update_todo(&self, id: u64, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        let mut req = self.authorized(HttpMethod::Put, format!("/items/{id}"));
        attach_json(&mut req, input)?;
        Ok(req)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response, 200)
    }

    pub fn build_toggle_todo(&self, id: u64) -> HttpRequest {
        self.authorized(HttpMethod::Patch, format!("/items/{id}/toggle"))
    }

    pub fn parse_toggle_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response, 200)
    }

    pub fn build_delete_todo(&self, id: u64) -> HttpRequest {
        self.authorized(HttpMethod::Delete, format!("/items/{id}"))
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<DeleteResponse, ApiError> {
        parse_json(response, 200)
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn authorized(&self, method: HttpMethod, path: String) -> HttpRequest {
        let mut req = self.request(method, &path);
        if let Some(token) = &self.token {
            req.headers
                .push(("authorization".to_string(), format!("Bearer {token}")));
        }
        req
    }
}

fn attach_json<T: Serialize>(req: &mut HttpRequest, input: &T) -> Result<(), ApiError> {
    let body =
        serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    req.headers
        .push(("content-type".to_string(), "application/json".to_string()));
    req.body = Some(body);
    Ok(())
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse, expected: u16) -> Result<T, ApiError> {
    check_status(&response, expected)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    let message = || {
        serde_json::from_str::<ErrorBody>(&response.body)
            .map(|body| body.error)
            .unwrap_or_else(|_| response.body.clone())
    };
    Err(match response.status {
        400 => ApiError::BadRequest(message()),
        401 => ApiError::Unauthorized(message()),
        403 => ApiError::Forbidden(message()),
        404 => ApiError::NotFound,
        status => ApiError::HttpError {
            status,
            body: response.body.clone(),
        },
    })
}
