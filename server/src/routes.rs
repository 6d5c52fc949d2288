//! HTTP surface: router construction and request handlers.
//!
//! # Design
//! `/login` and `/health` are open; everything under `/items` sits behind
//! `auth::require_token` as a route layer, so the store is never touched for
//! a rejected request. Bodies are taken as raw bytes and validated by
//! `TodoPayload`. A body without a JSON content type is read as `{}`, so it
//! falls through to the ordinary "title required" failure instead of an
//! extractor rejection. Trailing slashes are trimmed before routing, so
//! `/items/` and `/items/1/` reach the same handlers as their bare forms.

use std::{any::Any, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    middleware,
    response::Response,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, normalize_path::NormalizePath,
    trace::TraceLayer,
};

use crate::auth::{require_token, Credentials};
use crate::error::{internal_error_response, ApiError};
use crate::model::{
    ClearedTodos, DeletedTodo, HealthResponse, LoginRequest, LoginResponse, Todo, TodoPayload,
};
use crate::store::{parse_id, Db, TodoStore};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub credentials: Arc<Credentials>,
}

impl AppState {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            db: TodoStore::shared(),
            credentials: Arc::new(credentials),
        }
    }
}

/// Router with a fresh store and the built-in account.
pub fn app() -> Router {
    app_with(AppState::new(Credentials::default()))
}

pub fn app_with(state: AppState) -> Router {
    let items = Router::new()
        .route("/items", get(list_todos).post(create_todo).delete(clear_todos))
        .route("/items/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/items/{id}/toggle", patch(toggle_todo))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    let routes = Router::new()
        .route("/login", post(login))
        .route("/health", get(health))
        .merge(items)
        .fallback(endpoint_not_found)
        .method_not_allowed_fallback(endpoint_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Path rewriting has to happen before route matching, so it wraps the
    // finished router rather than being layered onto it.
    Router::new().fallback_service(NormalizePath::trim_trailing_slash(routes))
}

/// The body if it was sent as JSON, otherwise nothing.
fn json_body<'a>(headers: &HeaderMap, body: &'a Bytes) -> &'a [u8] {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false);
    if is_json {
        &body[..]
    } else {
        &[]
    }
}

fn handle_panic(_payload: Box<dyn Any + Send + 'static>) -> Response {
    internal_error_response()
}

async fn endpoint_not_found() -> ApiError {
    ApiError::EndpointNotFound
}

fn record_id(raw: &str) -> Result<u64, ApiError> {
    parse_id(raw).ok_or(ApiError::NotFound)
}

async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<LoginResponse>, ApiError> {
    let request = LoginRequest::from_slice(json_body(&headers, &body));
    let response = state.credentials.login(request)?;
    tracing::info!(username = %response.user.username, "login succeeded");
    Ok(Json(response))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let todo_count = state.db.read().await.len();
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now(),
        todo_count,
    })
}

async fn list_todos(State(state): State<AppState>) -> Json<Vec<Todo>> {
    let todos = state.db.read().await;
    Json(todos.list().to_vec())
}

async fn create_todo(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let draft = TodoPayload::from_slice(json_body(&headers, &body))?.validate()?;
    let todo = state.db.write().await.create(draft)?;
    tracing::debug!(id = todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn clear_todos(State(state): State<AppState>) -> Json<ClearedTodos> {
    let deleted_count = state.db.write().await.clear();
    tracing::debug!(deleted_count, "todos cleared");
    Json(ClearedTodos {
        message: "All todos deleted successfully",
        deleted_count,
    })
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = record_id(&id)?;
    let todo = state.db.read().await.get(id)?.clone();
    Ok(Json(todo))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Todo>, ApiError> {
    let id = record_id(&id)?;
    let payload = TodoPayload::from_slice(json_body(&headers, &body));

    let mut todos = state.db.write().await;
    // existence is reported before validation
    todos.get(id)?;
    let draft = payload?.validate()?;
    let todo = todos.update(id, draft)?;
    tracing::debug!(id, "todo updated");
    Ok(Json(todo))
}

async fn toggle_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = record_id(&id)?;
    let todo = state.db.write().await.toggle(id)?;
    tracing::debug!(id, completed = todo.completed, "todo toggled");
    Ok(Json(todo))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedTodo>, ApiError> {
    let id = record_id(&id)?;
    let deleted_todo = state.db.write().await.remove(id)?;
    tracing::debug!(id, "todo deleted");
    Ok(Json(DeletedTodo {
        message: "Todo deleted successfully",
        deleted_todo,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    async fn boom() -> &'static str {
        panic!("boom")
    }

    #[tokio::test]
    async fn panics_become_internal_errors() {
        let router = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(handle_panic));
        let resp = router
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn json_body_requires_json_content_type() {
        let body = Bytes::from_static(br#"{"title":"x"}"#);
        let mut headers = HeaderMap::new();
        assert!(json_body(&headers, &body).is_empty());

        headers.insert(CONTENT_TYPE, "text/plain".parse().unwrap());
        assert!(json_body(&headers, &body).is_empty());

        headers.insert(CONTENT_TYPE, "application/json; charset=utf-8".parse().unwrap());
        assert_eq!(json_body(&headers, &body), &body[..]);

        headers.insert(CONTENT_TYPE, "application/merge-patch+json".parse().unwrap());
        assert_eq!(json_body(&headers, &body), &body[..]);
    }

    #[test]
    fn record_id_maps_garbage_to_not_found() {
        assert_eq!(record_id("12").unwrap(), 12);
        assert!(matches!(record_id("abc"), Err(ApiError::NotFound)));
    }
}
