//! In-memory todo API server.
//!
//! # Overview
//! One process-wide `TodoStore` behind a token-gated axum router. `/login`
//! hands out the configured static token, `/health` reports liveness, and
//! `/items` serves CRUD plus toggle and bulk clear over JSON.
//!
//! # Design
//! - `store` holds the collection and id counter and has no HTTP knowledge.
//! - `auth` decides allow/401/403 before a handler runs.
//! - `error::ApiError` is the only place failures become status codes.
//! - Nothing is persisted; restarting the process empties the store.

pub mod auth;
pub mod config;
pub mod error;
pub mod model;
pub mod routes;
pub mod store;

use tokio::net::TcpListener;

pub use auth::Credentials;
pub use config::ServerConfig;
pub use error::ApiError;
pub use model::{Todo, TodoDraft, TodoPayload, ValidationError};
pub use routes::{app, app_with, AppState};
pub use store::{Db, TodoStore};

/// Serve on `listener` until Ctrl-C.
pub async fn run(listener: TcpListener, credentials: Credentials) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(AppState::new(credentials)))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
