//! Synchronous API client for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, keeping the client deterministic and testable.
//!
//! # Design
//! - `TodoClient` holds `base_url` and an optional bearer token; `login`
//!   yields the token and `with_token` produces an authenticated client.
//! - Each operation is split into `build_*` and `parse_*`.
//! - `filter` narrows a fetched list the way list views do; the server
//!   itself never filters.

pub mod client;
pub mod error;
pub mod filter;
pub mod http;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use filter::{TodoCounts, TodoFilter};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{
    ClearResponse, CreateTodo, DeleteResponse, Health, LoginRequest, LoginResponse, Todo,
    UpdateTodo, User,
};
