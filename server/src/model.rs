//! Wire and domain types for the todo service.
//!
//! # Design
//! Request bodies arrive loosely typed: a client may send `"title": 42` or
//! omit `completed` entirely. `TodoPayload` captures the body as-is and
//! `TodoPayload::validate` turns it into a `TodoDraft` or a specific
//! `ValidationError`, so handlers never see an unchecked title.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Longest accepted title, counted after trimming.
pub const MAX_TITLE_CHARS: usize = 255;

/// Role reported for the single built-in account.
pub const ADMIN_ROLE: &str = "admin";

/// A single todo record as stored and as returned by the API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub completed: bool,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

/// Raw create/update body. Both fields are optional on the wire; a JSON
/// `null` deserializes to `None` and is treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct TodoPayload {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub completed: Option<Value>,
}

/// A payload that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoDraft {
    /// Trimmed, non-empty, at most `MAX_TITLE_CHARS` long.
    pub title: String,
    /// `None` when the caller did not send the field.
    pub completed: Option<bool>,
}

/// Why a request body was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is required and must be a non-empty string")]
    MissingTitle,
    #[error("Title must be a string")]
    TitleNotString,
    #[error("Title is required and must be a non-empty string")]
    EmptyTitle,
    #[error("Title must be less than 255 characters")]
    TitleTooLong,
    #[error("Completed must be a boolean")]
    CompletedNotBoolean,
    #[error("Request body must be a valid JSON object")]
    MalformedBody,
}

impl TodoPayload {
    /// Parse a request body. An empty body is read as `{}`.
    pub fn from_slice(body: &[u8]) -> Result<Self, ValidationError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        match serde_json::from_slice(body) {
            Ok(value @ Value::Object(_)) => {
                serde_json::from_value(value).map_err(|_| ValidationError::MalformedBody)
            }
            _ => Err(ValidationError::MalformedBody),
        }
    }

    pub fn validate(self) -> Result<TodoDraft, ValidationError> {
        let title = match self.title {
            None => return Err(ValidationError::MissingTitle),
            Some(Value::String(raw)) => validate_title(&raw)?,
            Some(_) => return Err(ValidationError::TitleNotString),
        };
        let completed = match self.completed {
            None => None,
            Some(Value::Bool(flag)) => Some(flag),
            Some(_) => return Err(ValidationError::CompletedNotBoolean),
        };
        Ok(TodoDraft { title, completed })
    }
}

/// Trim `raw` and check it against the title rules.
pub fn validate_title(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    // counted in UTF-16 code units, as JavaScript `length` does
    if trimmed.encode_utf16().count() > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(trimmed.to_string())
}

/// Raw login body. Fields are kept loosely typed: a value that is present
/// but not a string counts as supplied and simply fails to match.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<Value>,
    #[serde(default)]
    pub password: Option<Value>,
}

impl LoginRequest {
    /// Parse a login body. Anything that is not a JSON object has no fields.
    pub fn from_slice(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

/// JavaScript truthiness for a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub role: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub todo_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedTodo {
    pub message: &'static str,
    pub deleted_todo: Todo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedTodos {
    pub message: &'static str,
    pub deleted_count: usize,
}

/// ISO-8601 with millisecond precision and a `Z` suffix,
/// e.g. `2024-05-01T12:00:00.000Z`.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
