//! In-memory todo collection.
//!
//! # Design
//! `TodoStore` is plain synchronous state: a `Vec` kept in insertion order
//! and the next id to hand out. It knows nothing about HTTP or locking; the
//! router wraps one instance in `Db` and takes the write lock for the whole
//! of each mutating request, which keeps id allocation atomic with insertion
//! and hides intermediate states from concurrent readers.
//!
//! Timestamps are kept at millisecond precision to match the wire format.
//! Every mutation moves `updated_at` strictly forward, even when two land in
//! the same millisecond.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use tokio::sync::RwLock;

use crate::error::ApiError;
use crate::model::{Todo, TodoDraft};

const FIRST_ID: u64 = 1;

/// Handle shared by every request handler.
pub type Db = Arc<RwLock<TodoStore>>;

#[derive(Debug)]
pub struct TodoStore {
    todos: Vec<Todo>,
    next_id: u64,
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoStore {
    pub fn new() -> Self {
        Self {
            todos: Vec::new(),
            next_id: FIRST_ID,
        }
    }

    pub fn shared() -> Db {
        Arc::new(RwLock::new(Self::new()))
    }

    /// All records in insertion order.
    pub fn list(&self) -> &[Todo] {
        &self.todos
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn create(&mut self, draft: TodoDraft) -> Result<Todo, ApiError> {
        let id = self.next_id;
        let next_id = id
            .checked_add(1)
            .ok_or_else(|| ApiError::Internal("todo id counter exhausted".to_string()))?;

        let now = now();
        let todo = Todo {
            id,
            title: draft.title,
            completed: draft.completed.unwrap_or(false),
            created_at: now,
            updated_at: now,
        };
        self.next_id = next_id;
        self.todos.push(todo.clone());
        Ok(todo)
    }

    pub fn get(&self, id: u64) -> Result<&Todo, ApiError> {
        self.todos.iter().find(|t| t.id == id).ok_or(ApiError::NotFound)
    }

    /// Replace the title, and `completed` only when the draft carries it.
    pub fn update(&mut self, id: u64, draft: TodoDraft) -> Result<Todo, ApiError> {
        let todo = self.get_mut(id)?;
        todo.title = draft.title;
        if let Some(completed) = draft.completed {
            todo.completed = completed;
        }
        touch(todo);
        Ok(todo.clone())
    }

    pub fn toggle(&mut self, id: u64) -> Result<Todo, ApiError> {
        let todo = self.get_mut(id)?;
        todo.completed = !todo.completed;
        touch(todo);
        Ok(todo.clone())
    }

    pub fn remove(&mut self, id: u64) -> Result<Todo, ApiError> {
        let index = self.position(id)?;
        Ok(self.todos.remove(index))
    }

    /// Drop every record and restart ids at 1. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.todos.len();
        self.todos.clear();
        self.next_id = FIRST_ID;
        count
    }

    fn position(&self, id: u64) -> Result<usize, ApiError> {
        self.todos
            .iter()
            .position(|t| t.id == id)
            .ok_or(ApiError::NotFound)
    }

    fn get_mut(&mut self, id: u64) -> Result<&mut Todo, ApiError> {
        self.todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ApiError::NotFound)
    }
}

/// Read an id from a path segment the lenient way: optional leading
/// whitespace and sign, then the leading run of digits. Anything else, and
/// anything that cannot name a record (zero, negative, overflow), is `None`.
pub fn parse_id(raw: &str) -> Option<u64> {
    let rest = raw.trim_start();
    let (negative, rest) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let id: u64 = rest[..digits_end].parse().ok()?;
    if negative || id < FIRST_ID {
        return None;
    }
    Some(id)
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn touch(todo: &mut Todo) {
    let now = now();
    todo.updated_at = if now > todo.updated_at {
        now
    } else {
        todo.updated_at + TimeDelta::milliseconds(1)
    };
}
