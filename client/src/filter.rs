//! Client-side views over a fetched todo list.
//!
//! The server has no filtering; callers narrow the list after `list_todos`.
//! Filters never reorder: output follows the server's insertion order.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::types::Todo;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TodoFilter {
    #[default]
    All,
    /// Not yet completed.
    Active,
    Completed,
}

impl TodoFilter {
    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            TodoFilter::All => true,
            TodoFilter::Active => !todo.completed,
            TodoFilter::Completed => todo.completed,
        }
    }

    pub fn apply<'a>(&self, todos: &'a [Todo]) -> Vec<&'a Todo> {
        todos.iter().filter(|todo| self.matches(todo)).collect()
    }
}

impl fmt::Display for TodoFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TodoFilter::All => "all",
            TodoFilter::Active => "active",
            TodoFilter::Completed => "completed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown filter `{0}`")]
pub struct UnknownFilter(pub String);

impl FromStr for TodoFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TodoFilter::All),
            "active" | "pending" => Ok(TodoFilter::Active),
            "completed" | "done" => Ok(TodoFilter::Completed),
            _ => Err(UnknownFilter(s.to_string())),
        }
    }
}

/// Totals shown alongside a list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoCounts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

impl TodoCounts {
    pub fn of(todos: &[Todo]) -> Self {
        let completed = todos.iter().filter(|todo| todo.completed).count();
        Self {
            total: todos.len(),
            active: todos.len() - completed,
            completed,
        }
    }
}
