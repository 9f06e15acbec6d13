//! Domain types for the todo service.
//!
//! # Design
//! `Task` is what callers see; `StoredRow` is what a `Storage` adapter hands
//! back. The service converts between the two and never exposes
//! `created_at`. `NewRow` carries the fields the service writes, leaving
//! identity and timestamps to storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single todo as exposed by the service and the HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    #[serde(rename = "item")]
    pub name: String,
    #[serde(default)]
    pub done: bool,
}

impl Task {
    /// Returns the row fields this task would be persisted with.
    pub fn to_new_row(&self) -> NewRow {
        NewRow {
            task: self.name.clone(),
            status: self.done,
        }
    }
}

impl From<StoredRow> for Task {
    fn from(row: StoredRow) -> Self {
        Self {
            id: row.id,
            name: row.task,
            done: row.status,
        }
    }
}

/// Row fields written by the service. Storage assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRow {
    pub task: String,
    pub status: bool,
}

impl NewRow {
    /// A not-yet-done row for the given task text.
    pub fn active(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            status: false,
        }
    }
}

/// A persisted row as returned by a `Storage` adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    pub id: i64,
    pub task: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub item: String,
}
