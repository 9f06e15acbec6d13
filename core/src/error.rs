//! Error types for the todo service.
//!
//! # Design
//! `DuplicateTask` is the only failure the service produces on its own and is
//! user-correctable. Everything else comes from the storage adapter and is
//! passed through untouched inside `TodoError::Storage`.

use thiserror::Error;

/// Failures reported by a `Storage` adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The backing store could not be reached (pool exhausted, connection lost).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The store was reachable but rejected or failed the statement.
    #[error("storage operation failed: {0}")]
    OperationFailed(String),
}

/// Errors returned by `TodoService` operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TodoError {
    /// An active task with the same name already exists.
    #[error("todo already exists: {0}")]
    DuplicateTask(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type TodoResult<T> = Result<T, TodoError>;
