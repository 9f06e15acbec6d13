//! Todo use-case service.
//!
//! # Responsibility
//! - Project storage rows to `Task`s.
//! - Reject creation of a task whose name matches an active task.
//! - Fuzzy search over task names.
//!
//! # Invariants
//! - Holds no state besides the storage handle; every read goes to storage.
//! - Storage failures are returned unchanged; nothing is retried.
//!
//! The duplicate check in [`TodoService::add_todo`] reads and then writes in
//! two separate storage calls. Two concurrent adds with the same name can both
//! pass the check and both insert.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::error::{TodoError, TodoResult};
use crate::fuzzy;
use crate::storage::Storage;
use crate::types::{NewRow, Task};

/// Mediates between the HTTP surface and a `Storage` adapter.
#[derive(Clone)]
pub struct TodoService {
    storage: Arc<dyn Storage>,
}

impl TodoService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// All tasks in storage order. Empty when storage holds no rows.
    #[instrument(skip(self))]
    pub async fn get_todos(&self) -> TodoResult<Vec<Task>> {
        let rows = self.storage.fetch_all().await?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    /// Creates an active task named `name`.
    ///
    /// # Errors
    /// `TodoError::DuplicateTask` if an active task with exactly this name
    /// (case-sensitive) exists. Done tasks with the same name do not count.
    #[instrument(skip(self, name))]
    pub async fn add_todo(&self, name: impl Into<String>) -> TodoResult<Task> {
        let name = name.into();
        let existing = self.get_todos().await?;
        if existing.iter().any(|task| task.name == name && !task.done) {
            warn!(%name, "rejecting duplicate active task");
            return Err(TodoError::DuplicateTask(name));
        }

        let row = self.storage.insert(NewRow::active(name)).await?;
        debug!(id = row.id, "task created");
        Ok(Task::from(row))
    }

    /// Tasks whose name fuzzily matches `query`, case-insensitively, in
    /// storage order. The empty query returns every task.
    #[instrument(skip(self))]
    pub async fn filter_todos(&self, query: &str) -> TodoResult<Vec<Task>> {
        let tasks = self.get_todos().await?;
        if query.is_empty() {
            return Ok(tasks);
        }

        Ok(tasks
            .into_iter()
            .filter(|task| fuzzy::matches(query, &task.name))
            .collect())
    }

    /// Deletes the task with `id`. A missing id is not reported.
    #[instrument(skip(self))]
    pub async fn delete_todo(&self, id: i64) -> TodoResult<()> {
        self.storage.delete(id).await?;
        Ok(())
    }

    /// Overwrites name and done flag of the task with `id`.
    ///
    /// No duplicate check is made. The returned task is `id` paired with the
    /// fields of `replacement` as supplied; storage is not re-read, and the id
    /// carried by `replacement` is ignored.
    #[instrument(skip(self, replacement))]
    pub async fn update_todo(&self, id: i64, replacement: Task) -> TodoResult<Task> {
        let stored = self.storage.update(id, replacement.to_new_row()).await?;
        if stored.is_none() {
            debug!(id, "update matched no row");
        }
        Ok(Task {
            id,
            name: replacement.name,
            done: replacement.done,
        })
    }
}

impl std::fmt::Debug for TodoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoService").finish_non_exhaustive()
    }
}
