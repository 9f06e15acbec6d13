//! The storage capability consumed by `TodoService`, and an in-memory
//! implementation.
//!
//! # Design
//! `Storage` is the whole contract the service needs: fetch everything,
//! insert, delete by id, update by id. Adapters own row identity and
//! timestamps. Cancellation follows the usual async rule: dropping the
//! returned future abandons the call.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::types::{NewRow, StoredRow};

/// Row-level CRUD over the backing store.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Every row, ordered by ascending id.
    async fn fetch_all(&self) -> Result<Vec<StoredRow>, StorageError>;

    /// Persist a new row and return it with `id` and `created_at` assigned.
    async fn insert(&self, row: NewRow) -> Result<StoredRow, StorageError>;

    /// Remove the row with the given id. Removing a missing id is not an error.
    async fn delete(&self, id: i64) -> Result<(), StorageError>;

    /// Overwrite `task` and `status` of the row with the given id.
    ///
    /// Returns `None` when no row carries that id.
    async fn update(&self, id: i64, row: NewRow) -> Result<Option<StoredRow>, StorageError>;
}

/// Process-local storage backed by a `Vec`. Never fails.
#[derive(Debug)]
pub struct MemoryStorage {
    state: RwLock<MemoryState>,
}

/// Ids are assigned under the same lock that appends the row, so `rows`
/// stays sorted by id.
#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<StoredRow>,
    last_id: i64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn fetch_all(&self) -> Result<Vec<StoredRow>, StorageError> {
        Ok(self.state.read().await.rows.clone())
    }

    async fn insert(&self, row: NewRow) -> Result<StoredRow, StorageError> {
        let mut state = self.state.write().await;
        state.last_id += 1;
        let stored = StoredRow {
            id: state.last_id,
            task: row.task,
            status: row.status,
            created_at: Utc::now(),
        };
        state.rows.push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: i64) -> Result<(), StorageError> {
        self.state.write().await.rows.retain(|row| row.id != id);
        Ok(())
    }

    async fn update(&self, id: i64, row: NewRow) -> Result<Option<StoredRow>, StorageError> {
        let mut state = self.state.write().await;
        Ok(state.rows.iter_mut().find(|existing| existing.id == id).map(|existing| {
            existing.task = row.task;
            existing.status = row.status;
            existing.clone()
        }))
    }
}
