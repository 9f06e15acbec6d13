//! PostgreSQL `Storage` adapter.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE todo_items (
//!     id BIGSERIAL PRIMARY KEY,
//!     task TEXT NOT NULL,
//!     status BOOLEAN NOT NULL DEFAULT FALSE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Every operation is a single statement; there are no transactions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use todo_core::{NewRow, Storage, StorageError, StoredRow};

use crate::config::DatabaseConfig;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS todo_items (\
     id BIGSERIAL PRIMARY KEY, \
     task TEXT NOT NULL, \
     status BOOLEAN NOT NULL DEFAULT FALSE, \
     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW())";

type RowTuple = (i64, String, bool, DateTime<Utc>);

fn into_stored((id, task, status, created_at): RowTuple) -> StoredRow {
    StoredRow {
        id,
        task,
        status,
        created_at,
    }
}

/// Splits sqlx failures into "could not reach the database" and "the
/// statement failed".
pub(crate) fn storage_error(error: sqlx::Error) -> StorageError {
    match error {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::WorkerCrashed => StorageError::Unavailable(error.to_string()),
        other => StorageError::OperationFailed(other.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `config.url`. Fails if no connection can be made.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(storage_error)?;
        Ok(Self::new(pool))
    }

    /// Creates `todo_items` if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn fetch_all(&self) -> Result<Vec<StoredRow>, StorageError> {
        let rows: Vec<RowTuple> =
            sqlx::query_as("SELECT id, task, status, created_at FROM todo_items ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(storage_error)?;
        Ok(rows.into_iter().map(into_stored).collect())
    }

    async fn insert(&self, row: NewRow) -> Result<StoredRow, StorageError> {
        let inserted: RowTuple = sqlx::query_as(
            "INSERT INTO todo_items (task, status) VALUES ($1, $2) \
             RETURNING id, task, status, created_at",
        )
        .bind(&row.task)
        .bind(row.status)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(into_stored(inserted))
    }

    async fn delete(&self, id: i64) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM todo_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn update(&self, id: i64, row: NewRow) -> Result<Option<StoredRow>, StorageError> {
        let updated: Option<RowTuple> = sqlx::query_as(
            "UPDATE todo_items SET task = $2, status = $3 WHERE id = $1 \
             RETURNING id, task, status, created_at",
        )
        .bind(id)
        .bind(&row.task)
        .bind(row.status)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(updated.map(into_stored))
    }
}
