//! Core of the todo service: data model, storage capability and use cases.
//!
//! # Overview
//! `TodoService` sits between a `Storage` adapter and whatever transport
//! exposes it. It converts storage rows to `Task`s, refuses to create a task
//! whose name collides with an active one, and filters tasks by fuzzy
//! subsequence match.
//!
//! # Design
//! - `Storage` is an async trait object so the production adapter and the
//!   in-memory `MemoryStorage` are interchangeable.
//! - The service is `Clone` and stateless; share it across request handlers.
//! - No HTTP or SQL types appear in this crate.

pub mod error;
pub mod fuzzy;
pub mod service;
pub mod storage;
pub mod types;

pub use error::{StorageError, TodoError, TodoResult};
pub use service::TodoService;
pub use storage::{MemoryStorage, Storage};
pub use types::{CreateTask, NewRow, StoredRow, Task};
