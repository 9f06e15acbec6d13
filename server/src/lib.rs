//! HTTP transport and storage wiring for the todo service.
//!
//! # Routes
//! - `GET /todo`: every task
//! - `GET /todo/search?q=`: fuzzy-filtered tasks; missing or empty `q` returns all
//! - `POST /todo` `{item}`: create, `201`; `400` on an active duplicate
//! - `PUT /todo/{id}` `{id, item, done}`: update, `200`; `400` on id mismatch
//! - `DELETE /todo/{id}`: `204` whether or not the task existed

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;
use tokio::net::TcpListener;
use todo_core::{MemoryStorage, TodoService};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod postgres;
pub mod routes;

pub use config::{Config, ConfigError, StorageMode};
pub use error::{ApiError, ApiErrorResponse};
pub use postgres::PgStorage;

/// Router over the given service.
pub fn router(service: TodoService) -> Router {
    Router::new()
        .route("/todo", get(routes::list_todos).post(routes::create_todo))
        .route("/todo/search", get(routes::search_todos))
        .route(
            "/todo/{id}",
            put(routes::update_todo).delete(routes::delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Router backed by a fresh `MemoryStorage`.
pub fn app() -> Router {
    router(TodoService::new(Arc::new(MemoryStorage::new())))
}

pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

/// Like [`run`], returning once `shutdown` resolves and in-flight requests finish.
pub async fn run_until<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
