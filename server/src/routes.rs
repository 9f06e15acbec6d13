//! Axum handlers for the `/todo` resource.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use todo_core::{CreateTask, Task, TodoService};

use crate::error::ApiErrorResponse;

type ApiResult<T> = Result<T, ApiErrorResponse>;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

pub async fn list_todos(State(service): State<TodoService>) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(service.get_todos().await?))
}

pub async fn search_todos(
    State(service): State<TodoService>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Task>>> {
    let query = params.q.unwrap_or_default();
    Ok(Json(service.filter_todos(&query).await?))
}

pub async fn create_todo(
    State(service): State<TodoService>,
    body: Result<Json<CreateTask>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(input) = body?;
    if input.item.trim().is_empty() {
        return Err(ApiErrorResponse::malformed("item must not be empty"));
    }
    let task = service.add_todo(input.item).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_todo(
    State(service): State<TodoService>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<Task>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;
    let Json(replacement) = body?;
    if replacement.id != id {
        return Err(ApiErrorResponse::malformed(format!(
            "path id {id} does not match body id {}",
            replacement.id
        )));
    }
    if replacement.name.trim().is_empty() {
        return Err(ApiErrorResponse::malformed("item must not be empty"));
    }
    Ok(Json(service.update_todo(id, replacement).await?))
}

pub async fn delete_todo(
    State(service): State<TodoService>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    service.delete_todo(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
