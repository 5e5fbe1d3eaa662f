use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use super::AppState;
use crate::error::ApiError;
use crate::models::{NewTodoStatus, TodoStatus, TodoStatusChanges};
use crate::services::todo_status::TodoStatusService;
use crate::validation::{path_id, BodyFields, JsonBody};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoStatusList {
    pub todo_status: Vec<TodoStatus>,
}

fn parse_new_status(body: &JsonBody) -> Result<NewTodoStatus, ApiError> {
    let mut fields = BodyFields::new(body);
    let status = NewTodoStatus {
        display_name: fields.required_string("displayName", 1),
        priority: fields.required_integer("priority"),
    };
    fields.finish()?;
    Ok(status)
}

fn parse_changes(body: &JsonBody) -> Result<TodoStatusChanges, ApiError> {
    let mut fields = BodyFields::new(body);
    let changes = TodoStatusChanges {
        display_name: fields.optional_string("displayName", 1),
        priority: fields.optional_integer("priority"),
    };
    fields.finish()?;
    Ok(changes)
}

pub async fn list(State(state): State<AppState>) -> Result<Json<TodoStatusList>, ApiError> {
    let todo_status = TodoStatusService::new(&state.db).list().await?;
    Ok(Json(TodoStatusList { todo_status }))
}

pub async fn create(
    State(state): State<AppState>,
    body: JsonBody,
) -> Result<(StatusCode, Json<TodoStatus>), ApiError> {
    let status = parse_new_status(&body)?;
    let status = TodoStatusService::new(&state.db).create(status).await?;
    Ok((StatusCode::CREATED, Json(status)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(status_id): Path<String>,
    body: JsonBody,
) -> Result<Json<TodoStatus>, ApiError> {
    let id = path_id("todoStatusId", &status_id)?;
    let service = TodoStatusService::new(&state.db);
    service.ensure_exists(id).await?;

    let changes = parse_changes(&body)?;
    Ok(Json(service.update(id, changes).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(status_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = path_id("todoStatusId", &status_id)?;
    TodoStatusService::new(&state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
