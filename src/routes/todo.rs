use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::AppState;
use crate::error::ApiError;
use crate::models::{NewTodo, Todo, TodoChanges};
use crate::pagination::{Pagination, DEFAULT_ITEMS_PER_PAGE, MAX_ITEMS_PER_PAGE};
use crate::services::todo::{TodoPage, TodoService};
use crate::validation::{path_id, BodyFields, JsonBody, QueryFields};

struct ListQuery {
    include_done: bool,
    pagination: Pagination,
}

impl ListQuery {
    fn parse(params: &HashMap<String, String>) -> Result<Self, ApiError> {
        let mut fields = QueryFields::new(params);
        let include_done = fields.flag("include_done");
        let page = fields.integer("page", 1, 1..=i64::MAX);
        let items_per_page =
            fields.integer("items_per_page", DEFAULT_ITEMS_PER_PAGE, 1..=MAX_ITEMS_PER_PAGE);
        fields.finish()?;
        Ok(Self {
            include_done,
            pagination: Pagination {
                page,
                items_per_page,
            },
        })
    }
}

fn parse_new_todo(body: &JsonBody) -> Result<NewTodo, ApiError> {
    let mut fields = BodyFields::new(body);
    let todo = NewTodo {
        title: fields.required_string("title", 1),
        description: fields.optional_string("description", 0),
        status_id: fields.nullable_integer("statusId").flatten(),
    };
    fields.finish()?;
    Ok(todo)
}

fn parse_changes(body: &JsonBody) -> Result<TodoChanges, ApiError> {
    let mut fields = BodyFields::new(body);
    let changes = TodoChanges {
        title: fields.optional_string("title", 1),
        description: fields.nullable_string("description"),
        status_id: fields.nullable_integer("statusId"),
    };
    fields.finish()?;
    Ok(changes)
}

fn parse_done(body: &JsonBody) -> Result<bool, ApiError> {
    let mut fields = BodyFields::new(body);
    let is_done = fields.required_bool("is_done");
    fields.finish()?;
    Ok(is_done)
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<TodoPage>, ApiError> {
    let query = ListQuery::parse(&params)?;
    let page = TodoService::new(&state.db)
        .list(query.include_done, query.pagination)
        .await?;
    Ok(Json(page))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(todo_id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = path_id("todoId", &todo_id)?;
    Ok(Json(TodoService::new(&state.db).detail(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    body: JsonBody,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let todo = parse_new_todo(&body)?;
    let todo = TodoService::new(&state.db).create(todo).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(todo_id): Path<String>,
    body: JsonBody,
) -> Result<Json<Todo>, ApiError> {
    let id = path_id("todoId", &todo_id)?;
    let service = TodoService::new(&state.db);
    service.ensure_exists(id).await?;

    let changes = parse_changes(&body)?;
    Ok(Json(service.update(id, changes).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(todo_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = path_id("todoId", &todo_id)?;
    TodoService::new(&state.db).delete(id).await?;
    Ok(StatusCode::OK)
}

pub async fn set_done(
    State(state): State<AppState>,
    Path(todo_id): Path<String>,
    body: JsonBody,
) -> Result<Json<Todo>, ApiError> {
    let id = path_id("todoId", &todo_id)?;
    let service = TodoService::new(&state.db);
    service.ensure_exists(id).await?;

    let is_done = parse_done(&body)?;
    Ok(Json(service.set_done(id, is_done).await?))
}
