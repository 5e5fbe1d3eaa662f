use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    pub done_at: Option<DateTime<Utc>>,
    #[serde(rename = "statusId")]
    pub status_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoStatus {
    pub id: i64,
    pub display_name: String,
    pub priority: i64,
}

#[derive(Debug, Clone, Default)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub status_id: Option<i64>,
}

/// Partial update of a todo. The outer `Option` of the nullable fields means
/// "leave untouched", the inner one is the new (possibly null) value.
#[derive(Debug, Clone, Default)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status_id: Option<Option<i64>>,
}

#[derive(Debug, Clone)]
pub struct NewTodoStatus {
    pub display_name: String,
    pub priority: i64,
}

#[derive(Debug, Clone, Default)]
pub struct TodoStatusChanges {
    pub display_name: Option<String>,
    pub priority: Option<i64>,
}
