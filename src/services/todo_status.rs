use crate::db::{self, Database, StoreError};
use crate::error::ApiError;
use crate::models::{NewTodoStatus, TodoStatus, TodoStatusChanges};

pub struct TodoStatusService<'a> {
    db: &'a Database,
}

impl<'a> TodoStatusService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<TodoStatus>, ApiError> {
        Ok(self.db.call(|conn| db::todo_status::list(conn)).await?)
    }

    pub async fn ensure_exists(&self, id: i64) -> Result<(), ApiError> {
        let exists = self
            .db
            .call(move |conn| db::todo_status::exists(conn, id))
            .await?;
        if !exists {
            return Err(ApiError::not_found("TodoStatus", id));
        }
        Ok(())
    }

    /// Creates a status; its priority must not be held by any other status.
    pub async fn create(&self, status: NewTodoStatus) -> Result<TodoStatus, ApiError> {
        let priority = status.priority;
        let taken = self
            .db
            .call(move |conn| db::todo_status::count_by_priority(conn, priority, None))
            .await?;
        if taken > 0 {
            return Err(priority_taken(format!("Priority({priority}) already exists")));
        }

        self.db
            .call(move |conn| db::todo_status::insert(conn, &status))
            .await
            .map_err(|err| conflict_or_internal(err, format!("Priority({priority}) already exists")))
    }

    pub async fn update(&self, id: i64, changes: TodoStatusChanges) -> Result<TodoStatus, ApiError> {
        if let Some(priority) = changes.priority {
            let taken = self
                .db
                .call(move |conn| db::todo_status::count_by_priority(conn, priority, Some(id)))
                .await?;
            if taken > 0 {
                return Err(priority_taken(format!("Same priority({priority}) already exists")));
            }
        }

        let conflict = format!("Same priority({}) already exists", changes.priority.unwrap_or_default());
        self.db
            .call(move |conn| db::todo_status::update(conn, id, &changes))
            .await
            .map_err(|err| conflict_or_internal(err, conflict))?
            .ok_or_else(|| ApiError::not_found("TodoStatus", id))
    }

    /// Deletes an unused status. A status still referenced by a todo is a
    /// client error, reported against `todoStatusId`.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let in_use = self
            .db
            .call(move |conn| db::todo::count_by_status(conn, id))
            .await?;
        if in_use > 0 {
            return Err(ApiError::field(
                "todoStatusId",
                format!("TodoStatusId({id}) is used by todo"),
            ));
        }

        let deleted = self
            .db
            .call(move |conn| db::todo_status::delete(conn, id))
            .await?;
        if !deleted {
            return Err(ApiError::not_found("TodoStatus", id));
        }
        tracing::debug!(id, "todo status deleted");
        Ok(())
    }
}

fn priority_taken(message: String) -> ApiError {
    ApiError::field("priority", message)
}

// A concurrent writer can slip past the count check; the unique index then
// rejects the write.
fn conflict_or_internal(err: StoreError, message: String) -> ApiError {
    if err.is_unique_violation() {
        return priority_taken(message);
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTodo;
    use crate::services::todo::TodoService;

    fn status(name: &str, priority: i64) -> NewTodoStatus {
        NewTodoStatus {
            display_name: name.to_string(),
            priority,
        }
    }

    fn target(err: ApiError, field: &str) -> String {
        match err {
            ApiError::Validation { targets, .. } => targets[field].clone(),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn priorities_stay_unique() {
        let db = Database::open_in_memory().unwrap();
        let service = TodoStatusService::new(&db);

        let todo = service.create(status("Todo", 0)).await.unwrap();
        assert_eq!(todo.display_name, "Todo");

        let err = service.create(status("Again", 0)).await.unwrap_err();
        assert_eq!(target(err, "priority"), "Priority(0) already exists");

        let doing = service.create(status("Doing", 1)).await.unwrap();
        let err = service
            .update(
                doing.id,
                TodoStatusChanges {
                    priority: Some(0),
                    ..TodoStatusChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(target(err, "priority"), "Same priority(0) already exists");

        // Re-saving its own priority is not a collision.
        let same = service
            .update(
                doing.id,
                TodoStatusChanges {
                    display_name: Some("In progress".to_string()),
                    priority: Some(1),
                },
            )
            .await
            .unwrap();
        assert_eq!(same.display_name, "In progress");
        assert_eq!(service.list().await.unwrap(), vec![todo, same]);
    }

    #[tokio::test]
    async fn statuses_in_use_cannot_be_deleted() {
        let db = Database::open_in_memory().unwrap();
        let service = TodoStatusService::new(&db);
        let used = service.create(status("Used", 0)).await.unwrap();
        let unused = service.create(status("Unused", 1)).await.unwrap();

        TodoService::new(&db)
            .create(NewTodo {
                title: "x".to_string(),
                description: None,
                status_id: Some(used.id),
            })
            .await
            .unwrap();

        let err = service.delete(used.id).await.unwrap_err();
        assert_eq!(
            target(err, "todoStatusId"),
            format!("TodoStatusId({}) is used by todo", used.id)
        );

        service.delete(unused.id).await.unwrap();
        assert_eq!(service.list().await.unwrap(), vec![used]);
    }

    #[tokio::test]
    async fn unique_index_conflicts_keep_the_callers_message() {
        let db = Database::open_in_memory().unwrap();
        let insert = |name: &'static str| {
            db.call(move |conn| db::todo_status::insert(conn, &status(name, 4)))
        };
        insert("First").await.unwrap();
        let err = insert("Second").await.unwrap_err();
        assert!(err.is_unique_violation());

        let err = conflict_or_internal(err, "Same priority(4) already exists".to_string());
        assert_eq!(target(err, "priority"), "Same priority(4) already exists");
    }

    #[tokio::test]
    async fn other_store_errors_stay_internal() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .call(|conn| conn.execute("SELECT * FROM missing_table", []))
            .await
            .unwrap_err();
        assert!(matches!(
            conflict_or_internal(err, "Priority(1) already exists".to_string()),
            ApiError::Internal(_)
        ));
    }

    #[tokio::test]
    async fn missing_statuses_are_not_found() {
        let db = Database::open_in_memory().unwrap();
        let service = TodoStatusService::new(&db);

        assert!(matches!(service.ensure_exists(3).await, Err(ApiError::NotFound(_))));
        assert!(matches!(
            service.update(3, TodoStatusChanges::default()).await,
            Err(ApiError::NotFound(msg)) if msg == "TodoStatus(3) not found"
        ));
        assert!(matches!(service.delete(3).await, Err(ApiError::NotFound(_))));
    }
}
