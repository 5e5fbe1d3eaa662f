use serde::Serialize;

use crate::db::{self, Database};
use crate::error::ApiError;
use crate::models::{NewTodo, Todo, TodoChanges};
use crate::pagination::{PageMeta, Pagination};

#[derive(Debug, Serialize)]
pub struct TodoPage {
    pub todo: Vec<Todo>,
    pub meta: PageMeta,
}

pub struct TodoService<'a> {
    db: &'a Database,
}

impl<'a> TodoService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn list(&self, include_done: bool, pagination: Pagination) -> Result<TodoPage, ApiError> {
        let total_count = self
            .db
            .call(move |conn| db::todo::count(conn, include_done))
            .await?;
        let meta = pagination.meta(total_count)?;

        let (skip, take) = (pagination.skip(), pagination.take());
        let todo = self
            .db
            .call(move |conn| db::todo::list(conn, include_done, skip, take))
            .await?;
        Ok(TodoPage { todo, meta })
    }

    pub async fn detail(&self, id: i64) -> Result<Todo, ApiError> {
        self.db
            .call(move |conn| db::todo::find(conn, id))
            .await?
            .ok_or_else(|| ApiError::not_found("Todo", id))
    }

    pub async fn ensure_exists(&self, id: i64) -> Result<(), ApiError> {
        let exists = self.db.call(move |conn| db::todo::exists(conn, id)).await?;
        if !exists {
            return Err(ApiError::not_found("Todo", id));
        }
        Ok(())
    }

    pub async fn create(&self, todo: NewTodo) -> Result<Todo, ApiError> {
        if let Some(status_id) = todo.status_id {
            self.ensure_status(status_id).await?;
        }
        let now = db::now();
        let todo = self
            .db
            .call(move |conn| db::todo::insert(conn, &todo, now))
            .await?;
        tracing::debug!(id = todo.id, "todo created");
        Ok(todo)
    }

    pub async fn update(&self, id: i64, changes: TodoChanges) -> Result<Todo, ApiError> {
        if let Some(Some(status_id)) = changes.status_id {
            self.ensure_status(status_id).await?;
        }
        let now = db::now();
        self.db
            .call(move |conn| db::todo::update(conn, id, &changes, now))
            .await?
            .ok_or_else(|| ApiError::not_found("Todo", id))
    }

    /// Marks the todo done (stamping the completion time) or reopens it.
    pub async fn set_done(&self, id: i64, done: bool) -> Result<Todo, ApiError> {
        let now = db::now();
        self.db
            .call(move |conn| db::todo::set_done(conn, id, done, now))
            .await?
            .ok_or_else(|| ApiError::not_found("Todo", id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let deleted = self.db.call(move |conn| db::todo::delete(conn, id)).await?;
        if !deleted {
            return Err(ApiError::not_found("Todo", id));
        }
        tracing::debug!(id, "todo deleted");
        Ok(())
    }

    async fn ensure_status(&self, status_id: i64) -> Result<(), ApiError> {
        let exists = self
            .db
            .call(move |conn| db::todo_status::exists(conn, status_id))
            .await?;
        if !exists {
            return Err(ApiError::field("statusId", format!("Invalid statusId({status_id})")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_todo(title: &str) -> NewTodo {
        NewTodo {
            title: title.to_string(),
            ..NewTodo::default()
        }
    }

    #[tokio::test]
    async fn done_todos_drop_out_of_the_default_listing() {
        let db = Database::open_in_memory().unwrap();
        let service = TodoService::new(&db);

        let todo = service.create(new_todo("x")).await.unwrap();
        assert_eq!(todo.description, None);
        assert_eq!(todo.done_at, None);

        let done = service.set_done(todo.id, true).await.unwrap();
        assert!(done.done_at.is_some());

        let open = service.list(false, Pagination::default()).await.unwrap();
        assert!(open.todo.is_empty());
        assert_eq!(open.meta.total_count, 0);

        let all = service.list(true, Pagination::default()).await.unwrap();
        assert_eq!(all.todo, vec![done]);
    }

    #[tokio::test]
    async fn out_of_range_page_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let service = TodoService::new(&db);
        for i in 0..3 {
            service.create(new_todo(&format!("todo {i}"))).await.unwrap();
        }

        let page = Pagination {
            page: 2,
            items_per_page: 2,
        };
        let listing = service.list(false, page).await.unwrap();
        assert_eq!(listing.todo.len(), 1);
        assert!(listing.meta.has_previous);
        assert!(!listing.meta.has_next);

        let beyond = Pagination {
            page: 3,
            items_per_page: 2,
        };
        assert!(matches!(service.list(false, beyond).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn unknown_status_is_rejected_before_insert() {
        let db = Database::open_in_memory().unwrap();
        let service = TodoService::new(&db);

        let err = service
            .create(NewTodo {
                title: "x".to_string(),
                description: None,
                status_id: Some(99),
            })
            .await
            .unwrap_err();
        match err {
            ApiError::Validation { targets, .. } => {
                assert_eq!(targets["statusId"], "Invalid statusId(99)");
            }
            other => panic!("unexpected {other:?}"),
        }
        let all = service.list(true, Pagination::default()).await.unwrap();
        assert_eq!(all.meta.total_count, 0);
    }

    #[tokio::test]
    async fn missing_todos_are_not_found() {
        let db = Database::open_in_memory().unwrap();
        let service = TodoService::new(&db);

        assert!(matches!(service.detail(5).await, Err(ApiError::NotFound(msg)) if msg == "Todo(5) not found"));
        assert!(matches!(service.ensure_exists(5).await, Err(ApiError::NotFound(_))));
        assert!(matches!(service.set_done(5, true).await, Err(ApiError::NotFound(_))));
        assert!(matches!(service.delete(5).await, Err(ApiError::NotFound(_))));
    }
}
