use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{NewTodoStatus, TodoStatus, TodoStatusChanges};

fn from_row(row: &Row<'_>) -> rusqlite::Result<TodoStatus> {
    Ok(TodoStatus {
        id: row.get(0)?,
        display_name: row.get(1)?,
        priority: row.get(2)?,
    })
}

pub fn list(conn: &Connection) -> rusqlite::Result<Vec<TodoStatus>> {
    let mut stmt =
        conn.prepare("SELECT id, display_name, priority FROM todo_status ORDER BY priority ASC")?;
    let rows = stmt.query_map([], from_row)?;
    rows.collect()
}

pub fn exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM todo_status WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
}

/// Number of statuses holding `priority`, optionally ignoring one status
/// (the one being updated).
pub fn count_by_priority(
    conn: &Connection,
    priority: i64,
    excluding: Option<i64>,
) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM todo_status WHERE priority = ?1 AND (?2 IS NULL OR id <> ?2)",
        params![priority, excluding],
        |row| row.get(0),
    )
}

pub fn insert(conn: &Connection, status: &NewTodoStatus) -> rusqlite::Result<TodoStatus> {
    conn.query_row(
        "INSERT INTO todo_status (display_name, priority) VALUES (?1, ?2)
         RETURNING id, display_name, priority",
        params![status.display_name, status.priority],
        from_row,
    )
}

pub fn update(
    conn: &Connection,
    id: i64,
    changes: &TodoStatusChanges,
) -> rusqlite::Result<Option<TodoStatus>> {
    conn.query_row(
        "UPDATE todo_status SET
             display_name = COALESCE(?1, display_name),
             priority = COALESCE(?2, priority)
         WHERE id = ?3 RETURNING id, display_name, priority",
        params![changes.display_name, changes.priority, id],
        from_row,
    )
    .optional()
}

pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let deleted = conn.execute("DELETE FROM todo_status WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate;

    fn fresh() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    fn status(name: &str, priority: i64) -> NewTodoStatus {
        NewTodoStatus {
            display_name: name.to_string(),
            priority,
        }
    }

    #[test]
    fn lists_by_priority() {
        let conn = fresh();
        let done = insert(&conn, &status("Done", 2)).unwrap();
        let todo = insert(&conn, &status("Todo", 0)).unwrap();
        let doing = insert(&conn, &status("Doing", 1)).unwrap();

        assert_eq!(list(&conn).unwrap(), vec![todo, doing, done]);
    }

    #[test]
    fn priority_count_can_skip_self() {
        let conn = fresh();
        let todo = insert(&conn, &status("Todo", 0)).unwrap();

        assert_eq!(count_by_priority(&conn, 0, None).unwrap(), 1);
        assert_eq!(count_by_priority(&conn, 0, Some(todo.id)).unwrap(), 0);
        assert_eq!(count_by_priority(&conn, 5, None).unwrap(), 0);
    }

    #[test]
    fn duplicate_priority_violates_unique_index() {
        let conn = fresh();
        insert(&conn, &status("Todo", 0)).unwrap();
        let err = crate::db::StoreError::from(insert(&conn, &status("Again", 0)).unwrap_err());
        assert!(err.is_unique_violation());
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let conn = fresh();
        let todo = insert(&conn, &status("Todo", 0)).unwrap();
        let changes = TodoStatusChanges {
            priority: Some(9),
            ..TodoStatusChanges::default()
        };

        let updated = update(&conn, todo.id, &changes).unwrap().unwrap();
        assert_eq!(updated.display_name, "Todo");
        assert_eq!(updated.priority, 9);
        assert_eq!(update(&conn, todo.id + 1, &changes).unwrap(), None);
    }

    #[test]
    fn delete_reports_missing_rows() {
        let conn = fresh();
        let todo = insert(&conn, &status("Todo", 0)).unwrap();
        assert!(exists(&conn, todo.id).unwrap());
        assert!(delete(&conn, todo.id).unwrap());
        assert!(!delete(&conn, todo.id).unwrap());
        assert!(!exists(&conn, todo.id).unwrap());
    }
}
