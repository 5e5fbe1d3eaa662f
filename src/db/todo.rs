use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{format_timestamp, parse_timestamp};
use crate::models::{NewTodo, Todo, TodoChanges};

const COLUMNS: &str = "id, title, description, created_at, updated_at, done_at, todo_status_id";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Todo> {
    let created_at: String = row.get(3)?;
    let updated_at: String = row.get(4)?;
    let done_at: Option<String> = row.get(5)?;
    Ok(Todo {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        created_at: parse_timestamp(3, &created_at)?,
        updated_at: parse_timestamp(4, &updated_at)?,
        done_at: done_at.map(|value| parse_timestamp(5, &value)).transpose()?,
        status_id: row.get(6)?,
    })
}

pub fn insert(conn: &Connection, todo: &NewTodo, now: DateTime<Utc>) -> rusqlite::Result<Todo> {
    let now = format_timestamp(&now);
    conn.query_row(
        &format!(
            "INSERT INTO todo (title, description, created_at, updated_at, todo_status_id)
             VALUES (?1, ?2, ?3, ?3, ?4) RETURNING {COLUMNS}"
        ),
        params![todo.title, todo.description, now, todo.status_id],
        from_row,
    )
}

pub fn find(conn: &Connection, id: i64) -> rusqlite::Result<Option<Todo>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM todo WHERE id = ?1"),
        params![id],
        from_row,
    )
    .optional()
}

pub fn exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM todo WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
}

/// One page of todos, newest update first; equal timestamps keep id order.
pub fn list(
    conn: &Connection,
    include_done: bool,
    skip: i64,
    take: i64,
) -> rusqlite::Result<Vec<Todo>> {
    let filter = if include_done { "" } else { "WHERE done_at IS NULL" };
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM todo {filter} ORDER BY updated_at DESC, id ASC LIMIT ?1 OFFSET ?2"
    ))?;
    let rows = stmt.query_map(params![take, skip], from_row)?;
    rows.collect()
}

pub fn count(conn: &Connection, include_done: bool) -> rusqlite::Result<i64> {
    let sql = if include_done {
        "SELECT COUNT(*) FROM todo"
    } else {
        "SELECT COUNT(*) FROM todo WHERE done_at IS NULL"
    };
    conn.query_row(sql, [], |row| row.get(0))
}

pub fn count_by_status(conn: &Connection, status_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM todo WHERE todo_status_id = ?1",
        params![status_id],
        |row| row.get(0),
    )
}

pub fn update(
    conn: &Connection,
    id: i64,
    changes: &TodoChanges,
    now: DateTime<Utc>,
) -> rusqlite::Result<Option<Todo>> {
    conn.query_row(
        &format!(
            "UPDATE todo SET
                 title = COALESCE(?1, title),
                 description = CASE WHEN ?2 THEN ?3 ELSE description END,
                 todo_status_id = CASE WHEN ?4 THEN ?5 ELSE todo_status_id END,
                 updated_at = ?6
             WHERE id = ?7 RETURNING {COLUMNS}"
        ),
        params![
            changes.title,
            changes.description.is_some(),
            changes.description.clone().flatten(),
            changes.status_id.is_some(),
            changes.status_id.flatten(),
            format_timestamp(&now),
            id,
        ],
        from_row,
    )
    .optional()
}

pub fn set_done(
    conn: &Connection,
    id: i64,
    done: bool,
    now: DateTime<Utc>,
) -> rusqlite::Result<Option<Todo>> {
    let now = format_timestamp(&now);
    let done_at = done.then(|| now.clone());
    conn.query_row(
        &format!("UPDATE todo SET done_at = ?1, updated_at = ?2 WHERE id = ?3 RETURNING {COLUMNS}"),
        params![done_at, now, id],
        from_row,
    )
    .optional()
}

pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let deleted = conn.execute("DELETE FROM todo WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

/// Bulk insert used by the seeding command; the caller owns the transaction.
pub fn insert_seeded(
    conn: &Connection,
    title: &str,
    description: &str,
    at: DateTime<Utc>,
    done: bool,
) -> rusqlite::Result<()> {
    let at = format_timestamp(&at);
    let done_at = done.then(|| at.clone());
    conn.execute(
        "INSERT INTO todo (title, description, created_at, updated_at, done_at)
         VALUES (?1, ?2, ?3, ?3, ?4)",
        params![title, description, at, done_at],
    )?;
    Ok(())
}
