use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::User;
use crate::db::{StoreError, StoreResult};

const COLUMNS: &str = "id, username, password_hash, created_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Insert a user. A taken username is a `Conflict`.
pub fn create(conn: &Connection, username: &str, password_hash: &str) -> StoreResult<User> {
    conn.execute(
        "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
        params![username, password_hash],
    )?;
    by_id(conn, conn.last_insert_rowid())
}

pub fn by_id(conn: &Connection, id: i64) -> StoreResult<User> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM users WHERE id = ?1"),
        params![id],
        from_row,
    )
    .optional()?
    .ok_or(StoreError::NotFound("user"))
}

pub fn by_username(conn: &Connection, username: &str) -> StoreResult<User> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM users WHERE username = ?1"),
        params![username],
        from_row,
    )
    .optional()?
    .ok_or(StoreError::NotFound("user"))
}

/// Delete a user together with everything they own.
pub fn delete(conn: &Connection, id: i64) -> StoreResult<bool> {
    let rows = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    Ok(rows > 0)
}
