use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::{Post, PostDraft};
use crate::db::{StoreError, StoreResult};

const COLUMNS: &str = "id, text, created_at, author_id, country_id, image";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        text: row.get(1)?,
        created_at: row.get(2)?,
        author_id: row.get(3)?,
        country_id: row.get(4)?,
        image: row.get(5)?,
    })
}

/// Insert a post. `created_at` is filled in by the database.
pub fn create(
    conn: &Connection,
    author_id: i64,
    text: &str,
    country_id: Option<i64>,
    image: Option<&str>,
) -> StoreResult<Post> {
    conn.execute(
        "INSERT INTO posts (text, author_id, country_id, image) VALUES (?1, ?2, ?3, ?4)",
        params![text, author_id, country_id, image],
    )?;
    by_id(conn, conn.last_insert_rowid())
}

pub fn by_id(conn: &Connection, id: i64) -> StoreResult<Post> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM posts WHERE id = ?1"),
        params![id],
        from_row,
    )
    .optional()?
    .ok_or(StoreError::NotFound("post"))
}

/// Overwrite the author-editable fields. Author and timestamp never change.
pub fn update(conn: &Connection, id: i64, draft: &PostDraft) -> StoreResult<Post> {
    let rows = conn.execute(
        "UPDATE posts SET text = ?1, country_id = ?2, image = ?3 WHERE id = ?4",
        params![draft.text, draft.country_id, draft.image, id],
    )?;
    if rows == 0 {
        return Err(StoreError::NotFound("post"));
    }
    by_id(conn, id)
}

pub fn delete(conn: &Connection, id: i64) -> StoreResult<bool> {
    let rows = conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
    Ok(rows > 0)
}
