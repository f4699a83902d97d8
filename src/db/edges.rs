// Follow and Like rows. Uniqueness lives in the schema; duplicates are `Conflict`.
use rusqlite::{params, Connection};

use crate::db::StoreResult;

pub fn insert_follow(conn: &Connection, user_id: i64, author_id: i64) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO follows (user_id, author_id) VALUES (?1, ?2)",
        params![user_id, author_id],
    )?;
    Ok(())
}

pub fn delete_follow(conn: &Connection, user_id: i64, author_id: i64) -> StoreResult<bool> {
    let rows = conn.execute(
        "DELETE FROM follows WHERE user_id = ?1 AND author_id = ?2",
        params![user_id, author_id],
    )?;
    Ok(rows > 0)
}

pub fn follow_exists(conn: &Connection, user_id: i64, author_id: i64) -> StoreResult<bool> {
    let exists = conn.query_row(
        "SELECT COUNT(*) > 0 FROM follows WHERE user_id = ?1 AND author_id = ?2",
        params![user_id, author_id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// How many users follow `author_id`.
pub fn follower_count(conn: &Connection, author_id: i64) -> StoreResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM follows WHERE author_id = ?1",
        params![author_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// How many authors `user_id` follows.
pub fn following_count(conn: &Connection, user_id: i64) -> StoreResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM follows WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn insert_like(conn: &Connection, user_id: i64, post_id: i64) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO likes (user_id, post_id) VALUES (?1, ?2)",
        params![user_id, post_id],
    )?;
    Ok(())
}

pub fn delete_like(conn: &Connection, user_id: i64, post_id: i64) -> StoreResult<bool> {
    let rows = conn.execute(
        "DELETE FROM likes WHERE user_id = ?1 AND post_id = ?2",
        params![user_id, post_id],
    )?;
    Ok(rows > 0)
}

pub fn like_exists(conn: &Connection, user_id: i64, post_id: i64) -> StoreResult<bool> {
    let exists = conn.query_row(
        "SELECT COUNT(*) > 0 FROM likes WHERE user_id = ?1 AND post_id = ?2",
        params![user_id, post_id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

pub fn like_count(conn: &Connection, post_id: i64) -> StoreResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM likes WHERE post_id = ?1",
        params![post_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
