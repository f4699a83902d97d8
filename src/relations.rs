//! Follow and like toggles.
//!
//! Every operation is idempotent. Creating an edge that already exists is a
//! no-op, including when a concurrent request wins the insert race and the
//! unique constraint reports a conflict. Removing a missing edge is a no-op.

use rusqlite::Connection;

use crate::db::{edges, StoreError, StoreResult};

/// What a toggle actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    AlreadyPresent,
    SelfTarget,
    Removed,
    Absent,
}

fn absorb_conflict(result: StoreResult<()>) -> StoreResult<Outcome> {
    match result {
        Ok(()) => Ok(Outcome::Created),
        Err(StoreError::Conflict(_)) => Ok(Outcome::AlreadyPresent),
        Err(e) => Err(e),
    }
}

/// `requester` starts following `author`. Following yourself is skipped.
pub fn follow(conn: &Connection, requester: i64, author: i64) -> StoreResult<Outcome> {
    if requester == author {
        return Ok(Outcome::SelfTarget);
    }
    if edges::follow_exists(conn, requester, author)? {
        return Ok(Outcome::AlreadyPresent);
    }

    let outcome = absorb_conflict(edges::insert_follow(conn, requester, author))?;
    tracing::info!(requester, author, ?outcome, "follow");
    Ok(outcome)
}

pub fn unfollow(conn: &Connection, requester: i64, author: i64) -> StoreResult<Outcome> {
    let outcome = if edges::delete_follow(conn, requester, author)? {
        Outcome::Removed
    } else {
        Outcome::Absent
    };
    tracing::info!(requester, author, ?outcome, "unfollow");
    Ok(outcome)
}

/// `requester` likes `post`. Liking your own post is allowed.
pub fn like(conn: &Connection, requester: i64, post: i64) -> StoreResult<Outcome> {
    if edges::like_exists(conn, requester, post)? {
        return Ok(Outcome::AlreadyPresent);
    }

    let outcome = absorb_conflict(edges::insert_like(conn, requester, post))?;
    tracing::info!(requester, post, ?outcome, "like");
    Ok(outcome)
}

pub fn dislike(conn: &Connection, requester: i64, post: i64) -> StoreResult<Outcome> {
    let outcome = if edges::delete_like(conn, requester, post)? {
        Outcome::Removed
    } else {
        Outcome::Absent
    };
    tracing::info!(requester, post, ?outcome, "dislike");
    Ok(outcome)
}
