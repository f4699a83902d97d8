use rusqlite::{params, Connection};

use crate::db::models::Comment;
use crate::db::{posts, StoreResult};
use crate::timefmt::display_timestamp;

/// A comment joined with its author's username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author_username: String,
}

impl CommentWithAuthor {
    pub fn published(&self) -> String {
        display_timestamp(&self.comment.created_at)
    }
}

/// Attach a comment to an existing post; a missing post is `NotFound`.
pub fn create(conn: &Connection, post_id: i64, author_id: i64, text: &str) -> StoreResult<Comment> {
    posts::by_id(conn, post_id)?;

    conn.execute(
        "INSERT INTO comments (post_id, author_id, text) VALUES (?1, ?2, ?3)",
        params![post_id, author_id, text],
    )?;
    let id = conn.last_insert_rowid();

    let comment = conn.query_row(
        "SELECT id, post_id, author_id, text, created_at FROM comments WHERE id = ?1",
        params![id],
        |row| {
            Ok(Comment {
                id: row.get(0)?,
                post_id: row.get(1)?,
                author_id: row.get(2)?,
                text: row.get(3)?,
                created_at: row.get(4)?,
            })
        },
    )?;
    Ok(comment)
}

/// Comments on a post, newest first.
pub fn list_for_post(conn: &Connection, post_id: i64) -> StoreResult<Vec<CommentWithAuthor>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.post_id, c.author_id, c.text, c.created_at, u.username
         FROM comments c
         JOIN users u ON u.id = c.author_id
         WHERE c.post_id = ?1
         ORDER BY c.created_at DESC, c.id DESC",
    )?;

    let comments = stmt
        .query_map(params![post_id], |row| {
            Ok(CommentWithAuthor {
                comment: Comment {
                    id: row.get(0)?,
                    post_id: row.get(1)?,
                    author_id: row.get(2)?,
                    text: row.get(3)?,
                    created_at: row.get(4)?,
                },
                author_username: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(comments)
}

pub fn count_for_post(conn: &Connection, post_id: i64) -> StoreResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM comments WHERE post_id = ?1",
        params![post_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::test_pool;
    use crate::db::{users, StoreError};

    #[test]
    fn comments_are_listed_newest_first() {
        let (pool, _tmp) = test_pool();
        let conn = pool.get().unwrap();

        let ann = users::create(&conn, "ann", "hash").unwrap();
        let post = posts::create(&conn, ann.id, "Lisbon trams", None, None).unwrap();
        create(&conn, post.id, ann.id, "first").unwrap();
        create(&conn, post.id, ann.id, "second").unwrap();

        let texts: Vec<String> = list_for_post(&conn, post.id)
            .unwrap()
            .into_iter()
            .map(|c| c.comment.text)
            .collect();
        assert_eq!(texts, ["second", "first"]);
        assert_eq!(count_for_post(&conn, post.id).unwrap(), 2);
    }

    #[test]
    fn comment_on_missing_post_is_not_found() {
        let (pool, _tmp) = test_pool();
        let conn = pool.get().unwrap();
        let ann = users::create(&conn, "ann", "hash").unwrap();
        assert!(matches!(
            create(&conn, 77, ann.id, "hello?"),
            Err(StoreError::NotFound("post"))
        ));
    }
}
