//! Feed composition: filtered, ordered, paginated post listings.
//!
//! Every listing is sorted newest first (`created_at DESC, id DESC`) and cut
//! into pages of [`POSTS_PER_PAGE`]. The requester is passed in explicitly so
//! each row can say whether the requester likes or wrote it.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

use crate::db::comments::{self, CommentWithAuthor};
use crate::db::models::{Country, User};
use crate::db::{countries, edges, users, StoreError, StoreResult};
use crate::pagination::{Page, Window, POSTS_PER_PAGE};
use crate::timefmt::display_timestamp;

/// Which posts a feed shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFilter<'a> {
    All,
    ByCountry(&'a str),
    ByAuthor(&'a str),
    /// Posts by authors the given (authenticated) user follows.
    ByFollowedAuthors(i64),
}

/// What the filter resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSubject {
    Everyone,
    Country(Country),
    Author(User),
    FollowedBy(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryTag {
    pub title: String,
    pub slug: String,
}

/// A post as shown in listings and on its detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPost {
    pub id: i64,
    pub text: String,
    pub created_at: String,
    pub published: String,
    pub author_id: i64,
    pub author_username: String,
    pub country: Option<CountryTag>,
    pub image: Option<String>,
    pub comments_count: i64,
    pub likes_count: i64,
    /// The requester has a Like edge on this post.
    pub liked: bool,
    /// The requester wrote this post.
    pub editable: bool,
}

impl FeedPost {
    pub fn image_url(&self) -> Option<String> {
        self.image.as_ref().map(|path| format!("/media/{}", path))
    }
}

#[derive(Debug, Clone)]
pub struct Feed {
    pub subject: FeedSubject,
    pub page: Page<FeedPost>,
}

/// Follow statistics shown on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileStats {
    pub followers_count: i64,
    pub following_count: i64,
    /// The requester follows this author.
    pub following: bool,
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: FeedPost,
    pub comments: Vec<CommentWithAuthor>,
}

const SELECT_POSTS: &str = "SELECT p.id, p.text, p.created_at, p.author_id, u.username,
        c.title, c.slug, p.image,
        (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id),
        (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id),
        EXISTS (SELECT 1 FROM likes l WHERE l.post_id = p.id AND l.user_id = ?)
     FROM posts p
     JOIN users u ON u.id = p.author_id
     LEFT JOIN countries c ON c.id = p.country_id";

/// Join clause, where clause and bound value restricting `posts p`.
struct Predicate {
    join: &'static str,
    filter: &'static str,
    arg: Option<i64>,
}

impl FeedSubject {
    fn predicate(&self) -> Predicate {
        match self {
            FeedSubject::Everyone => Predicate {
                join: "",
                filter: "",
                arg: None,
            },
            FeedSubject::Country(country) => Predicate {
                join: "",
                filter: "WHERE p.country_id = ?",
                arg: Some(country.id),
            },
            FeedSubject::Author(user) => Predicate {
                join: "",
                filter: "WHERE p.author_id = ?",
                arg: Some(user.id),
            },
            FeedSubject::FollowedBy(user_id) => Predicate {
                join: "JOIN follows f ON f.author_id = p.author_id",
                filter: "WHERE f.user_id = ?",
                arg: Some(*user_id),
            },
        }
    }
}

fn resolve(conn: &Connection, filter: FeedFilter<'_>) -> StoreResult<FeedSubject> {
    Ok(match filter {
        FeedFilter::All => FeedSubject::Everyone,
        FeedFilter::ByCountry(slug) => FeedSubject::Country(countries::by_slug(conn, slug)?),
        FeedFilter::ByAuthor(username) => FeedSubject::Author(users::by_username(conn, username)?),
        FeedFilter::ByFollowedAuthors(user_id) => FeedSubject::FollowedBy(user_id),
    })
}

fn feed_post(row: &Row<'_>, viewer: Option<i64>) -> rusqlite::Result<FeedPost> {
    let created_at: String = row.get(2)?;
    let author_id: i64 = row.get(3)?;
    let title: Option<String> = row.get(5)?;
    let slug: Option<String> = row.get(6)?;

    Ok(FeedPost {
        id: row.get(0)?,
        text: row.get(1)?,
        published: display_timestamp(&created_at),
        created_at,
        author_id,
        author_username: row.get(4)?,
        country: title
            .zip(slug)
            .map(|(title, slug)| CountryTag { title, slug }),
        image: row.get(7)?,
        comments_count: row.get(8)?,
        likes_count: row.get(9)?,
        liked: row.get(10)?,
        editable: viewer == Some(author_id),
    })
}

/// Build one page of a feed.
///
/// `ByCountry` and `ByAuthor` fail with `NotFound` when the slug or username
/// is unknown. An empty result is a valid page, and out-of-range page numbers
/// land on the last page.
pub fn compose(
    conn: &Connection,
    filter: FeedFilter<'_>,
    raw_page: Option<&str>,
    viewer: Option<i64>,
) -> StoreResult<Feed> {
    let subject = resolve(conn, filter)?;
    let predicate = subject.predicate();

    let total_count: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM posts p {} {}",
            predicate.join, predicate.filter
        ),
        params_from_iter(predicate.arg.iter()),
        |row| row.get(0),
    )?;
    let total_count = total_count as usize;

    let window = Window::resolve(raw_page, total_count, POSTS_PER_PAGE);

    let mut args: Vec<Value> = vec![viewer.map_or(Value::Null, Value::Integer)];
    args.extend(predicate.arg.map(Value::Integer));
    args.push(Value::Integer(window.limit as i64));
    args.push(Value::Integer(window.offset as i64));

    let sql = format!(
        "{SELECT_POSTS} {} {} ORDER BY p.created_at DESC, p.id DESC LIMIT ? OFFSET ?",
        predicate.join, predicate.filter
    );
    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map(params_from_iter(args), |row| feed_post(row, viewer))?
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        page = window.current_page,
        total_pages = window.total_pages,
        total_count,
        "composed feed"
    );

    Ok(Feed {
        subject,
        page: window.into_page(items, total_count),
    })
}

/// A single post in feed shape, or `NotFound`.
pub fn post(conn: &Connection, post_id: i64, viewer: Option<i64>) -> StoreResult<FeedPost> {
    let sql = format!("{SELECT_POSTS} WHERE p.id = ?");
    conn.query_row(&sql, params![viewer, post_id], |row| feed_post(row, viewer))
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound("post"),
            other => other.into(),
        })
}

/// A post with its comments, newest comment first.
pub fn post_detail(conn: &Connection, post_id: i64, viewer: Option<i64>) -> StoreResult<PostDetail> {
    let post = post(conn, post_id, viewer)?;
    let comments = comments::list_for_post(conn, post_id)?;
    Ok(PostDetail { post, comments })
}

pub fn profile_stats(
    conn: &Connection,
    author_id: i64,
    viewer: Option<i64>,
) -> StoreResult<ProfileStats> {
    let following = match viewer {
        Some(viewer_id) => edges::follow_exists(conn, viewer_id, author_id)?,
        None => false,
    };

    Ok(ProfileStats {
        followers_count: edges::follower_count(conn, author_id)?,
        following_count: edges::following_count(conn, author_id)?,
        following,
    })
}
