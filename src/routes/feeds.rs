use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};

use crate::db::models::{Country, User};
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, MaybeUser};
use crate::feed::{self, FeedFilter, FeedPost, FeedSubject, ProfileStats};
use crate::pagination::Page;
use crate::routes::{Html, PageQuery};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/index.html")]
pub struct IndexTemplate {
    pub viewer: Option<CurrentUser>,
    pub page_posts: Page<FeedPost>,
}

#[derive(Template)]
#[template(path = "pages/follow.html")]
pub struct FollowTemplate {
    pub viewer: Option<CurrentUser>,
    pub page_posts: Page<FeedPost>,
}

#[derive(Template)]
#[template(path = "pages/country_posts.html")]
pub struct CountryTemplate {
    pub viewer: Option<CurrentUser>,
    pub country: Country,
    pub page_posts: Page<FeedPost>,
}

#[derive(Template)]
#[template(path = "pages/profile.html")]
pub struct ProfileTemplate {
    pub viewer: Option<CurrentUser>,
    pub author: User,
    pub stats: ProfileStats,
    /// Follow buttons are hidden on your own profile.
    pub own_profile: bool,
    pub page_posts: Page<FeedPost>,
}

/// GET /
pub async fn index(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let feed = {
        let conn = state.db.get()?;
        feed::compose(&conn, FeedFilter::All, query.page.as_deref(), viewer.id())?
    };

    Ok(Html(IndexTemplate {
        viewer: viewer.0,
        page_posts: feed.page,
    })
    .into_response())
}

/// GET /follow/
pub async fn follow_index(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let feed = {
        let conn = state.db.get()?;
        feed::compose(
            &conn,
            FeedFilter::ByFollowedAuthors(user.id),
            query.page.as_deref(),
            Some(user.id),
        )?
    };

    Ok(Html(FollowTemplate {
        viewer: Some(user),
        page_posts: feed.page,
    })
    .into_response())
}

/// GET /country/{slug}/
pub async fn country_posts(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let feed = {
        let conn = state.db.get()?;
        feed::compose(
            &conn,
            FeedFilter::ByCountry(&slug),
            query.page.as_deref(),
            viewer.id(),
        )?
    };

    let FeedSubject::Country(country) = feed.subject else {
        return Err(AppError::Internal("country feed without a country".into()));
    };

    Ok(Html(CountryTemplate {
        viewer: viewer.0,
        country,
        page_posts: feed.page,
    })
    .into_response())
}

/// GET /profile/{user_name}/
pub async fn profile(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(user_name): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let feed = feed::compose(
        &conn,
        FeedFilter::ByAuthor(&user_name),
        query.page.as_deref(),
        viewer.id(),
    )?;
    let FeedSubject::Author(author) = feed.subject else {
        return Err(AppError::Internal("profile feed without an author".into()));
    };
    let stats = feed::profile_stats(&conn, author.id, viewer.id())?;

    Ok(Html(ProfileTemplate {
        own_profile: viewer.id() == Some(author.id),
        viewer: viewer.0,
        author,
        stats,
        page_posts: feed.page,
    })
    .into_response())
}
