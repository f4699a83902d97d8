use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Redirect, Response};

use crate::db::{posts, users};
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::relations;
use crate::routes::{parse_post_id, profile_url};
use crate::state::AppState;

/// Back to the page the request came from, else the post itself.
fn back_to(headers: &HeaderMap, post_id: i64) -> Redirect {
    match headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        Some(referer) => Redirect::to(referer),
        None => Redirect::to(&format!("/post/{}/", post_id)),
    }
}

/// GET /profile/{user_name}/follow/
pub async fn profile_follow(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_name): Path<String>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let author = users::by_username(&conn, &user_name)?;
    relations::follow(&conn, user.id, author.id)?;

    Ok(Redirect::to(&profile_url(&author.username)).into_response())
}

/// GET /profile/{user_name}/unfollow/
pub async fn profile_unfollow(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_name): Path<String>,
) -> AppResult<Response> {
    let conn = state.db.get()?;
    let author = users::by_username(&conn, &user_name)?;
    relations::unfollow(&conn, user.id, author.id)?;

    Ok(Redirect::to(&profile_url(&author.username)).into_response())
}

/// GET /post/{post_id}/like/
pub async fn post_like(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let post_id = parse_post_id(&raw_id)?;
    let conn = state.db.get()?;
    posts::by_id(&conn, post_id)?;
    relations::like(&conn, user.id, post_id)?;

    Ok(back_to(&headers, post_id).into_response())
}

/// GET /post/{post_id}/dislike/
pub async fn post_dislike(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let post_id = parse_post_id(&raw_id)?;
    let conn = state.db.get()?;
    posts::by_id(&conn, post_id)?;
    relations::dislike(&conn, user.id, post_id)?;

    Ok(back_to(&headers, post_id).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    #[test]
    fn redirects_to_referer_when_present() {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_static("/country/chile/?page=2"));
        let response = back_to(&headers, 3).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/country/chile/?page=2");
    }

    #[test]
    fn falls_back_to_post_detail() {
        let response = back_to(&HeaderMap::new(), 3).into_response();
        assert_eq!(response.headers()[header::LOCATION], "/post/3/");
    }
}
