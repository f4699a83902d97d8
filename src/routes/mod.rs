pub mod assets;
pub mod auth;
pub mod feeds;
pub mod posts;
pub mod relations;

use askama::Template;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::error::{self, AppError, AppResult};
use crate::state::AppState;

/// Upper bound for a create/edit request, image included.
const UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

/// `?page=` on every listing. Kept as a string so junk falls back to page 1.
#[derive(Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Characters escaped in a single path segment such as a username.
const SEGMENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'@')
    .remove(b'+');

pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", utf8_percent_encode(username, SEGMENT_SET))
}

/// Path segments that must be a post id; anything else is a 404.
pub fn parse_post_id(raw: &str) -> AppResult<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::NotFound);
    }
    raw.parse().map_err(|_| AppError::NotFound)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(feeds::index))
        .route("/follow/", get(feeds::follow_index))
        .route("/country/{slug}/", get(feeds::country_posts))
        .route("/profile/{user_name}/", get(feeds::profile))
        .route(
            "/profile/{user_name}/follow/",
            get(relations::profile_follow),
        )
        .route(
            "/profile/{user_name}/unfollow/",
            get(relations::profile_unfollow),
        )
        .route(
            "/create/",
            get(posts::create_form)
                .post(posts::create_submit)
                .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
        )
        .route(
            "/post/{post_id}/edit/",
            get(posts::edit_form)
                .post(posts::edit_submit)
                .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
        )
        .route(
            "/post/{post_id}/comment/",
            axum::routing::post(posts::add_comment),
        )
        .route("/post/{post_id}/like/", get(relations::post_like))
        .route("/post/{post_id}/dislike/", get(relations::post_dislike))
        .route("/post/{post_id}/", get(posts::post_detail))
        .route("/static/{*path}", get(assets::serve))
        .route("/media/{*path}", get(crate::media::serve))
        .merge(auth::router())
        .fallback(error::fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_url_escapes_username() {
        assert_eq!(profile_url("author"), "/profile/author/");
        assert_eq!(profile_url("a.b+c@d_e-f"), "/profile/a.b+c@d_e-f/");
        assert_eq!(profile_url("Jos\u{e9}"), "/profile/Jos%C3%A9/");
    }

    #[test]
    fn post_ids_must_be_digits() {
        assert_eq!(parse_post_id("42").unwrap(), 42);
        assert!(matches!(parse_post_id("abc"), Err(AppError::NotFound)));
        assert!(matches!(parse_post_id("-1"), Err(AppError::NotFound)));
        assert!(matches!(parse_post_id(""), Err(AppError::NotFound)));
        assert!(matches!(
            parse_post_id("99999999999999999999999"),
            Err(AppError::NotFound)
        ));
    }
}
