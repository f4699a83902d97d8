use askama::Template;
use axum::extract::multipart::MultipartError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};

use crate::db::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    /// Anonymous request to a page that needs a login; `next` is the
    /// path (and query) to come back to.
    #[error("Login required")]
    LoginRequired { next: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::NotFound,
            StoreError::Conflict(what) => AppError::Conflict(what),
            StoreError::Pool(e) => AppError::Pool(e),
            StoreError::Sql(e) => AppError::Database(e),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(format!("Malformed form data: {}", err.body_text()))
    }
}

#[derive(Template)]
#[template(path = "pages/404.html")]
pub struct NotFoundTemplate;

#[derive(Template)]
#[template(path = "pages/500.html")]
pub struct ServerErrorTemplate;

fn error_page<T: Template>(status: StatusCode, page: T, fallback: &'static str) -> Response {
    match page.render() {
        Ok(body) => (
            status,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Template render error: {}", e);
            (status, fallback).into_response()
        }
    }
}

fn server_error_page() -> Response {
    error_page(
        StatusCode::INTERNAL_SERVER_ERROR,
        ServerErrorTemplate,
        "Internal server error",
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => error_page(StatusCode::NOT_FOUND, NotFoundTemplate, "Not found"),
            AppError::LoginRequired { next } => {
                Redirect::to(&crate::auth::login_url(&next)).into_response()
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Conflict(msg) => {
                tracing::warn!("Unabsorbed conflict: {}", msg);
                (StatusCode::CONFLICT, "Conflict").into_response()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                server_error_page()
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                server_error_page()
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                server_error_page()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                server_error_page()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Router fallback for unknown paths.
pub async fn fallback() -> AppError {
    AppError::NotFound
}
