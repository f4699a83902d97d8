use askama::Template;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::auth::{password, safe_next, session};
use crate::db::{users, StoreError};
use crate::error::AppResult;
use crate::extractors::{session_token, CurrentUser, MaybeUser};
use crate::routes::Html;
use crate::state::AppState;

// -- Templates --

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub viewer: Option<CurrentUser>,
    pub username: String,
    pub next: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/signup.html")]
pub struct SignupTemplate {
    pub viewer: Option<CurrentUser>,
    pub username: String,
    pub errors: Vec<String>,
}

// -- Request types --

#[derive(Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: String,
}

#[derive(Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

// -- Cookie helpers --

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name,
        token,
        max_age_hours * 3600
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name)
}

fn start_session(state: &AppState, user_id: i64, target: &str) -> AppResult<Response> {
    let conn = state.db.get()?;
    let token = session::create_session(&conn, user_id, state.config.auth.session_hours)?;
    let cookie = session_cookie(
        &state.config.auth.cookie_name,
        &token,
        state.config.auth.session_hours,
    );

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::to(target),
    )
        .into_response())
}

// -- Login --

/// GET /auth/login/
pub async fn login_page(
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<NextQuery>,
) -> AppResult<Response> {
    let next = safe_next(query.next.as_deref()).to_string();
    if viewer.is_some() {
        return Ok(Redirect::to(&next).into_response());
    }

    Ok(Html(LoginTemplate {
        viewer,
        username: String::new(),
        next,
        error: None,
    })
    .into_response())
}

/// POST /auth/login/
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let next = safe_next(Some(&form.next)).to_string();
    let username = form.username.trim().to_string();

    let user = {
        let conn = state.db.get()?;
        match users::by_username(&conn, &username) {
            Ok(user) => Some(user),
            Err(StoreError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        }
    };

    match user {
        Some(user) if password::verify(&form.password, &user.password_hash) => {
            tracing::info!(user_id = user.id, "login");
            start_session(&state, user.id, &next)
        }
        _ => {
            tracing::info!(username = %username, "rejected login");
            Ok(Html(LoginTemplate {
                viewer: None,
                username,
                next,
                error: Some(
                    "Please enter a correct username and password. Note that both fields may be case-sensitive."
                        .to_string(),
                ),
            })
            .into_response())
        }
    }
}

// -- Signup --

/// GET /auth/signup/
pub async fn signup_page(MaybeUser(viewer): MaybeUser) -> AppResult<Response> {
    if viewer.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    Ok(Html(SignupTemplate {
        viewer,
        username: String::new(),
        errors: Vec::new(),
    })
    .into_response())
}

/// POST /auth/signup/
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let username = form.username.trim().to_string();

    let mut errors: Vec<String> = Vec::new();
    if let Err(msg) = password::validate_username(&username) {
        errors.push(msg.to_string());
    }
    if let Err(msg) = password::validate_password(&form.password1, &form.password2) {
        errors.push(msg.to_string());
    }

    if errors.is_empty() {
        let hash = password::hash(&form.password1, state.config.auth.bcrypt_cost)?;
        let created = {
            let conn = state.db.get()?;
            users::create(&conn, &username, &hash)
        };
        match created {
            Ok(user) => {
                tracing::info!(user_id = user.id, username = %user.username, "user signed up");
                return start_session(&state, user.id, "/");
            }
            Err(StoreError::Conflict(_)) => {
                errors.push("A user with that username already exists.".to_string());
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Html(SignupTemplate {
        viewer: None,
        username,
        errors,
    })
    .into_response())
}

// -- Logout --

/// GET or POST /auth/logout/
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let cookie_name = state.config.auth.cookie_name.clone();
    if let Some(token) = session_token(&headers, &cookie_name) {
        let conn = state.db.get()?;
        session::delete_session(&conn, token)?;
    }

    Ok((
        AppendHeaders([(header::SET_COOKIE, clear_session_cookie(&cookie_name))]),
        Redirect::to("/"),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_format() {
        let cookie = session_cookie("travel_blog_session", "abc", 2);
        assert!(cookie.starts_with("travel_blog_session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=7200"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        assert!(clear_session_cookie("s").contains("Max-Age=0"));
    }
}
