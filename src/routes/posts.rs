use askama::Template;
use axum::extract::{Multipart, Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;

use crate::db::comments::{self, CommentWithAuthor};
use crate::db::models::{Country, PostDraft};
use crate::db::{countries, posts};
use crate::error::AppResult;
use crate::extractors::{CurrentUser, MaybeUser};
use crate::feed::{self, FeedPost};
use crate::forms::{CommentForm, PostFormState, PostSubmission, ValidPost};
use crate::media;
use crate::routes::{parse_post_id, profile_url, Html};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/post_detail.html")]
pub struct PostDetailTemplate {
    pub viewer: Option<CurrentUser>,
    pub post: FeedPost,
    pub comments: Vec<CommentWithAuthor>,
}

#[derive(Template)]
#[template(path = "pages/post_form.html")]
pub struct PostFormTemplate {
    pub viewer: Option<CurrentUser>,
    pub form: PostFormState,
    pub countries: Vec<Country>,
    pub action: String,
    /// Set when editing an existing post.
    pub is_edit: bool,
    pub current_image: Option<String>,
}

impl PostFormTemplate {
    fn create(user: CurrentUser, form: PostFormState, countries: Vec<Country>) -> Self {
        Self {
            viewer: Some(user),
            form,
            countries,
            action: "/create/".to_string(),
            is_edit: false,
            current_image: None,
        }
    }

    fn edit(
        user: CurrentUser,
        post_id: i64,
        form: PostFormState,
        countries: Vec<Country>,
        current_image: Option<String>,
    ) -> Self {
        Self {
            viewer: Some(user),
            form,
            countries,
            action: format!("/post/{}/edit/", post_id),
            is_edit: true,
            current_image: current_image.map(|path| format!("/media/{}", path)),
        }
    }
}

fn detail_url(post_id: i64) -> String {
    format!("/post/{}/", post_id)
}

/// Store the uploaded file, if any, and return its media path.
async fn store_image(state: &AppState, valid: &ValidPost) -> AppResult<Option<String>> {
    match valid.image {
        Some(ref image) => {
            let path =
                media::save_post_image(&state.config.media_path(), &image.filename, &image.data)
                    .await?;
            Ok(Some(path))
        }
        None => Ok(None),
    }
}

/// GET /post/{post_id}/
pub async fn post_detail(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    let post_id = parse_post_id(&raw_id)?;
    let detail = {
        let conn = state.db.get()?;
        feed::post_detail(&conn, post_id, viewer.id())?
    };

    Ok(Html(PostDetailTemplate {
        viewer: viewer.0,
        post: detail.post,
        comments: detail.comments,
    })
    .into_response())
}

// -- Create --

/// GET /create/
pub async fn create_form(State(state): State<AppState>, user: CurrentUser) -> AppResult<Response> {
    let countries = {
        let conn = state.db.get()?;
        countries::list(&conn)?
    };

    Ok(Html(PostFormTemplate::create(user, PostFormState::default(), countries)).into_response())
}

/// POST /create/
pub async fn create_submit(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Response> {
    let submission = PostSubmission::from_multipart(multipart).await?;
    let countries = {
        let conn = state.db.get()?;
        countries::list(&conn)?
    };

    let valid = match submission.validate(&countries) {
        Ok(valid) => valid,
        Err(form) => {
            tracing::debug!(user_id = user.id, "rejected post form");
            return Ok(Html(PostFormTemplate::create(user, form, countries)).into_response());
        }
    };

    let image = store_image(&state, &valid).await?;
    let post = {
        let conn = state.db.get()?;
        posts::create(
            &conn,
            user.id,
            &valid.text,
            Some(valid.country_id),
            image.as_deref(),
        )?
    };
    tracing::info!(post_id = post.id, author_id = user.id, "post created");

    Ok(Redirect::to(&profile_url(&user.username)).into_response())
}

// -- Edit --

/// GET /post/{post_id}/edit/
pub async fn edit_form(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    let post_id = parse_post_id(&raw_id)?;
    let (post, countries) = {
        let conn = state.db.get()?;
        (posts::by_id(&conn, post_id)?, countries::list(&conn)?)
    };

    if post.author_id != user.id {
        return Ok(Redirect::to("/").into_response());
    }

    let form = PostFormState::prefilled(&post.text, post.country_id);
    Ok(Html(PostFormTemplate::edit(user, post.id, form, countries, post.image)).into_response())
}

/// POST /post/{post_id}/edit/
pub async fn edit_submit(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(raw_id): Path<String>,
    multipart: Multipart,
) -> AppResult<Response> {
    let post_id = parse_post_id(&raw_id)?;
    let (post, countries) = {
        let conn = state.db.get()?;
        (posts::by_id(&conn, post_id)?, countries::list(&conn)?)
    };

    if post.author_id != user.id {
        tracing::info!(post_id, user_id = user.id, "edit by non-author ignored");
        return Ok(Redirect::to("/").into_response());
    }

    let submission = PostSubmission::from_multipart(multipart).await?;
    let valid = match submission.validate(&countries) {
        Ok(valid) => valid,
        Err(form) => {
            return Ok(
                Html(PostFormTemplate::edit(user, post.id, form, countries, post.image))
                    .into_response(),
            );
        }
    };

    // no new file keeps the stored one unless "clear" was ticked
    let image = match store_image(&state, &valid).await? {
        Some(path) => Some(path),
        None if valid.clear_image => None,
        None => post.image,
    };
    let draft = PostDraft {
        text: valid.text,
        country_id: Some(valid.country_id),
        image,
    };
    {
        let conn = state.db.get()?;
        posts::update(&conn, post.id, &draft)?;
    }
    tracing::info!(post_id, "post edited");

    Ok(Redirect::to(&detail_url(post.id)).into_response())
}

// -- Comments --

/// POST /post/{post_id}/comment/
pub async fn add_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(raw_id): Path<String>,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    let post_id = parse_post_id(&raw_id)?;
    let conn = state.db.get()?;
    posts::by_id(&conn, post_id)?;

    if let Some(text) = form.clean_text() {
        let comment = comments::create(&conn, post_id, user.id, text)?;
        tracing::info!(comment_id = comment.id, post_id, "comment added");
    }

    Ok(Redirect::to(&detail_url(post_id)).into_response())
}
