//! Uploaded post images: format sniffing, storage and serving.

use std::path::{Component, Path as FsPath};

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Subdirectory of the media root that holds post images.
pub const POST_IMAGE_DIR: &str = "posts";

/// File extension for a supported image, judged by its leading bytes.
pub fn image_extension(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some("gif")
    } else if data.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        Some("webp")
    } else {
        None
    }
}

/// Reduce a client-supplied filename to a safe basename.
fn sanitize_filename(name: &str, fallback_ext: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        format!("image.{}", fallback_ext)
    } else {
        cleaned.to_string()
    }
}

/// Write an uploaded image under `<media_root>/posts/` and return its path
/// relative to the media root. An existing name gets a random suffix.
pub async fn save_post_image(media_root: &FsPath, filename: &str, data: &[u8]) -> AppResult<String> {
    let ext = image_extension(data)
        .ok_or_else(|| AppError::BadRequest("Unsupported image format".into()))?;

    let dir = media_root.join(POST_IMAGE_DIR);
    tokio::fs::create_dir_all(&dir).await?;

    let mut name = sanitize_filename(filename, ext);
    if tokio::fs::try_exists(dir.join(&name)).await? {
        let suffix = uuid::Uuid::now_v7().simple().to_string();
        let suffix = &suffix[suffix.len() - 7..];
        name = match name.rsplit_once('.') {
            Some((stem, extension)) => format!("{}_{}.{}", stem, suffix, extension),
            None => format!("{}_{}", name, suffix),
        };
    }

    tokio::fs::write(dir.join(&name), data).await?;
    tracing::info!(file = %name, bytes = data.len(), "stored post image");

    Ok(format!("{}/{}", POST_IMAGE_DIR, name))
}

/// GET /media/{*path}
pub async fn serve(State(state): State<AppState>, Path(path): Path<String>) -> AppResult<Response> {
    let relative = FsPath::new(&path);
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(AppError::NotFound);
    }

    let data = match tokio::fs::read(state.config.media_path().join(relative)).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(AppError::NotFound),
        Err(e) => return Err(e.into()),
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        data,
    )
        .into_response())
}
