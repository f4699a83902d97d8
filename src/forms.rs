//! Post and comment form handling.
//!
//! A submitted post form is either turned into a [`ValidPost`] ready to be
//! stored, or bounced back as a [`PostFormState`] carrying the submitted
//! values and per-field errors so the page can be redrawn.

use std::borrow::Borrow;

use axum::extract::Multipart;
use serde::Deserialize;

use crate::db::models::Country;
use crate::error::AppResult;
use crate::media;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const FILE_AND_CLEAR: &str =
    "Please either submit a file or check the clear checkbox, not both.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Raw multipart submission of the create/edit form.
#[derive(Debug, Default)]
pub struct PostSubmission {
    pub text: String,
    pub country: String,
    pub image: Option<UploadedImage>,
    /// The "clear" checkbox next to an existing image was ticked.
    pub clear_image: bool,
}

impl PostSubmission {
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut submission = PostSubmission::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match name.as_str() {
                "text" => submission.text = field.text().await?,
                "country" => submission.country = field.text().await?,
                "image" => {
                    let filename = field.file_name().unwrap_or_default().to_owned();
                    let data = field.bytes().await?;
                    // browsers send an empty part when no file was chosen
                    if !filename.is_empty() || !data.is_empty() {
                        submission.image = Some(UploadedImage {
                            filename,
                            data: data.to_vec(),
                        });
                    }
                }
                "image-clear" => {
                    field.bytes().await?;
                    submission.clear_image = true;
                }
                other => tracing::debug!(field = other, "ignoring unknown form field"),
            }
        }

        Ok(submission)
    }
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPost {
    pub text: String,
    pub country_id: i64,
    pub image: Option<UploadedImage>,
    pub clear_image: bool,
}

/// What the form template shows: current values and errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFormState {
    pub text: String,
    pub country_id: Option<i64>,
    pub text_errors: Vec<String>,
    pub country_errors: Vec<String>,
    pub image_errors: Vec<String>,
}

impl PostFormState {
    pub fn prefilled(text: &str, country_id: Option<i64>) -> Self {
        Self {
            text: text.to_string(),
            country_id,
            ..Self::default()
        }
    }

    pub fn is_selected<T: Borrow<i64>>(&self, id: T) -> bool {
        self.country_id == Some(*id.borrow())
    }

    pub fn has_errors(&self) -> bool {
        !(self.text_errors.is_empty() && self.country_errors.is_empty() && self.image_errors.is_empty())
    }
}

impl PostSubmission {
    /// Check the submission against the known countries.
    pub fn validate(self, countries: &[Country]) -> Result<ValidPost, PostFormState> {
        let text = self.text.trim().to_string();
        let country_id = self.country.trim().parse::<i64>().ok();

        let mut state = PostFormState {
            text: text.clone(),
            country_id,
            ..PostFormState::default()
        };

        if text.is_empty() {
            state.text_errors.push(REQUIRED.to_string());
        }

        let country = match country_id {
            Some(id) if countries.iter().any(|c| c.id == id) => Some(id),
            Some(_) => {
                state.country_errors.push(INVALID_CHOICE.to_string());
                None
            }
            None if self.country.trim().is_empty() => {
                state.country_errors.push(REQUIRED.to_string());
                None
            }
            None => {
                state.country_errors.push(INVALID_CHOICE.to_string());
                None
            }
        };

        if let Some(ref image) = self.image {
            if self.clear_image {
                state.image_errors.push(FILE_AND_CLEAR.to_string());
            } else if media::image_extension(&image.data).is_none() {
                state.image_errors.push(INVALID_IMAGE.to_string());
            }
        }

        match country {
            Some(country_id) if !state.has_errors() => Ok(ValidPost {
                text,
                country_id,
                image: self.image,
                clear_image: self.clear_image,
            }),
            _ => Err(state),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    /// Trimmed text, or `None` when there is nothing to post.
    pub fn clean_text(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }
}
