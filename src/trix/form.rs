//! Trix form parsing and validation.
//!
//! [`TrixSubmission::from_multipart`] collects the raw fields, [`validate`]
//! turns them into a [`TrixInput`] or a [`FormErrors`] map suitable for
//! redisplay.

use std::collections::BTreeMap;

use axum::extract::Multipart;
use bytes::Bytes;

use crate::{error::AppError, storage::image_extension};

pub const TEXT_FIELD: &str = "text";
pub const PHOTO_FIELD: &str = "photo";
pub const PHOTO_CLEAR_FIELD: &str = "photo-clear";

pub const REQUIRED: &str = "This field is required.";
pub const EMPTY_FILE: &str = "The submitted file is empty.";
pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const FILE_AND_CLEAR: &str =
    "Please either submit a file or check the clear checkbox, not both.";

#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub body: Bytes,
}

/// Raw form fields as submitted.
#[derive(Debug, Clone, Default)]
pub struct TrixSubmission {
    pub text: Option<String>,
    pub photo: Option<PhotoUpload>,
    pub clear_photo: bool,
}

#[derive(Debug, Clone)]
pub enum PhotoChange {
    Keep,
    Replace(PhotoUpload),
    Clear,
}

/// A validated submission.
#[derive(Debug, Clone)]
pub struct TrixInput {
    pub text: String,
    pub photo: PhotoChange,
}

/// Field name → messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TrixSubmission {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut submission = TrixSubmission::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                TEXT_FIELD => {
                    submission.text = Some(field.text().await?);
                }
                PHOTO_FIELD => {
                    let file_name = field.file_name().unwrap_or("").to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let body = field.bytes().await?;
                    // browsers send an empty unnamed part when no file is chosen
                    if !(file_name.is_empty() && body.is_empty()) {
                        submission.photo = Some(PhotoUpload {
                            file_name,
                            content_type,
                            body,
                        });
                    }
                }
                PHOTO_CLEAR_FIELD => {
                    submission.clear_photo = checkbox_checked(&field.text().await?);
                }
                _ => {}
            }
        }

        Ok(submission)
    }
}

/// Browsers omit unchecked boxes; scripted clients may send `false`.
fn checkbox_checked(value: &str) -> bool {
    !matches!(value.to_ascii_lowercase().as_str(), "" | "false")
}

pub fn validate(submission: TrixSubmission) -> Result<TrixInput, FormErrors> {
    let mut errors = FormErrors::default();

    let text = submission.text.as_deref().map(str::trim).unwrap_or("");
    if text.is_empty() {
        errors.add(TEXT_FIELD, REQUIRED);
    }

    let photo = match submission.photo {
        Some(_) if submission.clear_photo => {
            errors.add(PHOTO_FIELD, FILE_AND_CLEAR);
            PhotoChange::Keep
        }
        Some(upload) => {
            if upload.body.is_empty() {
                errors.add(PHOTO_FIELD, EMPTY_FILE);
            } else if image_extension(&upload.content_type).is_none() {
                errors.add(PHOTO_FIELD, INVALID_IMAGE);
            }
            PhotoChange::Replace(upload)
        }
        None if submission.clear_photo => PhotoChange::Clear,
        None => PhotoChange::Keep,
    };

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(TrixInput {
        text: text.to_string(),
        photo,
    })
}
