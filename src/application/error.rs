//! Upload failure taxonomy.
//!
//! `ValidationError` and `AuthError` describe the caller's mistake and are safe
//! to show. `PipelineError` carries internal causes (paths, stderr, SDK errors)
//! and is only ever logged.

use crate::domain::asset::EntropyError;
use crate::ports::media::MediaError;
use std::error::Error;
use std::io;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid video ID")]
    InvalidVideoId,

    #[error("Missing form field `{0}`")]
    MissingField(&'static str),

    #[error("Unable to parse form data")]
    MalformedForm,

    #[error("Invalid Content-Type")]
    InvalidContentType,

    #[error("Invalid file type `{media_type}`, expected one of: {}", .accepted.join(", "))]
    UnsupportedMediaType {
        media_type: String,
        accepted: &'static [&'static str],
    },

    #[error("Upload too large (max: {max_bytes} bytes)")]
    TooLarge { max_bytes: u64 },
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Couldn't find JWT")]
    MissingCredential,

    #[error("Couldn't validate JWT")]
    InvalidCredential(#[source] BoxError),

    #[error("Not authorized to update this video")]
    NotOwner,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("staging failed: {0}")]
    Staging(#[source] io::Error),

    #[error(transparent)]
    Entropy(#[from] EntropyError),

    #[error("media processing failed: {0}")]
    Media(#[from] MediaError),

    #[error("{step} timed out after {timeout:?}")]
    Timeout {
        step: &'static str,
        timeout: Duration,
    },

    #[error("object store write failed for {key}: {source}")]
    Storage {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("catalog read failed: {0}")]
    CatalogRead(#[source] BoxError),

    #[error("catalog update failed: {0}")]
    CatalogUpdate(#[source] BoxError),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Couldn't find video {0}")]
    VideoNotFound(Uuid),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl From<MediaError> for UploadError {
    fn from(err: MediaError) -> Self {
        UploadError::Pipeline(PipelineError::Media(err))
    }
}

impl From<EntropyError> for UploadError {
    fn from(err: EntropyError) -> Self {
        UploadError::Pipeline(PipelineError::Entropy(err))
    }
}
