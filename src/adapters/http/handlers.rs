use super::auth::{bearer_token, content_length};
use super::AppState;
use crate::application::error::{UploadError, ValidationError};
use crate::domain::kind::MediaKind;
use crate::domain::video::VideoRecord;
use crate::ports::catalog::VideoCatalog;
use crate::ports::identity::IdentityProvider;
use crate::ports::media::MediaInspector;
use crate::ports::storage::ObjectStore;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::HeaderMap;
use axum::Json;
use tracing::debug;
use uuid::Uuid;

pub async fn upload_thumbnail<S, C, M, I>(
    State(state): State<AppState<S, C, M, I>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VideoRecord>, UploadError>
where
    S: ObjectStore + 'static,
    C: VideoCatalog + 'static,
    M: MediaInspector + 'static,
    I: IdentityProvider + 'static,
{
    handle_upload(&state, MediaKind::Thumbnail, &video_id, &headers, multipart)
        .await
        .map(Json)
}

pub async fn upload_video<S, C, M, I>(
    State(state): State<AppState<S, C, M, I>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VideoRecord>, UploadError>
where
    S: ObjectStore + 'static,
    C: VideoCatalog + 'static,
    M: MediaInspector + 'static,
    I: IdentityProvider + 'static,
{
    handle_upload(&state, MediaKind::Video, &video_id, &headers, multipart)
        .await
        .map(Json)
}

pub async fn healthz() -> &'static str {
    "ok"
}

async fn handle_upload<S, C, M, I>(
    state: &AppState<S, C, M, I>,
    kind: MediaKind,
    raw_video_id: &str,
    headers: &HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<VideoRecord, UploadError>
where
    S: ObjectStore,
    C: VideoCatalog,
    M: MediaInspector,
    I: IdentityProvider,
{
    let video_id =
        Uuid::parse_str(raw_video_id).map_err(|_| ValidationError::InvalidVideoId)?;

    let token = bearer_token(headers)?;
    let caller = state.identity.authenticate(token)?;

    state
        .uploads
        .check_declared_size(kind, content_length(headers))?;

    let video = state.uploads.authorize(video_id, caller).await?;

    let mut multipart = multipart.map_err(|rejection| {
        debug!(error = %rejection, "multipart rejected");
        ValidationError::MalformedForm
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ValidationError::MalformedForm)?
    {
        if field.name() != Some(kind.field_name()) {
            continue;
        }

        let content_type = field
            .content_type()
            .ok_or(ValidationError::InvalidContentType)?
            .to_string();

        return state
            .uploads
            .upload(kind, video, &content_type, field)
            .await;
    }

    Err(ValidationError::MissingField(kind.field_name()).into())
}
