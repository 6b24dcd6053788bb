//! Upload orchestration.
//!
//! ```text
//! Received -> Validated -> Staged -> [Classified -> Remuxed] -> Uploaded -> Recorded
//! ```
//!
//! The bracketed steps only run for videos. Every failure aborts the upload and
//! the scratch files created so far are removed when `ScratchFiles` drops.

use crate::application::error::{AuthError, PipelineError, UploadError, ValidationError};
use crate::application::scratch::ScratchFiles;
use crate::domain::asset::{essence, extension_for, AssetName};
use crate::domain::delivery::DeliveryMode;
use crate::domain::kind::MediaKind;
use crate::domain::layout::{object_key, AssetPlacement};
use crate::domain::orientation::Orientation;
use crate::domain::video::VideoRecord;
use crate::ports::catalog::VideoCatalog;
use crate::ports::media::{remux_output_path, MediaError, MediaInspector};
use crate::ports::storage::ObjectStore;
use bytes::Bytes;
use futures::Stream;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Per-endpoint size ceilings in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub thumbnail_max_bytes: u64,
    pub video_max_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            thumbnail_max_bytes: 10 << 20,
            video_max_bytes: 1 << 30,
        }
    }
}

impl UploadLimits {
    pub fn for_kind(&self, kind: MediaKind) -> u64 {
        match kind {
            MediaKind::Thumbnail => self.thumbnail_max_bytes,
            MediaKind::Video => self.video_max_bytes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub delivery: DeliveryMode,
    pub scratch_dir: PathBuf,
    pub limits: UploadLimits,
    /// Applied to each probe and remux call when set.
    pub media_timeout: Option<Duration>,
}

pub struct UploadService<S, C, M> {
    storage: S,
    catalog: C,
    media: M,
    settings: UploadSettings,
}

impl<S, C, M> UploadService<S, C, M>
where
    S: ObjectStore,
    C: VideoCatalog,
    M: MediaInspector,
{
    pub fn new(storage: S, catalog: C, media: M, settings: UploadSettings) -> Self {
        Self {
            storage,
            catalog,
            media,
            settings,
        }
    }

    /// Reject a declared body size above the ceiling before anything is read.
    pub fn check_declared_size(
        &self,
        kind: MediaKind,
        content_length: Option<u64>,
    ) -> Result<(), ValidationError> {
        let max_bytes = self.settings.limits.for_kind(kind);
        match content_length {
            Some(len) if len > max_bytes => Err(ValidationError::TooLarge { max_bytes }),
            _ => Ok(()),
        }
    }

    /// Load the record and check that `caller` owns it.
    pub async fn authorize(
        &self,
        video_id: Uuid,
        caller: Uuid,
    ) -> Result<VideoRecord, UploadError> {
        let video = self
            .catalog
            .get_video(video_id)
            .await
            .map_err(PipelineError::CatalogRead)?
            .ok_or(UploadError::VideoNotFound(video_id))?;

        if !video.is_owned_by(caller) {
            warn!(video_id = %video_id, caller = %caller, "upload by non-owner rejected");
            return Err(AuthError::NotOwner.into());
        }

        Ok(video)
    }

    /// Run an authorized upload to completion and return the updated record.
    pub async fn upload<B, E>(
        &self,
        kind: MediaKind,
        mut video: VideoRecord,
        content_type: &str,
        body: B,
    ) -> Result<VideoRecord, UploadError>
    where
        B: Stream<Item = Result<Bytes, E>>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let media_type = essence(content_type);
        if media_type.is_empty() {
            return Err(ValidationError::InvalidContentType.into());
        }
        if !kind.accepts(&media_type) {
            return Err(ValidationError::UnsupportedMediaType {
                media_type,
                accepted: kind.accepted_types(),
            }
            .into());
        }

        let mut scratch = ScratchFiles::new();
        let (staged, size) = scratch
            .stage(
                &self.settings.scratch_dir,
                &extension_for(&media_type),
                body,
                self.settings.limits.for_kind(kind),
            )
            .await?;

        let (placement, artifact) = match kind {
            MediaKind::Thumbnail => (AssetPlacement::Image, staged),
            MediaKind::Video => {
                let orientation = self.classify(&staged).await?;
                let remuxed = self.remux(&mut scratch, &staged).await?;
                (AssetPlacement::Video(orientation), remuxed)
            }
        };

        let name = AssetName::generate(&media_type)?;
        let key = object_key(placement, &name);

        self.storage
            .put(&key, &artifact, &media_type)
            .await
            .map_err(|source| PipelineError::Storage {
                key: key.clone(),
                source,
            })?;

        let url = self.settings.delivery.resolve(&key);
        kind.set_url(&mut video, url);

        if let Err(e) = self.catalog.update_video(&video).await {
            warn!(
                video_id = %video.id,
                key = %key,
                "stored object orphaned by failed catalog update"
            );
            return Err(PipelineError::CatalogUpdate(e).into());
        }

        info!(
            video_id = %video.id,
            kind = ?kind,
            key = %key,
            bytes = size,
            "upload complete"
        );
        Ok(video)
    }

    async fn classify(&self, staged: &Path) -> Result<Orientation, UploadError> {
        let metadata = self.with_timeout("probe", self.media.probe(staged)).await?;
        Ok(Orientation::classify(&metadata).map_err(MediaError::from)?)
    }

    async fn remux(
        &self,
        scratch: &mut ScratchFiles,
        staged: &Path,
    ) -> Result<PathBuf, UploadError> {
        // Tracked before the call so a partial output is removed too.
        scratch.track(remux_output_path(staged));

        let output = self
            .with_timeout("remux", self.media.remux_faststart(staged))
            .await?;
        if output != remux_output_path(staged) {
            scratch.track(output.clone());
        }

        let len = tokio::fs::metadata(&output)
            .await
            .map_err(MediaError::Io)?
            .len();
        if len == 0 {
            return Err(MediaError::EmptyOutput(output).into());
        }

        Ok(output)
    }

    async fn with_timeout<T, F>(&self, step: &'static str, fut: F) -> Result<T, UploadError>
    where
        F: Future<Output = Result<T, MediaError>>,
    {
        match self.settings.media_timeout {
            Some(timeout) => tokio::time::timeout(timeout, fut)
                .await
                .map_err(|_| PipelineError::Timeout { step, timeout })?
                .map_err(UploadError::from),
            None => fut.await.map_err(UploadError::from),
        }
    }
}
