use crate::domain::video::VideoRecord;
use async_trait::async_trait;
use std::error::Error;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Get a video record by id
    async fn get_video(
        &self,
        video_id: Uuid,
    ) -> Result<Option<VideoRecord>, Box<dyn Error + Send + Sync>>;

    /// Persist an existing record. Records are never created through this port.
    async fn update_video(&self, video: &VideoRecord) -> Result<(), Box<dyn Error + Send + Sync>>;
}
