//! Redis VideoCatalog implementation.

use super::error::CatalogError;
use super::pool::RedisPool;
use super::VIDEO_RECORD_PREFIX;
use crate::domain::video::VideoRecord;
use crate::ports::catalog::VideoCatalog;
use async_trait::async_trait;
use chrono::Utc;
use deadpool_redis::redis::{self, AsyncCommands};
use uuid::Uuid;

fn record_key(video_id: Uuid) -> String {
    format!("{}{}", VIDEO_RECORD_PREFIX, video_id)
}

#[async_trait]
impl VideoCatalog for RedisPool {
    async fn get_video(
        &self,
        video_id: Uuid,
    ) -> Result<Option<VideoRecord>, Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.pool.get().await.map_err(CatalogError::from)?;
        let json: Option<String> = conn
            .get(record_key(video_id))
            .await
            .map_err(CatalogError::from)?;
        match json {
            Some(data) => Ok(Some(
                serde_json::from_str(&data).map_err(CatalogError::from)?,
            )),
            None => Ok(None),
        }
    }

    async fn update_video(
        &self,
        video: &VideoRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.pool.get().await.map_err(CatalogError::from)?;

        let mut stamped = video.clone();
        stamped.updated_at = Utc::now();
        let json = serde_json::to_string(&stamped).map_err(CatalogError::from)?;

        // XX: only overwrite, never create
        let reply: Option<String> = redis::cmd("SET")
            .arg(record_key(video.id))
            .arg(json)
            .arg("XX")
            .query_async(&mut conn)
            .await
            .map_err(CatalogError::from)?;

        match reply {
            Some(_) => Ok(()),
            None => Err(CatalogError::Missing(video.id).into()),
        }
    }
}
