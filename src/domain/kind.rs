use super::video::VideoRecord;

/// What an upload endpoint accepts and which record field it fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Thumbnail,
    Video,
}

const THUMBNAIL_TYPES: &[&str] = &["image/jpeg", "image/png"];
const VIDEO_TYPES: &[&str] = &["video/mp4"];

impl MediaKind {
    /// Multipart part carrying the file.
    pub fn field_name(&self) -> &'static str {
        match self {
            MediaKind::Thumbnail => "thumbnail",
            MediaKind::Video => "video",
        }
    }

    pub fn accepted_types(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Thumbnail => THUMBNAIL_TYPES,
            MediaKind::Video => VIDEO_TYPES,
        }
    }

    pub fn accepts(&self, media_type: &str) -> bool {
        self.accepted_types().contains(&media_type)
    }

    pub fn set_url(&self, record: &mut VideoRecord, url: String) {
        match self {
            MediaKind::Thumbnail => record.thumbnail_url = Some(url),
            MediaKind::Video => record.video_url = Some(url),
        }
    }
}
