//! Orientation classification of a probed container.

use serde::Deserialize;
use std::fmt;

/// Coarse aspect-ratio category, also used as the storage directory for videos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
}

/// Stream list as reported by the container inspection step.
///
/// The field names follow `ffprobe -print_format json -show_streams`, so the
/// subprocess output deserializes directly into this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProbeMetadata {
    pub streams: Vec<StreamInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StreamInfo {
    #[serde(default)]
    pub codec_type: Option<String>,
    #[serde(default)]
    pub width: Option<u64>,
    #[serde(default)]
    pub height: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    #[error("no video stream found")]
    NoVideoStream,
    #[error("video stream {index} has no dimensions")]
    MissingDimensions { index: usize },
}

impl ProbeMetadata {
    /// Width and height of the first video stream.
    pub fn video_dimensions(&self) -> Result<(u64, u64), ClassifyError> {
        let (index, stream) = self
            .streams
            .iter()
            .enumerate()
            .find(|(_, s)| s.codec_type.as_deref() == Some("video"))
            .ok_or(ClassifyError::NoVideoStream)?;

        match (stream.width, stream.height) {
            (Some(width), Some(height)) => Ok((width, height)),
            _ => Err(ClassifyError::MissingDimensions { index }),
        }
    }
}

impl Orientation {
    /// 16:9 is landscape, 9:16 is portrait, everything else is other.
    /// Integer division matches the rounding of the reported dimensions.
    pub fn from_dimensions(width: u64, height: u64) -> Self {
        if width == 16 * height / 9 {
            Orientation::Landscape
        } else if height == 16 * width / 9 {
            Orientation::Portrait
        } else {
            Orientation::Other
        }
    }

    pub fn classify(metadata: &ProbeMetadata) -> Result<Self, ClassifyError> {
        let (width, height) = metadata.video_dimensions()?;
        Ok(Self::from_dimensions(width, height))
    }

    pub fn as_dir(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Other => "other",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_dir())
    }
}
