//! Object-store key layout.
//!
//! Images live at the bucket root, videos are grouped by orientation:
//!
//! ```text
//! <identity>.<ext>
//! landscape/<identity>.<ext>
//! portrait/<identity>.<ext>
//! other/<identity>.<ext>
//! ```

use super::asset::AssetName;
use super::orientation::Orientation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetPlacement {
    Image,
    Video(Orientation),
}

pub fn object_key(placement: AssetPlacement, name: &AssetName) -> String {
    match placement {
        AssetPlacement::Image => name.to_string(),
        AssetPlacement::Video(orientation) => format!("{}/{}", orientation.as_dir(), name),
    }
}
