//! Asset identity generation.
//!
//! Every upload gets a fresh, unguessable name: 32 bytes from the OS random
//! source encoded as URL-safe base64 without padding, followed by an extension
//! taken from the media type.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;

/// Number of random bytes behind each asset identity.
pub const IDENTITY_BYTES: usize = 32;

/// Extension used when the media type cannot be parsed.
pub const FALLBACK_EXTENSION: &str = ".bin";

/// The OS random source could not be read.
#[derive(Debug, thiserror::Error)]
#[error("secure random source unavailable: {0}")]
pub struct EntropyError(#[from] rand::Error);

/// Random identity plus extension, e.g. `Zm9v...YmFy.mp4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetName {
    identity: String,
    extension: String,
}

impl AssetName {
    /// Generates a new name for an asset of the given media type.
    ///
    /// A malformed or unknown media type yields a `.bin` extension rather than
    /// an error. Failure to read the OS random source is an error: there is no
    /// weaker fallback generator.
    pub fn generate(media_type: &str) -> Result<Self, EntropyError> {
        let mut bytes = [0u8; IDENTITY_BYTES];
        OsRng.try_fill_bytes(&mut bytes)?;

        Ok(Self {
            identity: URL_SAFE_NO_PAD.encode(bytes),
            extension: extension_for(media_type),
        })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.identity, self.extension)
    }
}

/// Strips parameters from a content-type header value and lower-cases it:
/// `"Video/MP4; codecs=avc1"` becomes `"video/mp4"`.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Maps `type/subtype` to `.subtype`; anything else maps to `.bin`.
pub fn extension_for(media_type: &str) -> String {
    let media_type = essence(media_type);
    let mut parts = media_type.split('/');

    match (parts.next(), parts.next(), parts.next()) {
        (Some(kind), Some(subtype), None) if !kind.is_empty() && !subtype.is_empty() => {
            format!(".{}", subtype)
        }
        _ => FALLBACK_EXTENSION.to_string(),
    }
}
