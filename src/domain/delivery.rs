//! Delivery URL resolution.
//!
//! One mode is chosen per process. URLs are written into catalog records at
//! upload time, so switching modes only affects future uploads.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Served by this process from the mirrored assets directory.
    Local { host: String, port: String },
    /// Straight from the S3 bucket.
    Direct { bucket: String, region: String },
    /// Through a CDN distribution whose origin is the bucket.
    Cdn { base: String },
}

impl DeliveryMode {
    pub fn resolve(&self, key: &str) -> String {
        match self {
            DeliveryMode::Local { host, port } => {
                format!("http://{}:{}/assets/{}", host, port, key)
            }
            DeliveryMode::Direct { bucket, region } => {
                format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
            }
            DeliveryMode::Cdn { base } => format!("{}/{}", base.trim_end_matches('/'), key),
        }
    }

    /// Whether URLs point at this process's `/assets` route.
    pub fn is_local(&self) -> bool {
        matches!(self, DeliveryMode::Local { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            DeliveryMode::Local { .. } => "local",
            DeliveryMode::Direct { .. } => "s3",
            DeliveryMode::Cdn { .. } => "cdn",
        }
    }
}
