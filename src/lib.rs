//! Tubely - media ingestion for a video hosting backend
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (asset names, orientation, object keys, delivery URLs)
//! - ports/: Trait definitions (object store, catalog, media inspector, identity)
//! - adapters/: Concrete implementations (HTTP, JWT, ffmpeg, filesystem, Redis, AWS)
//! - application/: Upload orchestration
//! - config: Environment configuration
//!
//! # Features
//! - `local`: Local/monolith deployment (filesystem object store, Redis catalog)
//! - `aws`: AWS deployment (S3 object store, DynamoDB catalog)
//! - `native`: In-process media inspection through ffmpeg-next
//! - `full`: All features

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::upload::{UploadService, UploadSettings};
pub use config::AppConfig;

#[cfg(feature = "aws")]
pub use config::AwsConfig;

#[cfg(feature = "local")]
pub use config::LocalConfig;
