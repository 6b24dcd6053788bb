//! Redis adapter for local deployment.
//!
//! Provides a Redis-backed `VideoCatalog`: each record is stored as JSON under
//! `tubely:video:<id>`.

mod catalog;
mod error;
mod pool;

pub use error::CatalogError;
pub use pool::RedisPool;

/// Redis key constants
const VIDEO_RECORD_PREFIX: &str = "tubely:video:";
