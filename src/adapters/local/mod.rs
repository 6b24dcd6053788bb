//! Local adapters for monolith deployment.

pub mod fs;
pub mod redis;

pub use fs::FsObjectStore;
pub use redis::RedisPool;
