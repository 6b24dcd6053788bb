//! AWS adapters: S3 object store, DynamoDB catalog.

pub mod dynamodb;
pub mod s3;

pub use dynamodb::DynamoCatalog;
pub use s3::S3ObjectStore;
