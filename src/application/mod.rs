//! Application layer - The upload pipeline, generic over the ports it drives.

pub mod error;
pub mod scratch;
pub mod upload;
