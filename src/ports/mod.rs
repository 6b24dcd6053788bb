//! Ports - Trait definitions for the collaborators the upload pipeline consumes.

pub mod catalog;
pub mod identity;
pub mod media;
pub mod storage;
