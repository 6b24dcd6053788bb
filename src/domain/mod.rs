//! Domain layer - Pure business logic.

pub mod asset;
pub mod delivery;
pub mod kind;
pub mod layout;
pub mod orientation;
pub mod video;
