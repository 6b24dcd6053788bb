//! Adapters - Concrete implementations of ports, plus the HTTP inbound adapter.

pub mod auth;
pub mod http;
pub mod media;

#[cfg(feature = "aws")]
pub mod aws;

#[cfg(feature = "local")]
pub mod local;
