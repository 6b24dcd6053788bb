//! Bearer credential validation.

pub mod jwt;

pub use jwt::JwtIdentity;
