use crate::application::error::AuthError;
use uuid::Uuid;

/// Resolves a bearer credential to the caller's user id.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityProvider: Send + Sync {
    fn authenticate(&self, token: &str) -> Result<Uuid, AuthError>;
}
