//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to authenticate credentials without knowing the
//! backing store, so HTTP handler tests can substitute a double.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Principal, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated principal.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Principal, Error>;

    /// Current principal for a signed-in account, read fresh from the store.
    ///
    /// `None` once the account is deleted or deactivated.
    async fn resolve(&self, user_id: UserId) -> Result<Option<Principal>, Error>;
}
