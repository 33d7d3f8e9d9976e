//! Driven port for reading login credentials.

use async_trait::async_trait;

use crate::domain::{Account, AccountDraft, StoredCredential, UserId};

use super::RepositoryError;

/// Account lookups needed by authentication and start-up bootstrap.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Account with `email`, including inactive ones.
    async fn find_by_email(&self, email: &str)
    -> Result<Option<StoredCredential>, RepositoryError>;

    /// Account with `id`, including inactive ones.
    async fn find_account(&self, id: UserId) -> Result<Option<Account>, RepositoryError>;

    /// Store a new account.
    async fn create_account(&self, draft: &AccountDraft) -> Result<(), RepositoryError>;
}
