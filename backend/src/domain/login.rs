//! Credential-backed login and start-up administrator bootstrap.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::domain::ports::{CredentialRepository, LoginService, RepositoryError};
use crate::domain::{
    Account, AccountDraft, Error, LoginCredentials, PasswordDigest, Principal, Role, UserId,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials.";

fn principal_of(account: Account) -> Principal {
    Principal {
        user_id: account.user_id,
        role: account.role,
        email: account.email,
    }
}

fn map_repository_error(err: &RepositoryError) -> Error {
    error!(error = %err, "credential lookup failed");
    match err {
        RepositoryError::Connection { .. } => {
            Error::service_unavailable("Database error: Could not sign in.")
        }
        RepositoryError::Query { .. } => Error::internal("Database error: Could not sign in."),
    }
}

/// [`LoginService`] that checks Argon2 digests held by a
/// [`CredentialRepository`].
#[derive(Clone)]
pub struct CredentialLoginService {
    credentials: Arc<dyn CredentialRepository>,
}

impl CredentialLoginService {
    /// Create a service over `credentials`.
    pub fn new(credentials: Arc<dyn CredentialRepository>) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl LoginService for CredentialLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Principal, Error> {
        let stored = self
            .credentials
            .find_by_email(credentials.email())
            .await
            .map_err(|err| map_repository_error(&err))?;

        match stored {
            Some(stored)
                if stored.account.is_active && stored.password.verify(credentials.password()) =>
            {
                Ok(principal_of(stored.account))
            }
            _ => Err(Error::unauthorized(INVALID_CREDENTIALS)),
        }
    }

    async fn resolve(&self, user_id: UserId) -> Result<Option<Principal>, Error> {
        let account = self
            .credentials
            .find_account(user_id)
            .await
            .map_err(|err| map_repository_error(&err))?;
        Ok(account
            .filter(|account| account.is_active)
            .map(principal_of))
    }
}

/// Create an active administrator when no account uses `email` yet.
///
/// Returns `true` when an account was created.
///
/// # Errors
/// Store failures, or an unusable password.
pub async fn ensure_admin_account(
    credentials: &dyn CredentialRepository,
    email: &str,
    password: &str,
) -> Result<bool, Error> {
    let existing = credentials
        .find_by_email(email)
        .await
        .map_err(|err| map_repository_error(&err))?;
    if let Some(existing) = existing {
        if existing.account.role != Role::Admin {
            warn!(email, role = %existing.account.role, "bootstrap email belongs to a non-admin account");
        }
        return Ok(false);
    }

    let digest = PasswordDigest::hash(password).map_err(|err| Error::internal(err.to_string()))?;
    let draft = AccountDraft {
        username: "admin".to_owned(),
        email: email.to_owned(),
        first_name: "School".to_owned(),
        last_name: "Administrator".to_owned(),
        role: Role::Admin,
        is_active: true,
        is_email_confirmed: true,
        password: Some(digest),
    };
    credentials.create_account(&draft).await.map_err(|err| {
        error!(error = %err, "bootstrap admin insert failed");
        Error::internal("Database error: Could not create user.")
    })?;
    info!(email, "bootstrap administrator created");
    Ok(true)
}
