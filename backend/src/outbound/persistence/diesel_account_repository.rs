//! PostgreSQL-backed user accounts.
//!
//! One adapter serves both the admin CRUD surface and the login lookup. The
//! `password_hash` column is only ever read by [`CredentialRepository`].

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CredentialRepository, RecordRepository, RepositoryError};
use crate::domain::{
    Account, AccountDraft, AccountFilter, PasswordDigest, Role, StoredCredential, UserId,
};

use super::error_mapping::{corrupt_column, map_diesel_error, map_pool_error};
use super::models::{AccountRow, AccountValues, NewAccountRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the account ports.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn values(draft: &AccountDraft) -> AccountValues<'_> {
    AccountValues {
        username: &draft.username,
        email: &draft.email,
        first_name: &draft.first_name,
        last_name: &draft.last_name,
        role: draft.role.as_str(),
        is_active: draft.is_active,
        is_email_confirmed: draft.is_email_confirmed,
    }
}

fn row_to_account(row: AccountRow) -> Result<Account, RepositoryError> {
    let role = row
        .role
        .parse::<Role>()
        .map_err(|err| corrupt_column("users.role", err))?;
    Ok(Account {
        user_id: UserId::from_uuid(row.user_id),
        username: row.username,
        email: row.email,
        first_name: row.first_name,
        last_name: row.last_name,
        role,
        is_active: row.is_active,
        is_email_confirmed: row.is_email_confirmed,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl DieselAccountRepository {
    async fn insert_row(&self, draft: &AccountDraft) -> Result<Account, RepositoryError> {
        let digest = draft
            .password
            .as_ref()
            .ok_or_else(|| RepositoryError::query("new account requires a password"))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(users::table)
            .values(&NewAccountRow {
                values: values(draft),
                password_hash: digest.as_str(),
            })
            .returning(AccountRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_account(row)
    }
}

#[async_trait]
impl RecordRepository<Account> for DieselAccountRepository {
    async fn list(&self, filter: &AccountFilter) -> Result<Vec<Account>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = users::table
            .select(AccountRow::as_select())
            .order((users::last_name.asc(), users::first_name.asc()))
            .into_boxed();
        if let Some(role) = filter.role {
            query = query.filter(users::role.eq(role.as_str()));
        }
        let rows: Vec<AccountRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_account).collect()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Account>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(*id.as_uuid())
            .select(AccountRow::as_select())
            .first::<AccountRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn insert(&self, draft: &AccountDraft) -> Result<Account, RepositoryError> {
        self.insert_row(draft).await
    }

    async fn replace(
        &self,
        id: UserId,
        draft: &AccountDraft,
    ) -> Result<Option<Account>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = users::table.find(*id.as_uuid());
        let stamp = users::updated_at.eq(Utc::now());
        let row = match &draft.password {
            Some(digest) => diesel::update(target)
                .set((
                    &values(draft),
                    users::password_hash.eq(digest.as_str()),
                    stamp,
                ))
                .returning(AccountRow::as_returning())
                .get_result(&mut conn)
                .await,
            None => diesel::update(target)
                .set((&values(draft), stamp))
                .returning(AccountRow::as_returning())
                .get_result(&mut conn)
                .await,
        }
        .optional()
        .map_err(map_diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(users::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}

#[async_trait]
impl CredentialRepository for DieselAccountRepository {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredential>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let found = users::table
            .filter(users::email.eq(email))
            .select((AccountRow::as_select(), users::password_hash))
            .first::<(AccountRow, String)>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        found
            .map(|(row, hash)| {
                Ok(StoredCredential {
                    account: row_to_account(row)?,
                    password: PasswordDigest::from_stored(hash),
                })
            })
            .transpose()
    }

    async fn find_account(&self, id: UserId) -> Result<Option<Account>, RepositoryError> {
        RecordRepository::<Account>::find_by_id(self, id).await
    }

    async fn create_account(&self, draft: &AccountDraft) -> Result<(), RepositoryError> {
        self.insert_row(draft).await.map(|_| ())
    }
}
