//! In-process record store.
//!
//! [`MemoryStore`] keeps all five tables behind one mutex and emulates the
//! relational constraints the PostgreSQL schema declares: unique emails,
//! foreign keys between courses, enrollments, students and teachers, and
//! `ON DELETE RESTRICT` for teachers still referenced by courses or
//! enrollments. It backs the server when no database URL is configured and
//! is the default store for HTTP tests.

mod records;

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{CredentialRepository, RepositoryError};
use crate::domain::{
    Account, AccountDraft, CourseDraft, CourseId, EnrollmentDraft, EnrollmentId, PasswordDigest,
    Student, StoredCredential, Teacher, UserId,
};

#[derive(Debug, Clone)]
struct CourseRow {
    id: CourseId,
    draft: CourseDraft,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct EnrollmentRow {
    id: EnrollmentId,
    draft: EnrollmentDraft,
}

#[derive(Debug, Clone)]
struct AccountRow {
    account: Account,
    password: PasswordDigest,
}

#[derive(Debug, Default)]
struct Tables {
    students: Vec<Student>,
    teachers: Vec<Teacher>,
    courses: Vec<CourseRow>,
    enrollments: Vec<EnrollmentRow>,
    users: Vec<AccountRow>,
}

/// Process-local implementation of every record port.
#[derive(Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl MemoryStore {
    /// Empty store stamping rows with `clock`.
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::connection("memory store lock poisoned"))
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    fn insert_account(
        tables: &mut Tables,
        draft: &AccountDraft,
        now: DateTime<Utc>,
    ) -> Result<Account, RepositoryError> {
        let Some(password) = draft.password.clone() else {
            return Err(RepositoryError::query(
                "null value in column \"password_hash\" violates not-null constraint",
            ));
        };
        unique_email(
            tables.users.iter().map(|row| &row.account.email),
            &draft.email,
            "users",
        )?;
        let account = account_from_draft(UserId::random(), draft, now, now);
        tables.users.push(AccountRow {
            account: account.clone(),
            password,
        });
        Ok(account)
    }
}

fn account_from_draft(
    user_id: UserId,
    draft: &AccountDraft,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Account {
    Account {
        user_id,
        username: draft.username.clone(),
        email: draft.email.clone(),
        first_name: draft.first_name.clone(),
        last_name: draft.last_name.clone(),
        role: draft.role,
        is_active: draft.is_active,
        is_email_confirmed: draft.is_email_confirmed,
        created_at,
        updated_at,
    }
}

fn unique_email<'a>(
    mut existing: impl Iterator<Item = &'a String>,
    email: &str,
    table: &str,
) -> Result<(), RepositoryError> {
    if existing.any(|current| current == email) {
        return Err(RepositoryError::query(format!(
            "duplicate key value violates unique constraint \"{table}_email_key\""
        )));
    }
    Ok(())
}

fn foreign_key_violation(table: &str, column: &str) -> RepositoryError {
    RepositoryError::query(format!(
        "insert or update on table \"{table}\" violates foreign key constraint on \"{column}\""
    ))
}

#[async_trait]
impl CredentialRepository for MemoryStore {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredential>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .iter()
            .find(|row| row.account.email == email)
            .map(|row| StoredCredential {
                account: row.account.clone(),
                password: row.password.clone(),
            }))
    }

    async fn find_account(&self, id: UserId) -> Result<Option<Account>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .iter()
            .find(|row| row.account.user_id == id)
            .map(|row| row.account.clone()))
    }

    async fn create_account(&self, draft: &AccountDraft) -> Result<(), RepositoryError> {
        let now = self.now();
        let mut tables = self.lock()?;
        Self::insert_account(&mut tables, draft, now).map(|_| ())
    }
}
