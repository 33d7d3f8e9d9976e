//! Embedded schema migrations applied at start-up.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::domain::ports::RepositoryError;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run all pending migrations against `database_url`.
///
/// Blocking; call from `spawn_blocking` inside the runtime.
///
/// # Errors
/// Connection failures map to [`RepositoryError::Connection`]; a failing
/// migration maps to [`RepositoryError::Query`].
pub fn run_migrations(database_url: &str) -> Result<(), RepositoryError> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| RepositoryError::connection(err.to_string()))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| RepositoryError::query(format!("migration: {err}")))?;
    Ok(())
}
