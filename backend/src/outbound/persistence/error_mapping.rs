//! Shared mapping from pool and Diesel failures to [`RepositoryError`].

use tracing::debug;

use crate::domain::ports::RepositoryError;

use super::pool::PoolError;

/// Pool failures mean no connection could be used.
pub(super) fn map_pool_error(error: PoolError) -> RepositoryError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    RepositoryError::connection(message)
}

/// Collapse Diesel failures into query or connection errors.
///
/// Constraint details are logged at debug level and kept in the message so
/// the gateway can log them before returning its generic sentence.
pub(super) fn map_diesel_error(error: diesel::result::Error) -> RepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(_, info) => RepositoryError::query(info.message().to_owned()),
        DieselError::NotFound => RepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => RepositoryError::query("database query error"),
        _ => RepositoryError::query("database error"),
    }
}

/// A stored value the domain cannot represent.
pub(super) fn corrupt_column(column: &str, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::query(format!("unreadable {column}: {err}"))
}
