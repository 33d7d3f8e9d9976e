//! Driven port for storing and reading managed records.
//!
//! One trait serves every record kind through [`Resource`]. Adapters own the
//! sort order and filter semantics of each kind; the gateway only sees rows.

use async_trait::async_trait;

use crate::domain::resource::Resource;

/// Persistence errors raised by record repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// Repository connection could not be established.
    #[error("record repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("record repository query failed: {message}")]
    Query { message: String },
}

impl RepositoryError {
    /// The store could not be reached.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// A statement failed.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Storage for one record kind.
#[async_trait]
pub trait RecordRepository<R: Resource>: Send + Sync {
    /// Every record matching `filter`, in the kind's fixed order.
    async fn list(&self, filter: &R::Filter) -> Result<Vec<R>, RepositoryError>;

    /// Record with `id`, if present.
    async fn find_by_id(&self, id: R::Id) -> Result<Option<R>, RepositoryError>;

    /// Insert `draft` and return the stored record.
    async fn insert(&self, draft: &R::Draft) -> Result<R, RepositoryError>;

    /// Overwrite every column of `id`; `None` when no row matched.
    async fn replace(&self, id: R::Id, draft: &R::Draft) -> Result<Option<R>, RepositoryError>;

    /// Delete `id`; `false` when no row matched.
    async fn delete(&self, id: R::Id) -> Result<bool, RepositoryError>;
}
