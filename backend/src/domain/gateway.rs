//! Persistence gateway: validate, persist, and report outcomes for one record
//! kind.
//!
//! The gateway is the only place that turns repository failures into
//! user-facing errors. Internal details are logged and replaced with a
//! generic "Database error" sentence for the caller.

use std::sync::Arc;

use serde_json::Value;
use tracing::error;

use crate::domain::Error;
use crate::domain::ports::{RecordRepository, RepositoryError};
use crate::domain::resource::{
    Intent, Resource, database_message, invalid_message, not_found_message, success_message,
};

/// Successful create or update.
#[derive(Debug, Clone, PartialEq)]
pub struct Saved<R> {
    /// "Student created successfully." or similar.
    pub message: String,
    /// Record as stored.
    pub record: R,
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The row existed and is gone; carries the success message.
    Deleted(String),
    /// No row had that id; carries the not-found message.
    NotFound(String),
}

/// Validation and persistence entry point for records of kind `R`.
pub struct RecordGateway<R: Resource> {
    repository: Arc<dyn RecordRepository<R>>,
}

impl<R: Resource> Clone for RecordGateway<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: Resource> RecordGateway<R> {
    /// Create a gateway over `repository`.
    pub fn new(repository: Arc<dyn RecordRepository<R>>) -> Self {
        Self { repository }
    }

    fn map_repository_error(verb: &str, err: &RepositoryError) -> Error {
        error!(error = %err, noun = R::NOUN, verb, "record repository failed");
        Error::internal(database_message::<R>(verb))
    }

    fn validate(input: &Value, intent: Intent) -> Result<R::Draft, Error> {
        R::validate(input, intent)
            .map_err(|errors| Error::validation(invalid_message::<R>(intent, &errors), errors))
    }

    /// Validate `input` and insert it.
    ///
    /// # Errors
    /// Validation failures carry the field map; store failures are generic.
    pub async fn create(&self, input: &Value) -> Result<Saved<R>, Error> {
        let draft = Self::validate(input, Intent::Create)?;
        let record = self
            .repository
            .insert(&draft)
            .await
            .map_err(|err| Self::map_repository_error("create", &err))?;
        Ok(Saved {
            message: success_message::<R>("created"),
            record,
        })
    }

    /// Validate `input` and overwrite every column of `id`.
    ///
    /// Returns `Ok(None)` when `id` does not exist.
    ///
    /// # Errors
    /// Validation failures carry the field map; store failures are generic.
    pub async fn update(&self, id: R::Id, input: &Value) -> Result<Option<Saved<R>>, Error> {
        let draft = Self::validate(input, Intent::Update)?;
        let replaced = self
            .repository
            .replace(id, &draft)
            .await
            .map_err(|err| Self::map_repository_error("update", &err))?;
        Ok(replaced.map(|record| Saved {
            message: success_message::<R>("updated"),
            record,
        }))
    }

    /// Delete `id`. A missing row is an outcome, not an error.
    ///
    /// # Errors
    /// Store failures only.
    pub async fn delete(&self, id: R::Id) -> Result<DeleteOutcome, Error> {
        let deleted = self
            .repository
            .delete(id)
            .await
            .map_err(|err| Self::map_repository_error("delete", &err))?;
        Ok(if deleted {
            DeleteOutcome::Deleted(success_message::<R>("deleted"))
        } else {
            DeleteOutcome::NotFound(not_found_message::<R>())
        })
    }

    /// Record with `id`, if present.
    ///
    /// # Errors
    /// Store failures only.
    pub async fn get_by_id(&self, id: R::Id) -> Result<Option<R>, Error> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(|err| Self::map_repository_error("fetch", &err))
    }

    /// Every record matching `filter`.
    ///
    /// # Errors
    /// Store failures only.
    pub async fn get_all(&self, filter: &R::Filter) -> Result<Vec<R>, Error> {
        self.repository
            .list(filter)
            .await
            .map_err(|err| Self::map_repository_error("fetch", &err))
    }
}
