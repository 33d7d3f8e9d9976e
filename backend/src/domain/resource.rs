//! Common contract shared by every managed record kind.
//!
//! Students, teachers, courses, enrollments and user accounts all follow the
//! same lifecycle: validate an untyped submission into a draft, persist the
//! draft, and read records back in a fixed order. [`Resource`] captures the
//! per-kind pieces of that lifecycle so a single gateway and a single set of
//! HTTP helpers can serve all five.

use std::fmt::{Debug, Display};
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::domain::{FieldErrors, Principal};

/// Whether a submission creates a record or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// `POST .../create`.
    Create,
    /// `PUT .../{id}`; every column is rewritten.
    Update,
}

impl Intent {
    /// Verb used in user-facing messages.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

/// A record kind managed through the gateway.
pub trait Resource: Clone + Debug + Serialize + Send + Sync + 'static {
    /// Typed surrogate key.
    type Id: Copy + Eq + Debug + Display + FromStr + Send + Sync + 'static;
    /// Validated field set accepted by inserts and replacements.
    type Draft: Clone + Debug + Send + Sync + 'static;
    /// Equality filters accepted by list queries.
    type Filter: Clone + Debug + Default + PartialEq + Send + Sync + 'static;

    /// Capitalised singular name, e.g. `Student`.
    const NOUN: &'static str;
    /// JSON key wrapping the record in create/update responses.
    const KEY: &'static str;

    /// Surrogate key of this record.
    fn id(&self) -> Self::Id;

    /// Validate an untyped submission.
    ///
    /// # Errors
    /// Returns every failing field at once.
    fn validate(input: &Value, intent: Intent) -> Result<Self::Draft, FieldErrors>;

    /// Filter that replaces caller-supplied filters for `principal`.
    ///
    /// `None` means the principal sees the whole collection and may filter it
    /// freely.
    fn scope_for(principal: &Principal) -> Option<Self::Filter> {
        let _ = principal;
        None
    }
}

/// `Student`, `Teacher`, ... lower-cased for sentence bodies.
fn noun_lower<R: Resource>() -> String {
    R::NOUN.to_lowercase()
}

/// "Student created successfully." and friends.
#[must_use]
pub fn success_message<R: Resource>(verb_past: &str) -> String {
    format!("{} {verb_past} successfully.", R::NOUN)
}

/// "Student not found."
#[must_use]
pub fn not_found_message<R: Resource>() -> String {
    format!("{} not found.", R::NOUN)
}

/// "Missing or invalid fields. Could not create student."
///
/// A body that is not an object gets the "Invalid input data." variant.
#[must_use]
pub fn invalid_message<R: Resource>(intent: Intent, errors: &FieldErrors) -> String {
    let lead = if errors.contains(crate::domain::validation::BODY_FIELD) {
        "Invalid input data."
    } else {
        "Missing or invalid fields."
    };
    format!("{lead} Could not {} {}.", intent.verb(), noun_lower::<R>())
}

/// "Database error: Could not delete student."
#[must_use]
pub fn database_message<R: Resource>(verb: &str) -> String {
    format!("Database error: Could not {verb} {}.", noun_lower::<R>())
}
