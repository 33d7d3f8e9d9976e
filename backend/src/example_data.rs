//! Placeholder teachers and students for demo deployments.
//!
//! The roster ships as `fixtures/example-data/placeholder.json` and is
//! applied through the record gateways, so every entry passes the same
//! validation as an API submission. Rows whose email is already present are
//! left untouched, which makes seeding safe to repeat on every start.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{RecordGateway, Resource, Student, StudentFilter, Teacher, TeacherFilter};

const BUNDLED: &str = include_str!("../fixtures/example-data/placeholder.json");

/// Errors raised while seeding placeholder data.
#[derive(Debug, Error)]
pub enum ExampleDataError {
    /// The fixture is not the expected JSON shape.
    #[error("placeholder data is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    /// An entry has no usable email to deduplicate on.
    #[error("placeholder {noun} entry {index} has no email")]
    MissingEmail {
        /// Record kind, e.g. `Teacher`.
        noun: &'static str,
        /// Position in the fixture list.
        index: usize,
    },
    /// The gateway refused or failed to store an entry.
    #[error("failed to seed {noun} {email}: {message}")]
    Rejected {
        /// Record kind, e.g. `Teacher`.
        noun: &'static str,
        /// Email of the offending entry.
        email: String,
        /// Gateway error sentence.
        message: String,
    },
}

/// Request bodies for every placeholder record.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceholderData {
    /// Bodies accepted by `POST /api/teachers/create`.
    pub teachers: Vec<Value>,
    /// Bodies accepted by `POST /api/students/create`.
    pub students: Vec<Value>,
}

impl PlaceholderData {
    /// Roster compiled into the binary.
    ///
    /// # Errors
    /// Returns [`ExampleDataError::Malformed`] if the fixture does not parse.
    pub fn bundled() -> Result<Self, ExampleDataError> {
        Ok(serde_json::from_str(BUNDLED)?)
    }
}

/// Rows written by one seeding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    /// Teachers inserted.
    pub teachers: usize,
    /// Students inserted.
    pub students: usize,
    /// Entries skipped because their email already exists.
    pub skipped: usize,
}

/// Insert every placeholder teacher and student not already stored.
///
/// Teachers go first. A failing entry stops the pass; rows already written
/// stay.
///
/// # Errors
/// See [`ExampleDataError`].
pub async fn seed_example_data(
    teachers: &RecordGateway<Teacher>,
    students: &RecordGateway<Student>,
    data: &PlaceholderData,
) -> Result<SeedOutcome, ExampleDataError> {
    let (teachers_created, teachers_skipped) =
        seed_records(teachers, &data.teachers, |email| TeacherFilter {
            email: Some(email),
        })
        .await?;
    let (students_created, students_skipped) =
        seed_records(students, &data.students, |email| StudentFilter {
            email: Some(email),
            ..StudentFilter::default()
        })
        .await?;
    let outcome = SeedOutcome {
        teachers: teachers_created,
        students: students_created,
        skipped: teachers_skipped + students_skipped,
    };
    info!(
        teachers = outcome.teachers,
        students = outcome.students,
        skipped = outcome.skipped,
        "placeholder data seeded"
    );
    Ok(outcome)
}

async fn seed_records<R: Resource>(
    gateway: &RecordGateway<R>,
    entries: &[Value],
    by_email: impl Fn(String) -> R::Filter,
) -> Result<(usize, usize), ExampleDataError> {
    let mut created = 0;
    let mut skipped = 0;
    for (index, entry) in entries.iter().enumerate() {
        let email = entry
            .get("email")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or(ExampleDataError::MissingEmail {
                noun: R::NOUN,
                index,
            })?;
        let rejected = |err: crate::domain::Error| ExampleDataError::Rejected {
            noun: R::NOUN,
            email: email.to_owned(),
            message: err.message().to_owned(),
        };
        let existing = gateway
            .get_all(&by_email(email.to_owned()))
            .await
            .map_err(rejected)?;
        if existing.is_empty() {
            gateway.create(entry).await.map_err(rejected)?;
            created += 1;
        } else {
            debug!(noun = R::NOUN, email, "placeholder row already present");
            skipped += 1;
        }
    }
    Ok((created, skipped))
}
