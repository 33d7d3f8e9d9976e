//! Enrollments link a student to a course and its teacher.
//!
//! Writes take the three foreign keys plus progress columns; reads return the
//! joined [`EnrollmentView`] so lists can be rendered without further lookups.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::resource::{Intent, Resource};
use crate::domain::{
    CourseId, EnrollmentId, FieldErrors, Principal, Role, StudentId, Submission, TeacherId,
};

/// Width of `enrollments.grade`.
const GRADE_MAX: usize = 32;

/// Progress of a student through a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CompletionStatus {
    /// Registered but not started.
    Enrolled,
    /// Attending.
    #[serde(rename = "In-Progress")]
    InProgress,
    /// Finished.
    Completed,
    /// Left before finishing.
    Dropped,
}

impl CompletionStatus {
    /// Stored and serialised label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enrolled => "Enrolled",
            Self::InProgress => "In-Progress",
            Self::Completed => "Completed",
            Self::Dropped => "Dropped",
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for labels outside the fixed status set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown completion status: {0}")]
pub struct UnknownCompletionStatus(pub String);

impl FromStr for CompletionStatus {
    type Err = UnknownCompletionStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Enrolled" => Ok(Self::Enrolled),
            "In-Progress" => Ok(Self::InProgress),
            "Completed" => Ok(Self::Completed),
            "Dropped" => Ok(Self::Dropped),
            other => Err(UnknownCompletionStatus(other.to_owned())),
        }
    }
}

/// Editable enrollment columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentDraft {
    /// Enrolled student.
    #[schema(value_type = String, format = Uuid)]
    pub student_id: StudentId,
    /// Course enrolled in.
    #[schema(value_type = String, format = Uuid)]
    pub course_id: CourseId,
    /// Teacher responsible for this enrollment.
    #[schema(value_type = String, format = Uuid)]
    pub teacher_id: TeacherId,
    /// Date of enrollment.
    pub enrollment_date: NaiveDate,
    /// Current progress.
    pub completion_status: CompletionStatus,
    /// Final or interim grade.
    pub grade: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl EnrollmentDraft {
    /// Validate an untyped enrollment submission.
    ///
    /// Foreign keys are only checked for shape here; the store rejects ids
    /// that do not exist.
    ///
    /// # Errors
    /// Returns every failing field.
    pub fn validate(input: &Value) -> Result<Self, FieldErrors> {
        let mut form = Submission::new(input)?;
        let student_id = form.uuid("student_id", "Student must be selected.");
        let course_id = form.uuid("course_id", "Course must be selected.");
        let teacher_id = form.uuid("teacher_id", "Teacher must be selected.");
        let enrollment_date = form.required_date(
            "enrollment_date",
            "Enrollment date must be a valid date (YYYY-MM-DD).",
        );
        let completion_status = form.one_of::<CompletionStatus>(
            "completion_status",
            "Completion status must be one of Enrolled, In-Progress, Completed, Dropped.",
        );
        let grade = form.optional_string("grade");
        let notes = form.optional_string("notes");
        form.max_chars("grade", GRADE_MAX);

        match (
            student_id,
            course_id,
            teacher_id,
            enrollment_date,
            completion_status,
        ) {
            (
                Some(student_id),
                Some(course_id),
                Some(teacher_id),
                Some(enrollment_date),
                Some(completion_status),
            ) if form.is_clean() => Ok(Self {
                student_id: StudentId::from_uuid(student_id),
                course_id: CourseId::from_uuid(course_id),
                teacher_id: TeacherId::from_uuid(teacher_id),
                enrollment_date,
                completion_status,
                grade,
                notes,
            }),
            _ => Err(form.into_errors()),
        }
    }
}

/// Joined read model of one enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentView {
    #[schema(value_type = String, format = Uuid)]
    pub enrollment_id: EnrollmentId,
    pub enrollment_date: NaiveDate,
    pub completion_status: CompletionStatus,
    pub grade: Option<String>,
    pub notes: Option<String>,
    #[schema(value_type = String, format = Uuid)]
    pub student_id: StudentId,
    pub student_first_name: String,
    pub student_last_name: String,
    pub student_email: String,
    #[schema(value_type = String, format = Uuid)]
    pub course_id: CourseId,
    pub course_title: String,
    pub course_code: String,
    pub course_description: String,
    pub course_credits: i32,
    pub course_duration: String,
    pub course_difficulty_level: String,
    #[schema(value_type = String, format = Uuid)]
    pub teacher_id: TeacherId,
    pub teacher_first_name: String,
    pub teacher_last_name: String,
    pub teacher_email: String,
    pub teacher_subject: String,
}

/// Equality filters for enrollment lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentFilter {
    pub student_id: Option<StudentId>,
    pub teacher_id: Option<TeacherId>,
    pub student_email: Option<String>,
    pub teacher_email: Option<String>,
}

impl Resource for EnrollmentView {
    type Id = EnrollmentId;
    type Draft = EnrollmentDraft;
    type Filter = EnrollmentFilter;

    const NOUN: &'static str = "Enrollment";
    const KEY: &'static str = "enrollment";

    fn id(&self) -> EnrollmentId {
        self.enrollment_id
    }

    fn validate(input: &Value, _intent: Intent) -> Result<EnrollmentDraft, FieldErrors> {
        EnrollmentDraft::validate(input)
    }

    fn scope_for(principal: &Principal) -> Option<EnrollmentFilter> {
        match principal.role {
            Role::Admin => None,
            Role::Student => Some(EnrollmentFilter {
                student_email: Some(principal.email.clone()),
                ..EnrollmentFilter::default()
            }),
            Role::Teacher => Some(EnrollmentFilter {
                teacher_email: Some(principal.email.clone()),
                ..EnrollmentFilter::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("Enrolled", Some(CompletionStatus::Enrolled))]
    #[case("In-Progress", Some(CompletionStatus::InProgress))]
    #[case("in-progress", None)]
    #[case("Paused", None)]
    fn status_labels(#[case] raw: &str, #[case] expected: Option<CompletionStatus>) {
        assert_eq!(raw.parse::<CompletionStatus>().ok(), expected);
    }

    #[rstest]
    fn status_serialises_with_hyphen() {
        let json = serde_json::to_value(CompletionStatus::InProgress).expect("serialise");
        assert_eq!(json, json!("In-Progress"));
    }

    #[rstest]
    fn rejects_unknown_status_and_malformed_keys() {
        let errors = EnrollmentDraft::validate(&json!({
            "student_id": "not-a-uuid",
            "course_id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "teacher_id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "enrollment_date": "2024-09-01",
            "completion_status": "Paused",
        }))
        .expect_err("invalid");
        assert!(errors.contains("student_id"));
        assert!(errors.contains("completion_status"));
        assert!(!errors.contains("enrollment_date"));
    }
}
