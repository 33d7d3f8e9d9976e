//! Course records.
//!
//! A course names its instructor through `teacher_id`. The instructor's email
//! and name are resolved from the teachers table on every read and are never
//! accepted as input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::resource::{Intent, Resource};
use crate::domain::{CourseId, FieldErrors, Principal, Role, Submission, TeacherId};

/// `VARCHAR` widths of the `courses` columns.
const COLUMN_LIMITS: [(&str, usize); 4] = [
    ("title", 255),
    ("course_code", 64),
    ("duration", 255),
    ("difficulty_level", 64),
];

/// Editable course columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CourseDraft {
    /// Display title.
    pub title: String,
    /// Catalogue code, e.g. `MATH-101`.
    pub course_code: String,
    /// Short description.
    pub description: String,
    /// Credit value; at least 1.
    pub credits: i32,
    /// Free-form duration, e.g. `"12 weeks"`.
    pub duration: String,
    /// Free-form difficulty label.
    pub difficulty_level: String,
    /// Instructor.
    #[schema(value_type = String, format = Uuid)]
    pub teacher_id: TeacherId,
}

impl CourseDraft {
    /// Validate an untyped course submission.
    ///
    /// # Errors
    /// Returns every failing field.
    ///
    /// # Examples
    /// ```
    /// use schoolapp::domain::CourseDraft;
    /// use serde_json::json;
    ///
    /// let errors = CourseDraft::validate(&json!({ "credits": 2.5 })).unwrap_err();
    /// assert_eq!(errors.messages("credits"), ["Credits must be at least 1."]);
    /// ```
    pub fn validate(input: &Value) -> Result<Self, FieldErrors> {
        let mut form = Submission::new(input)?;
        let title = form.required_string("title", "Title cannot be empty.");
        let course_code = form.required_string("course_code", "Course Code cannot be empty.");
        let description = form.required_string("description", "Description cannot be empty.");
        let credits = form.integer_at_least("credits", 1, "Credits must be at least 1.");
        let duration = form.required_string("duration", "Duration cannot be empty.");
        let difficulty_level =
            form.required_string("difficulty_level", "Difficulty Level cannot be empty.");
        let teacher_id = form.uuid("teacher_id", "Teacher must be selected.");
        form.max_chars_each(&COLUMN_LIMITS);

        match (
            title,
            course_code,
            description,
            credits,
            duration,
            difficulty_level,
            teacher_id,
        ) {
            (
                Some(title),
                Some(course_code),
                Some(description),
                Some(credits),
                Some(duration),
                Some(difficulty_level),
                Some(teacher_id),
            ) if form.is_clean() => Ok(Self {
                title,
                course_code,
                description,
                credits,
                duration,
                difficulty_level,
                teacher_id: TeacherId::from_uuid(teacher_id),
            }),
            _ => Err(form.into_errors()),
        }
    }
}

/// Stored course with its instructor resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Course {
    /// Surrogate key.
    #[schema(value_type = String, format = Uuid)]
    pub id: CourseId,
    /// Editable columns.
    #[serde(flatten)]
    pub draft: CourseDraft,
    /// Instructor email, read from `teachers`.
    pub teacher_email: String,
    /// Instructor given name, read from `teachers`.
    pub teacher_firstname: String,
    /// Instructor family name, read from `teachers`.
    pub teacher_lastname: String,
    /// Insert timestamp.
    pub created_at: DateTime<Utc>,
    /// Last replacement timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Equality filters for course lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    /// Courses taught by this teacher.
    pub teacher_id: Option<TeacherId>,
    /// Courses taught by the teacher with this email.
    pub teacher_email: Option<String>,
}

impl Resource for Course {
    type Id = CourseId;
    type Draft = CourseDraft;
    type Filter = CourseFilter;

    const NOUN: &'static str = "Course";
    const KEY: &'static str = "course";

    fn id(&self) -> CourseId {
        self.id
    }

    fn validate(input: &Value, _intent: Intent) -> Result<CourseDraft, FieldErrors> {
        CourseDraft::validate(input)
    }

    fn scope_for(principal: &Principal) -> Option<CourseFilter> {
        (principal.role != Role::Admin).then(|| CourseFilter {
            teacher_email: Some(principal.email.clone()),
            ..CourseFilter::default()
        })
    }
}
