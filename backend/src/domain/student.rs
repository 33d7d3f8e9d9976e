//! Student records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::resource::{Intent, Resource};
use crate::domain::{FieldErrors, Principal, Role, StudentId, Submission, TeacherId};

const DATE_HINT: &str = "must be a valid date (YYYY-MM-DD).";

/// `VARCHAR` widths of the `students` columns.
const COLUMN_LIMITS: [(&str, usize); 4] = [
    ("firstname", 255),
    ("lastname", 255),
    ("grade", 255),
    ("phonenumber", 50),
];

/// Editable student columns.
///
/// Optional columns omitted from a submission are stored as `NULL`; an update
/// rewrites every column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StudentProfile {
    /// Given name.
    pub firstname: String,
    /// Family name.
    pub lastname: String,
    /// Contact email; also links the student to a login account.
    pub email: String,
    /// School year or class label, e.g. `"10"`.
    pub grade: String,
    /// Date of birth.
    pub dateofbirth: Option<NaiveDate>,
    /// Postal address.
    pub address: Option<String>,
    /// Phone number.
    pub phonenumber: Option<String>,
    /// Date the student joined the school.
    pub enrollmentdate: Option<NaiveDate>,
    /// Parent or guardian contact details.
    pub parentscontact: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Avatar image URL.
    pub avatarurl: Option<String>,
}

impl StudentProfile {
    /// Validate an untyped student submission.
    ///
    /// # Errors
    /// Returns every failing field.
    ///
    /// # Examples
    /// ```
    /// use schoolapp::domain::StudentProfile;
    /// use serde_json::json;
    ///
    /// let profile = StudentProfile::validate(&json!({
    ///     "firstname": "Ann", "lastname": "Lee", "email": "ann@x.com", "grade": "10"
    /// })).unwrap();
    /// assert_eq!(profile.address, None);
    /// ```
    pub fn validate(input: &Value) -> Result<Self, FieldErrors> {
        let mut form = Submission::new(input)?;
        let firstname = form.required_string("firstname", "First name cannot be empty.");
        let lastname = form.required_string("lastname", "Last name cannot be empty.");
        let email = form.email("email", "Invalid email address.");
        let grade = form.required_string("grade", "Grade cannot be empty.");
        let dateofbirth = form.optional_date("dateofbirth", &format!("Date of birth {DATE_HINT}"));
        let address = form.optional_string("address");
        let phonenumber = form.optional_string("phonenumber");
        let enrollmentdate =
            form.optional_date("enrollmentdate", &format!("Enrollment date {DATE_HINT}"));
        let parentscontact = form.optional_string("parentscontact");
        let notes = form.optional_string("notes");
        let avatarurl = form.optional_string("avatarurl");
        form.max_chars_each(&COLUMN_LIMITS);

        match (firstname, lastname, email, grade) {
            (Some(firstname), Some(lastname), Some(email), Some(grade)) if form.is_clean() => {
                Ok(Self {
                    firstname,
                    lastname,
                    email,
                    grade,
                    dateofbirth,
                    address,
                    phonenumber,
                    enrollmentdate,
                    parentscontact,
                    notes,
                    avatarurl,
                })
            }
            _ => Err(form.into_errors()),
        }
    }
}

/// Stored student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Student {
    /// Surrogate key.
    #[schema(value_type = String, format = Uuid)]
    pub id: StudentId,
    /// Editable columns.
    #[serde(flatten)]
    pub profile: StudentProfile,
    /// Insert timestamp.
    pub created_at: DateTime<Utc>,
    /// Last replacement timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Equality filters for student lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    /// Exact student email.
    pub email: Option<String>,
    /// Students enrolled in any course taught by this teacher.
    pub teacher_id: Option<TeacherId>,
    /// Same as `teacher_id`, keyed by the teacher's email.
    pub teacher_email: Option<String>,
}

impl Resource for Student {
    type Id = StudentId;
    type Draft = StudentProfile;
    type Filter = StudentFilter;

    const NOUN: &'static str = "Student";
    const KEY: &'static str = "student";

    fn id(&self) -> StudentId {
        self.id
    }

    fn validate(input: &Value, _intent: Intent) -> Result<StudentProfile, FieldErrors> {
        StudentProfile::validate(input)
    }

    fn scope_for(principal: &Principal) -> Option<StudentFilter> {
        match principal.role {
            Role::Admin => None,
            Role::Student => Some(StudentFilter {
                email: Some(principal.email.clone()),
                ..StudentFilter::default()
            }),
            Role::Teacher => Some(StudentFilter {
                teacher_email: Some(principal.email.clone()),
                ..StudentFilter::default()
            }),
        }
    }
}
