//! Teacher records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::resource::{Intent, Resource};
use crate::domain::{FieldErrors, Submission, TeacherId};

/// `VARCHAR` widths of the `teachers` columns.
const COLUMN_LIMITS: [(&str, usize); 5] = [
    ("firstname", 255),
    ("lastname", 255),
    ("subject", 255),
    ("phonenumber", 50),
    ("qualification", 255),
];

/// Editable teacher columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TeacherProfile {
    /// Given name.
    pub firstname: String,
    /// Family name.
    pub lastname: String,
    /// Contact email; unique across teachers.
    pub email: String,
    /// Main subject taught.
    pub subject: String,
    /// Phone number.
    pub phonenumber: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Date of hire.
    pub hiredate: Option<NaiveDate>,
    /// Highest qualification.
    pub qualification: Option<String>,
    /// Short biography.
    pub bio: Option<String>,
    /// Avatar image URL.
    pub avatarurl: Option<String>,
}

impl TeacherProfile {
    /// Validate an untyped teacher submission.
    ///
    /// # Errors
    /// Returns every failing field.
    pub fn validate(input: &Value) -> Result<Self, FieldErrors> {
        let mut form = Submission::new(input)?;
        let firstname = form.required_string("firstname", "First name cannot be empty.");
        let lastname = form.required_string("lastname", "Last name cannot be empty.");
        let email = form.email("email", "Invalid email address.");
        let subject = form.required_string("subject", "Subject cannot be empty.");
        let phonenumber = form.optional_string("phonenumber");
        let address = form.optional_string("address");
        let hiredate =
            form.optional_date("hiredate", "Hire date must be a valid date (YYYY-MM-DD).");
        let qualification = form.optional_string("qualification");
        let bio = form.optional_string("bio");
        let avatarurl = form.optional_string("avatarurl");
        form.max_chars_each(&COLUMN_LIMITS);

        match (firstname, lastname, email, subject) {
            (Some(firstname), Some(lastname), Some(email), Some(subject)) if form.is_clean() => {
                Ok(Self {
                    firstname,
                    lastname,
                    email,
                    subject,
                    phonenumber,
                    address,
                    hiredate,
                    qualification,
                    bio,
                    avatarurl,
                })
            }
            _ => Err(form.into_errors()),
        }
    }
}

/// Stored teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Teacher {
    /// Surrogate key.
    #[schema(value_type = String, format = Uuid)]
    pub id: TeacherId,
    /// Editable columns.
    #[serde(flatten)]
    pub profile: TeacherProfile,
    /// Insert timestamp.
    pub created_at: DateTime<Utc>,
    /// Last replacement timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Equality filters for teacher lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeacherFilter {
    /// Exact teacher email.
    pub email: Option<String>,
}

impl Resource for Teacher {
    type Id = TeacherId;
    type Draft = TeacherProfile;
    type Filter = TeacherFilter;

    const NOUN: &'static str = "Teacher";
    const KEY: &'static str = "teacher";

    fn id(&self) -> TeacherId {
        self.id
    }

    fn validate(input: &Value, _intent: Intent) -> Result<TeacherProfile, FieldErrors> {
        TeacherProfile::validate(input)
    }
}
