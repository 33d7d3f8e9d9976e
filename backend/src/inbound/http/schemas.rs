//! OpenAPI-only schema types.
//!
//! Handlers accept raw JSON so validation can report every field at once;
//! these types describe the accepted and returned shapes for the generated
//! document and are never constructed.

#![expect(dead_code, reason = "used only for OpenAPI schema generation via utoipa")]

use utoipa::ToSchema;

use crate::domain::{Account, Course, EnrollmentView, Student, Teacher};

/// `{"message": ...}` body returned by deletes.
#[derive(ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Student deleted successfully.")]
    message: String,
}

/// Account submission. `password` is required on create and optional on
/// update.
#[derive(ToSchema)]
pub struct AccountForm {
    #[schema(example = "rpark")]
    username: String,
    #[schema(example = "rosa@school.test")]
    email: String,
    first_name: String,
    last_name: String,
    #[schema(example = "teacher")]
    role: String,
    is_active: Option<bool>,
    is_email_confirmed: Option<bool>,
    password: Option<String>,
}

macro_rules! saved_schema {
    ($name:ident, $key:ident, $record:ty, $example:literal) => {
        /// Create/update response: message plus the stored record.
        #[derive(ToSchema)]
        pub struct $name {
            #[schema(example = $example)]
            message: String,
            $key: $record,
        }
    };
}

saved_schema!(StudentSaved, student, Student, "Student created successfully.");
saved_schema!(TeacherSaved, teacher, Teacher, "Teacher created successfully.");
saved_schema!(CourseSaved, course, Course, "Course created successfully.");
saved_schema!(
    EnrollmentSaved,
    enrollment,
    EnrollmentView,
    "Enrollment created successfully."
);
saved_schema!(UserSaved, user, Account, "User created successfully.");
