//! Domain primitives, record kinds, and services.
//!
//! Purpose: define the strongly typed records managed by the school
//! administration API, the validation rules applied to submissions, and the
//! gateway that turns validated drafts into stored rows through the ports.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - Student, Teacher, Course, EnrollmentView, Account: stored records.
//! - RecordGateway: create/update/delete/read contract per record kind.
//! - CredentialLoginService: password login over account credentials.

pub mod account;
pub mod auth;
pub mod course;
pub mod enrollment;
pub mod error;
pub mod gateway;
pub mod ids;
pub mod login;
pub mod password;
pub mod ports;
pub mod resource;
pub mod student;
pub mod teacher;
pub mod trace_id;
pub mod validation;

pub use self::account::{Account, AccountDraft, AccountFilter, StoredCredential};
pub use self::auth::{LoginCredentials, LoginValidationError, Principal, Role, UnknownRole};
pub use self::course::{Course, CourseDraft, CourseFilter};
pub use self::enrollment::{
    CompletionStatus, EnrollmentDraft, EnrollmentFilter, EnrollmentView,
    UnknownCompletionStatus,
};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::gateway::{DeleteOutcome, RecordGateway, Saved};
pub use self::ids::{CourseId, EnrollmentId, StudentId, TeacherId, UserId};
pub use self::login::{CredentialLoginService, ensure_admin_account};
pub use self::password::{PasswordDigest, PasswordError};
pub use self::resource::{Intent, Resource};
pub use self::student::{Student, StudentFilter, StudentProfile};
pub use self::teacher::{Teacher, TeacherFilter, TeacherProfile};
pub use self::trace_id::TraceId;
pub use self::validation::{FieldErrors, Submission, is_valid_email};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use schoolapp::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("Forbidden"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
