//! Domain-level error type shared by every resource.
//!
//! Errors are transport agnostic: the HTTP adapter decides how each
//! [`ErrorCode`] becomes a status line and which fields reach the body.
//! Validation failures additionally carry a [`FieldErrors`] map so callers can
//! show every problem with a submission at once.

use serde_json::Value;

use crate::domain::{FieldErrors, TraceId};

/// Header used to echo the request trace identifier back to clients.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The submission is malformed or fails validation.
    InvalidRequest,
    /// No session, or the session does not identify an active account.
    Unauthorized,
    /// The session role may not perform this action.
    Forbidden,
    /// The requested record does not exist.
    NotFound,
    /// A dependency (usually the database) could not be reached.
    ServiceUnavailable,
    /// An unexpected failure inside the service.
    InternalError,
}

impl ErrorCode {
    /// Snake-case identifier used in serialised payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::ServiceUnavailable => "service_unavailable",
            Self::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain error payload.
///
/// The trace identifier in scope at construction time is captured so the
/// failure can be correlated with request logs.
///
/// # Examples
/// ```
/// use schoolapp::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("Teacher not found.");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "Teacher not found.");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
    details: Option<Value>,
    field_errors: Option<FieldErrors>,
}

impl Error {
    /// Create a new error for `code` with a human-readable message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
            field_errors: None,
        }
    }

    /// Validation failure listing every offending field.
    ///
    /// # Examples
    /// ```
    /// use schoolapp::domain::{Error, FieldErrors};
    ///
    /// let mut errors = FieldErrors::default();
    /// errors.push("email", "Invalid email address.");
    /// let err = Error::validation("Missing or invalid fields.", errors);
    /// assert!(err.field_errors().is_some_and(|e| e.contains("email")));
    /// ```
    pub fn validation(message: impl Into<String>, errors: FieldErrors) -> Self {
        let mut error = Self::new(ErrorCode::InvalidRequest, message);
        error.field_errors = Some(errors);
        error
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Trace identifier captured when the error was raised.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Supplementary structured details.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Per-field validation messages, present on validation failures only.
    #[must_use]
    pub const fn field_errors(&self) -> Option<&FieldErrors> {
        self.field_errors.as_ref()
    }

    /// Attach a trace identifier explicitly.
    #[must_use]
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Attach structured details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    #[case(Error::invalid_request("x"), ErrorCode::InvalidRequest)]
    #[case(Error::unauthorized("x"), ErrorCode::Unauthorized)]
    #[case(Error::forbidden("x"), ErrorCode::Forbidden)]
    #[case(Error::not_found("x"), ErrorCode::NotFound)]
    #[case(Error::service_unavailable("x"), ErrorCode::ServiceUnavailable)]
    #[case(Error::internal("x"), ErrorCode::InternalError)]
    fn constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
        assert_eq!(error.code(), expected);
        assert!(error.field_errors().is_none());
    }

    #[tokio::test]
    async fn captures_trace_id_in_scope() {
        let trace_id = TraceId::from_uuid(Uuid::nil());
        let error = TraceId::scope(trace_id, async { Error::internal("boom") }).await;
        assert_eq!(error.trace_id(), Some(Uuid::nil().to_string().as_str()));
    }

    #[rstest]
    fn no_trace_id_out_of_scope() {
        assert!(Error::not_found("gone").trace_id().is_none());
    }

    #[rstest]
    fn validation_keeps_field_messages() {
        let mut errors = FieldErrors::default();
        errors.push("grade", "Grade cannot be empty.");
        let error = Error::validation("Missing or invalid fields.", errors);

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        let fields = error.field_errors().expect("field errors");
        assert_eq!(fields.messages("grade"), ["Grade cannot be empty.".to_owned()]);
    }
}
