//! HTTP adapter mapping for domain errors.
//!
//! The domain error stays transport agnostic; this module picks the status
//! line and the JSON envelope. Validation failures use the form-friendly
//! `{message, errors}` shape, every other failure uses `{error}`. Both carry
//! the stable `code` and the request `traceId`.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, FieldErrors, TRACE_ID_HEADER};

pub use crate::domain::ApiResult;

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Failure sentence for non-validation errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Teacher not found.")]
    pub error: Option<String>,
    /// Summary sentence for validation errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Missing or invalid fields. Could not create student.")]
    pub message: Option<String>,
    /// Field name to messages, validation errors only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub errors: Option<FieldErrors>,
    #[schema(example = "not_found")]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

impl From<&Error> for ErrorBody {
    fn from(err: &Error) -> Self {
        let trace_id = err.trace_id().map(str::to_owned);
        let code = err.code().as_str().to_owned();
        match err.field_errors() {
            Some(fields) => Self {
                error: None,
                message: Some(err.message().to_owned()),
                errors: Some(fields.clone()),
                code,
                trace_id,
                details: None,
            },
            None => Self {
                error: Some(err.message().to_owned()),
                message: None,
                errors: None,
                code,
                trace_id,
                details: match err.code() {
                    ErrorCode::InternalError => None,
                    _ => err.details().cloned(),
                },
            },
        }
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(ErrorBody::from(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}
