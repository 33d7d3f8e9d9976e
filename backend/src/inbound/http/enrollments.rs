//! Enrollment collection, mounted at `/api/Enrollments`.
//!
//! Reads return the joined [`EnrollmentView`]; students see their own rows
//! and teachers the rows they teach.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{
    EnrollmentDraft, EnrollmentFilter, EnrollmentView, Principal, StudentId, TeacherId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::resource;
use crate::inbound::http::schemas::{EnrollmentSaved, MessageResponse};
use crate::inbound::http::state::HttpState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EnrollmentQuery {
    #[param(value_type = Option<String>, format = Uuid)]
    pub student_id: Option<StudentId>,
    #[param(value_type = Option<String>, format = Uuid)]
    pub teacher_id: Option<TeacherId>,
    pub student_email: Option<String>,
    pub teacher_email: Option<String>,
}

impl From<EnrollmentQuery> for EnrollmentFilter {
    fn from(query: EnrollmentQuery) -> Self {
        Self {
            student_id: query.student_id,
            teacher_id: query.teacher_id,
            student_email: query.student_email,
            teacher_email: query.teacher_email,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/Enrollments",
    params(EnrollmentQuery),
    responses(
        (status = 200, description = "Enrollments, newest first", body = [EnrollmentView]),
        (status = 401, description = "Not signed in", body = ErrorBody)
    ),
    tags = ["enrollments"],
    operation_id = "listEnrollments"
)]
#[get("/Enrollments")]
pub async fn list_enrollments(
    state: web::Data<HttpState>,
    principal: web::ReqData<Principal>,
    query: web::Query<EnrollmentQuery>,
) -> ApiResult<HttpResponse> {
    resource::list::<EnrollmentView>(&state, &principal, query.into_inner().into()).await
}

#[utoipa::path(
    get,
    path = "/api/Enrollments/{id}",
    params(("id" = String, Path, description = "Enrollment id")),
    responses(
        (status = 200, description = "Enrollment", body = EnrollmentView),
        (status = 403, description = "Outside the caller's scope", body = ErrorBody),
        (status = 404, description = "Enrollment not found.", body = ErrorBody)
    ),
    tags = ["enrollments"],
    operation_id = "getEnrollment"
)]
#[get("/Enrollments/{id}")]
pub async fn get_enrollment(
    state: web::Data<HttpState>,
    principal: web::ReqData<Principal>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    resource::detail::<EnrollmentView>(&state, &principal, &id).await
}

#[utoipa::path(
    post,
    path = "/api/Enrollments/create",
    request_body = EnrollmentDraft,
    responses(
        (status = 201, description = "Enrollment created successfully.", body = EnrollmentSaved),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 500, description = "Unknown student, course or teacher", body = ErrorBody)
    ),
    tags = ["enrollments"],
    operation_id = "createEnrollment"
)]
#[post("/Enrollments/create")]
pub async fn create_enrollment(
    state: web::Data<HttpState>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    resource::create::<EnrollmentView>(&state, &body).await
}

#[utoipa::path(
    put,
    path = "/api/Enrollments/{id}",
    params(("id" = String, Path, description = "Enrollment id")),
    request_body = EnrollmentDraft,
    responses(
        (status = 200, description = "Enrollment updated successfully.", body = EnrollmentSaved),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 404, description = "Enrollment not found.", body = ErrorBody)
    ),
    tags = ["enrollments"],
    operation_id = "updateEnrollment"
)]
#[put("/Enrollments/{id}")]
pub async fn update_enrollment(
    state: web::Data<HttpState>,
    id: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    resource::update::<EnrollmentView>(&state, &id, &body).await
}

#[utoipa::path(
    delete,
    path = "/api/Enrollments/{id}",
    params(("id" = String, Path, description = "Enrollment id")),
    responses(
        (status = 200, description = "Enrollment deleted successfully.", body = MessageResponse),
        (status = 404, description = "Enrollment not found.", body = ErrorBody)
    ),
    tags = ["enrollments"],
    operation_id = "deleteEnrollment"
)]
#[delete("/Enrollments/{id}")]
pub async fn delete_enrollment(
    state: web::Data<HttpState>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    resource::delete::<EnrollmentView>(&state, &id).await
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_enrollments)
        .service(create_enrollment)
        .service(get_enrollment)
        .service(update_enrollment)
        .service(delete_enrollment);
}
