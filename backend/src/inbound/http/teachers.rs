//! Teacher collection, plus the email lookup used by course forms.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::resource::not_found_message;
use crate::domain::{Error, Principal, Teacher, TeacherFilter, TeacherProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::resource;
use crate::inbound::http::schemas::{MessageResponse, TeacherSaved};
use crate::inbound::http::state::HttpState;

/// Optional list filter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TeacherQuery {
    /// Exact teacher email.
    pub email: Option<String>,
}

/// Required email for [`lookup_teacher`].
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LookupQuery {
    /// Exact teacher email.
    pub email: String,
}

#[utoipa::path(
    get,
    path = "/api/teachers",
    params(TeacherQuery),
    responses(
        (status = 200, description = "Teachers ordered by last then first name", body = [Teacher]),
        (status = 403, description = "Staff only", body = ErrorBody)
    ),
    tags = ["teachers"],
    operation_id = "listTeachers"
)]
#[get("/teachers")]
pub async fn list_teachers(
    state: web::Data<HttpState>,
    principal: web::ReqData<Principal>,
    query: web::Query<TeacherQuery>,
) -> ApiResult<HttpResponse> {
    let filter = TeacherFilter {
        email: query.into_inner().email,
    };
    resource::list::<Teacher>(&state, &principal, filter).await
}

/// Resolve a teacher by email.
#[utoipa::path(
    get,
    path = "/api/teachers/lookup",
    params(LookupQuery),
    responses(
        (status = 200, description = "Teacher", body = Teacher),
        (status = 404, description = "Teacher not found.", body = ErrorBody)
    ),
    tags = ["teachers"],
    operation_id = "lookupTeacher"
)]
#[get("/teachers/lookup")]
pub async fn lookup_teacher(
    state: web::Data<HttpState>,
    query: web::Query<LookupQuery>,
) -> ApiResult<HttpResponse> {
    let filter = TeacherFilter {
        email: Some(query.into_inner().email.trim().to_owned()),
    };
    let teacher = state
        .teachers
        .get_all(&filter)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::not_found(not_found_message::<Teacher>()))?;
    Ok(HttpResponse::Ok().json(teacher))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}",
    params(("id" = String, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Teacher", body = Teacher),
        (status = 404, description = "Teacher not found.", body = ErrorBody)
    ),
    tags = ["teachers"],
    operation_id = "getTeacher"
)]
#[get("/teachers/{id}")]
pub async fn get_teacher(
    state: web::Data<HttpState>,
    principal: web::ReqData<Principal>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    resource::detail::<Teacher>(&state, &principal, &id).await
}

#[utoipa::path(
    post,
    path = "/api/teachers/create",
    request_body = TeacherProfile,
    responses(
        (status = 201, description = "Teacher created successfully.", body = TeacherSaved),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 500, description = "Database error", body = ErrorBody)
    ),
    tags = ["teachers"],
    operation_id = "createTeacher"
)]
#[post("/teachers/create")]
pub async fn create_teacher(
    state: web::Data<HttpState>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    resource::create::<Teacher>(&state, &body).await
}

#[utoipa::path(
    put,
    path = "/api/teachers/{id}",
    params(("id" = String, Path, description = "Teacher id")),
    request_body = TeacherProfile,
    responses(
        (status = 200, description = "Teacher updated successfully.", body = TeacherSaved),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 404, description = "Teacher not found.", body = ErrorBody)
    ),
    tags = ["teachers"],
    operation_id = "updateTeacher"
)]
#[put("/teachers/{id}")]
pub async fn update_teacher(
    state: web::Data<HttpState>,
    id: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    resource::update::<Teacher>(&state, &id, &body).await
}

/// A teacher still referenced by courses or enrollments cannot be removed.
#[utoipa::path(
    delete,
    path = "/api/teachers/{id}",
    params(("id" = String, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Teacher deleted successfully.", body = MessageResponse),
        (status = 404, description = "Teacher not found.", body = ErrorBody),
        (status = 500, description = "Database error: Could not delete teacher.", body = ErrorBody)
    ),
    tags = ["teachers"],
    operation_id = "deleteTeacher"
)]
#[delete("/teachers/{id}")]
pub async fn delete_teacher(
    state: web::Data<HttpState>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    resource::delete::<Teacher>(&state, &id).await
}

/// Register the teacher routes; literal segments precede `/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_teachers)
        .service(lookup_teacher)
        .service(create_teacher)
        .service(get_teacher)
        .service(update_teacher)
        .service(delete_teacher);
}
