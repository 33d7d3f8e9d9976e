//! Student collection.
//!
//! ```text
//! GET    /api/students?studentEmail=&teacherId=&teacherEmail=
//! GET    /api/students/{id}
//! POST   /api/students/create
//! PUT    /api/students/{id}
//! DELETE /api/students/{id}
//! ```
//!
//! Students only ever see their own record; teachers see students enrolled
//! with them.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{Principal, Student, StudentFilter, StudentProfile, TeacherId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::resource;
use crate::inbound::http::schemas::{MessageResponse, StudentSaved};
use crate::inbound::http::state::HttpState;

/// Optional equality filters; ignored for non-admin callers.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StudentQuery {
    /// Exact student email.
    pub student_email: Option<String>,
    /// Students enrolled with this teacher.
    #[param(value_type = Option<String>, format = Uuid)]
    pub teacher_id: Option<TeacherId>,
    /// Students enrolled with the teacher owning this email.
    pub teacher_email: Option<String>,
}

impl From<StudentQuery> for StudentFilter {
    fn from(query: StudentQuery) -> Self {
        Self {
            email: query.student_email,
            teacher_id: query.teacher_id,
            teacher_email: query.teacher_email,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/students",
    params(StudentQuery),
    responses(
        (status = 200, description = "Students ordered by last then first name", body = [Student]),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 500, description = "Database error", body = ErrorBody)
    ),
    tags = ["students"],
    operation_id = "listStudents"
)]
#[get("/students")]
pub async fn list_students(
    state: web::Data<HttpState>,
    principal: web::ReqData<Principal>,
    query: web::Query<StudentQuery>,
) -> ApiResult<HttpResponse> {
    resource::list::<Student>(&state, &principal, query.into_inner().into()).await
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student", body = Student),
        (status = 403, description = "Outside the caller's scope", body = ErrorBody),
        (status = 404, description = "Student not found.", body = ErrorBody)
    ),
    tags = ["students"],
    operation_id = "getStudent"
)]
#[get("/students/{id}")]
pub async fn get_student(
    state: web::Data<HttpState>,
    principal: web::ReqData<Principal>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    resource::detail::<Student>(&state, &principal, &id).await
}

#[utoipa::path(
    post,
    path = "/api/students/create",
    request_body = StudentProfile,
    responses(
        (status = 201, description = "Student created successfully.", body = StudentSaved),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 403, description = "Admins only", body = ErrorBody),
        (status = 500, description = "Database error", body = ErrorBody)
    ),
    tags = ["students"],
    operation_id = "createStudent"
)]
#[post("/students/create")]
pub async fn create_student(
    state: web::Data<HttpState>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    resource::create::<Student>(&state, &body).await
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(("id" = String, Path, description = "Student id")),
    request_body = StudentProfile,
    responses(
        (status = 200, description = "Student updated successfully.", body = StudentSaved),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 404, description = "Student not found.", body = ErrorBody)
    ),
    tags = ["students"],
    operation_id = "updateStudent"
)]
#[put("/students/{id}")]
pub async fn update_student(
    state: web::Data<HttpState>,
    id: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    resource::update::<Student>(&state, &id, &body).await
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(("id" = String, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student deleted successfully.", body = MessageResponse),
        (status = 404, description = "Student not found.", body = ErrorBody),
        (status = 500, description = "Database error: Could not delete student.", body = ErrorBody)
    ),
    tags = ["students"],
    operation_id = "deleteStudent"
)]
#[delete("/students/{id}")]
pub async fn delete_student(
    state: web::Data<HttpState>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    resource::delete::<Student>(&state, &id).await
}

/// Register the student routes; `/create` precedes `/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_students)
        .service(create_student)
        .service(get_student)
        .service(update_student)
        .service(delete_student);
}
