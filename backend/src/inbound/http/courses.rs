//! Course collection. Teachers only see the courses they teach.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{Course, CourseDraft, CourseFilter, Principal, TeacherId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::resource;
use crate::inbound::http::schemas::{CourseSaved, MessageResponse};
use crate::inbound::http::state::HttpState;

/// Optional equality filters; ignored for teachers.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CourseQuery {
    #[param(value_type = Option<String>, format = Uuid)]
    pub teacher_id: Option<TeacherId>,
    pub teacher_email: Option<String>,
}

impl From<CourseQuery> for CourseFilter {
    fn from(query: CourseQuery) -> Self {
        Self {
            teacher_id: query.teacher_id,
            teacher_email: query.teacher_email,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/courses",
    params(CourseQuery),
    responses(
        (status = 200, description = "Courses ordered by title", body = [Course]),
        (status = 403, description = "Staff only", body = ErrorBody)
    ),
    tags = ["courses"],
    operation_id = "listCourses"
)]
#[get("/courses")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    principal: web::ReqData<Principal>,
    query: web::Query<CourseQuery>,
) -> ApiResult<HttpResponse> {
    resource::list::<Course>(&state, &principal, query.into_inner().into()).await
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course", body = Course),
        (status = 403, description = "Not one of the caller's courses", body = ErrorBody),
        (status = 404, description = "Course not found.", body = ErrorBody)
    ),
    tags = ["courses"],
    operation_id = "getCourse"
)]
#[get("/courses/{id}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    principal: web::ReqData<Principal>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    resource::detail::<Course>(&state, &principal, &id).await
}

#[utoipa::path(
    post,
    path = "/api/courses/create",
    request_body = CourseDraft,
    responses(
        (status = 201, description = "Course created successfully.", body = CourseSaved),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 500, description = "Database error", body = ErrorBody)
    ),
    tags = ["courses"],
    operation_id = "createCourse"
)]
#[post("/courses/create")]
pub async fn create_course(
    state: web::Data<HttpState>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    resource::create::<Course>(&state, &body).await
}

#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    request_body = CourseDraft,
    responses(
        (status = 200, description = "Course updated successfully.", body = CourseSaved),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 404, description = "Course not found.", body = ErrorBody)
    ),
    tags = ["courses"],
    operation_id = "updateCourse"
)]
#[put("/courses/{id}")]
pub async fn update_course(
    state: web::Data<HttpState>,
    id: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    resource::update::<Course>(&state, &id, &body).await
}

#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = String, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course deleted successfully.", body = MessageResponse),
        (status = 404, description = "Course not found.", body = ErrorBody)
    ),
    tags = ["courses"],
    operation_id = "deleteCourse"
)]
#[delete("/courses/{id}")]
pub async fn delete_course(
    state: web::Data<HttpState>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    resource::delete::<Course>(&state, &id).await
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_courses)
        .service(create_course)
        .service(get_course)
        .service(update_course)
        .service(delete_course);
}
