//! OpenAPI document for the REST API.
//!
//! Registers every `/api` handler, the health checks, the record schemas and
//! the session cookie security scheme. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    Account, CompletionStatus, Course, CourseDraft, EnrollmentDraft, EnrollmentView, Principal,
    Student, StudentProfile, Teacher, TeacherProfile,
};
use crate::inbound::http::auth::LoginRequest;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::schemas::{
    AccountForm, CourseSaved, EnrollmentSaved, MessageResponse, StudentSaved, TeacherSaved,
    UserSaved,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Private session cookie issued by POST /api/login.",
            ))),
        );
    }
}

/// Generated OpenAPI document.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "School administration API",
        description = "Students, teachers, courses, enrollments and user accounts."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::students::list_students,
        crate::inbound::http::students::get_student,
        crate::inbound::http::students::create_student,
        crate::inbound::http::students::update_student,
        crate::inbound::http::students::delete_student,
        crate::inbound::http::teachers::list_teachers,
        crate::inbound::http::teachers::lookup_teacher,
        crate::inbound::http::teachers::get_teacher,
        crate::inbound::http::teachers::create_teacher,
        crate::inbound::http::teachers::update_teacher,
        crate::inbound::http::teachers::delete_teacher,
        crate::inbound::http::courses::list_courses,
        crate::inbound::http::courses::get_course,
        crate::inbound::http::courses::create_course,
        crate::inbound::http::courses::update_course,
        crate::inbound::http::courses::delete_course,
        crate::inbound::http::enrollments::list_enrollments,
        crate::inbound::http::enrollments::get_enrollment,
        crate::inbound::http::enrollments::create_enrollment,
        crate::inbound::http::enrollments::update_enrollment,
        crate::inbound::http::enrollments::delete_enrollment,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Student, StudentProfile, Teacher, TeacherProfile, Course, CourseDraft,
        EnrollmentView, EnrollmentDraft, CompletionStatus, Account, AccountForm,
        Principal, LoginRequest, ErrorBody, MessageResponse, StudentSaved,
        TeacherSaved, CourseSaved, EnrollmentSaved, UserSaved,
    )),
    tags(
        (name = "auth", description = "Session sign-in and sign-out"),
        (name = "students", description = "Student records"),
        (name = "teachers", description = "Teacher records"),
        (name = "courses", description = "Courses and their instructors"),
        (name = "enrollments", description = "Student enrollments in courses"),
        (name = "users", description = "Login accounts"),
        (name = "health", description = "Orchestrator health checks")
    )
)]
pub struct ApiDoc;
