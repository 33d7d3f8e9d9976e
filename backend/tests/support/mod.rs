//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates, so every helper here is
//! used by some suites and not others.
#![allow(dead_code, reason = "each test crate uses a different subset")]

pub mod embedded_postgres;

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test as actix_test, web};
use schoolapp::Trace;
use schoolapp::domain::{CredentialLoginService, ensure_admin_account};
use schoolapp::inbound::http::session_config::SessionSettings;
use schoolapp::inbound::http::state::{HttpState, HttpStatePorts};
use schoolapp::middleware::Authorize;
use schoolapp::outbound::memory::MemoryStore;
use serde_json::{Value, json};

pub const ADMIN_EMAIL: &str = "admin@school.test";
pub const ADMIN_PASSWORD: &str = "correct horse";
pub const TEST_DATABASE_ENV: &str = "SCHOOLAPP_TEST_DATABASE_URL";

/// Plain-HTTP cookie settings for tests.
pub fn session_settings() -> SessionSettings {
    SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    }
}

/// Every port served by one in-memory store.
pub fn memory_ports(store: &Arc<MemoryStore>) -> HttpStatePorts {
    HttpStatePorts {
        students: store.clone(),
        teachers: store.clone(),
        courses: store.clone(),
        enrollments: store.clone(),
        users: store.clone(),
        login: Arc::new(CredentialLoginService::new(store.clone())),
    }
}

/// In-memory store holding one active administrator.
pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::default());
    ensure_admin_account(store.as_ref(), ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("seed admin");
    store
}

/// App wired like the server: trace, session, guard, `/api` routes.
pub async fn init_app(
    ports: HttpStatePorts,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    let session = session_settings();
    actix_test::init_service(
        App::new()
            .app_data(web::Data::new(HttpState::new(ports)))
            .wrap(Trace)
            .service(
                web::scope("/api")
                    .wrap(Authorize)
                    .wrap(session.middleware())
                    .configure(schoolapp::inbound::http::configure),
            ),
    )
    .await
}

/// Sign in and return the session cookie.
pub async fn login<S>(app: &S, email: &str, password: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "email": email, "password": password }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status().as_u16(), 200, "login as {email}");
    res.response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// Status and decoded JSON body (`Null` when empty).
pub async fn send<S>(app: &S, req: actix_test::TestRequest) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let res = actix_test::call_service(app, req.to_request()).await;
    let status = res.status().as_u16();
    let bytes = actix_test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

/// Id field of a create/update response wrapped under `key`.
pub fn saved_id(body: &Value, key: &str, id_field: &str) -> String {
    body[key][id_field]
        .as_str()
        .unwrap_or_else(|| panic!("{key}.{id_field} in {body}"))
        .to_owned()
}

pub fn student_body(first: &str, last: &str, email: &str) -> Value {
    json!({ "firstname": first, "lastname": last, "email": email, "grade": "10" })
}

pub fn teacher_body(first: &str, last: &str, email: &str) -> Value {
    json!({ "firstname": first, "lastname": last, "email": email, "subject": "Maths" })
}

pub fn course_body(title: &str, code: &str, teacher_id: &str) -> Value {
    json!({
        "title": title,
        "course_code": code,
        "description": "Intro",
        "credits": 3,
        "duration": "12 weeks",
        "difficulty_level": "Beginner",
        "teacher_id": teacher_id,
    })
}

pub fn enrollment_body(student_id: &str, course_id: &str, teacher_id: &str) -> Value {
    json!({
        "student_id": student_id,
        "course_id": course_id,
        "teacher_id": teacher_id,
        "enrollment_date": "2024-09-01",
        "completion_status": "Enrolled",
    })
}

pub fn account_body(email: &str, role: &str, password: &str) -> Value {
    json!({
        "username": email.split('@').next().unwrap_or(email),
        "email": email,
        "first_name": "Test",
        "last_name": "Account",
        "role": role,
        "password": password,
    })
}
