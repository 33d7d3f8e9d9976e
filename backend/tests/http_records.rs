//! End-to-end HTTP flows over the in-memory store.
//!
//! Each test builds the full `/api` scope (trace, session, guard, routes) and
//! drives it through Actix's test harness with a real session cookie.

mod support;

use actix_web::test::TestRequest;
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

use support::{
    ADMIN_EMAIL, ADMIN_PASSWORD, account_body, course_body, enrollment_body, init_app,
    login, memory_ports, saved_id, seeded_store, send, student_body, teacher_body,
};

/// Ids of one teacher, course, student and enrollment linking them.
struct Roster {
    teacher: String,
    course: String,
    student: String,
    enrollment: String,
}

async fn seed_roster<S>(app: &S, cookie: &actix_web::cookie::Cookie<'static>) -> Roster
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (_, body) = send(
        app,
        TestRequest::post()
            .uri("/api/teachers/create")
            .cookie(cookie.clone())
            .set_json(teacher_body("Tom", "Hardy", "tom@school.test")),
    )
    .await;
    let teacher = saved_id(&body, "teacher", "id");

    let (_, body) = send(
        app,
        TestRequest::post()
            .uri("/api/courses/create")
            .cookie(cookie.clone())
            .set_json(course_body("Algebra", "MAT101", &teacher)),
    )
    .await;
    let course = saved_id(&body, "course", "id");

    let (_, body) = send(
        app,
        TestRequest::post()
            .uri("/api/students/create")
            .cookie(cookie.clone())
            .set_json(student_body("Ann", "Lee", "ann@school.test")),
    )
    .await;
    let student = saved_id(&body, "student", "id");

    let (_, body) = send(
        app,
        TestRequest::post()
            .uri("/api/Enrollments/create")
            .cookie(cookie.clone())
            .set_json(enrollment_body(&student, &course, &teacher)),
    )
    .await;
    let enrollment = saved_id(&body, "enrollment", "enrollment_id");

    Roster {
        teacher,
        course,
        student,
        enrollment,
    }
}

async fn row_count<S>(
    app: &S,
    cookie: &actix_web::cookie::Cookie<'static>,
    collection: &str,
) -> usize
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (status, body) = send(
        app,
        TestRequest::get()
            .uri(&format!("/api/{collection}"))
            .cookie(cookie.clone()),
    )
    .await;
    assert_eq!(status, 200, "list {collection}");
    body.as_array().map_or(0, Vec::len)
}

/// A create body for `collection` that passes validation.
fn valid_body(collection: &str, roster: &Roster) -> Value {
    match collection {
        "students" => student_body("Bea", "Moss", "bea@school.test"),
        "teachers" => teacher_body("Ida", "Vale", "ida@school.test"),
        "courses" => course_body("Biology", "BIO101", &roster.teacher),
        "Enrollments" => enrollment_body(&roster.student, &roster.course, &roster.teacher),
        "users" => account_body("ida@school.test", "teacher", "pw-ida"),
        other => panic!("no body for {other}"),
    }
}

#[actix_web::test]
async fn admin_creates_and_reads_back_a_student() {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/students/create")
            .cookie(cookie.clone())
            .set_json(student_body("Ann", "Lee", "ann@x.com")),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["message"], "Student created successfully.");
    assert_eq!(body["student"]["email"], "ann@x.com");
    let id = saved_id(&body, "student", "id");

    let (status, body) = send(
        &app,
        TestRequest::get()
            .uri(&format!("/api/students/{id}"))
            .cookie(cookie),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["firstname"], "Ann");
    assert_eq!(body["grade"], "10");
}

#[rstest]
#[case("students", "Student not found.")]
#[case("teachers", "Teacher not found.")]
#[case("courses", "Course not found.")]
#[case("Enrollments", "Enrollment not found.")]
#[case("users", "User not found.")]
#[actix_web::test]
async fn deleting_an_unknown_id_is_not_found(#[case] collection: &str, #[case] message: &str) {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    seed_roster(&app, &cookie).await;
    let before = row_count(&app, &cookie, collection).await;

    let (status, body) = send(
        &app,
        TestRequest::delete()
            .uri(&format!("/api/{collection}/{}", Uuid::new_v4()))
            .cookie(cookie.clone()),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], message);
    assert_eq!(row_count(&app, &cookie, collection).await, before);
}

#[actix_web::test]
async fn malformed_ids_read_as_unknown() {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, body) = send(
        &app,
        TestRequest::get().uri("/api/courses/not-a-uuid").cookie(cookie),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Course not found.");
}

#[rstest]
#[case(json!(0), false)]
#[case(json!(2.5), false)]
#[case(json!("three"), false)]
#[case(json!(1), true)]
#[actix_web::test]
async fn course_credits_must_be_a_positive_integer(#[case] credits: Value, #[case] ok: bool) {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/teachers/create")
            .cookie(cookie.clone())
            .set_json(teacher_body("Tom", "Hardy", "tom@school.test")),
    )
    .await;
    let teacher = saved_id(&body, "teacher", "id");

    let mut course = course_body("Algebra", "MAT101", &teacher);
    course["credits"] = credits;
    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/courses/create")
            .cookie(cookie)
            .set_json(course),
    )
    .await;

    if ok {
        assert_eq!(status, 201);
        assert_eq!(body["course"]["credits"], 1);
        assert_eq!(body["course"]["teacher_email"], "tom@school.test");
    } else {
        assert_eq!(status, 400);
        assert_eq!(
            body["message"],
            "Missing or invalid fields. Could not create course."
        );
        assert_eq!(body["errors"]["credits"][0], "Credits must be at least 1.");
    }
}

#[rstest]
#[case("a@b", 400)]
#[case("a b@c.d", 400)]
#[case("a@b.c", 201)]
#[actix_web::test]
async fn email_shape_is_checked(#[case] email: &str, #[case] expected: u16) {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/teachers/create")
            .cookie(cookie)
            .set_json(teacher_body("Tom", "Hardy", email)),
    )
    .await;
    assert_eq!(status, expected, "{body}");
    if expected == 400 {
        assert_eq!(body["errors"]["email"][0], "Invalid email address.");
    }
}

#[actix_web::test]
async fn every_missing_field_is_reported_at_once() {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/students/create")
            .cookie(cookie)
            .set_json(json!({})),
    )
    .await;
    assert_eq!(status, 400);
    for field in ["firstname", "lastname", "email", "grade"] {
        assert!(body["errors"][field].is_array(), "missing {field} in {body}");
    }
    assert_eq!(body["code"], "invalid_request");
}

#[rstest]
#[case("students", "email")]
#[case("teachers", "subject")]
#[case("courses", "title")]
#[case("Enrollments", "student_id")]
#[case("users", "password")]
#[actix_web::test]
async fn a_missing_required_field_creates_nothing(
    #[case] collection: &str,
    #[case] field: &str,
) {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let roster = seed_roster(&app, &cookie).await;
    let before = row_count(&app, &cookie, collection).await;

    let mut body = valid_body(collection, &roster);
    body.as_object_mut().expect("object body").remove(field);
    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri(&format!("/api/{collection}/create"))
            .cookie(cookie.clone())
            .set_json(body),
    )
    .await;
    assert_eq!(status, 400);
    assert!(body["errors"][field].is_array(), "missing {field} in {body}");
    assert_eq!(row_count(&app, &cookie, collection).await, before);
}

#[rstest]
#[case("students", "phonenumber", 50)]
#[case("teachers", "phonenumber", 50)]
#[case("courses", "course_code", 64)]
#[case("courses", "difficulty_level", 64)]
#[case("Enrollments", "grade", 32)]
#[case("users", "username", 255)]
#[actix_web::test]
async fn column_widths_are_enforced_as_field_errors(
    #[case] collection: &str,
    #[case] field: &str,
    #[case] max: usize,
) {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let roster = seed_roster(&app, &cookie).await;
    let uri = format!("/api/{collection}/create");

    let mut body = valid_body(collection, &roster);
    body[field] = json!("x".repeat(max + 1));
    let (status, errors) = send(
        &app,
        TestRequest::post()
            .uri(&uri)
            .cookie(cookie.clone())
            .set_json(body.clone()),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(
        errors["errors"][field][0],
        format!("{field} must be at most {max} characters.")
    );

    body[field] = json!("x".repeat(max));
    let (status, _) = send(
        &app,
        TestRequest::post().uri(&uri).cookie(cookie).set_json(body),
    )
    .await;
    assert_eq!(status, 201);
}

#[actix_web::test]
async fn non_json_bodies_are_invalid_input() {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/students/create")
            .cookie(cookie)
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json"),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Invalid input data. Could not create student.");
}

#[rstest]
#[case("/api/students")]
#[case("/api/teachers")]
#[case("/api/courses")]
#[case("/api/Enrollments")]
#[case("/api/users")]
#[case("/api/me")]
#[actix_web::test]
async fn reads_without_a_session_are_unauthorized(#[case] uri: &str) {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let (status, body) = send(&app, TestRequest::get().uri(uri)).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Unauthorized");
}

#[actix_web::test]
async fn responses_echo_the_trace_identifier() {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let res = actix_web::test::call_service(
        &app,
        TestRequest::get().uri("/api/students").to_request(),
    )
    .await;
    let header = res
        .headers()
        .get("trace-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("trace-id header");
    let body: Value = actix_web::test::read_body_json(res).await;
    assert_eq!(body["traceId"], header.as_str());
}

#[actix_web::test]
async fn roles_gate_collections_and_writes() {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, _) = send(
        &app,
        TestRequest::post()
            .uri("/api/users/create")
            .cookie(admin)
            .set_json(account_body("sam@school.test", "student", "pw-sam")),
    )
    .await;
    assert_eq!(status, 201);

    let student = login(&app, "sam@school.test", "pw-sam").await;
    for uri in ["/api/teachers", "/api/courses", "/api/users"] {
        let (status, body) = send(&app, TestRequest::get().uri(uri).cookie(student.clone())).await;
        assert_eq!(status, 403, "{uri}");
        assert_eq!(body["error"], "Forbidden");
    }
    let (status, _) = send(
        &app,
        TestRequest::post()
            .uri("/api/students/create")
            .cookie(student)
            .set_json(student_body("Sam", "Poe", "sam@school.test")),
    )
    .await;
    assert_eq!(status, 403);
}

#[actix_web::test]
async fn created_accounts_never_expose_passwords() {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/users/create")
            .cookie(admin.clone())
            .set_json(account_body("tom@school.test", "teacher", "pw-tom")),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["message"], "User created successfully.");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = send(
        &app,
        TestRequest::get().uri("/api/users?role=teacher").cookie(admin),
    )
    .await;
    assert_eq!(status, 200);
    let accounts = body.as_array().expect("account list");
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["email"], "tom@school.test");
}

#[actix_web::test]
async fn students_only_see_their_own_records() {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let roster = seed_roster(&app, &admin).await;
    let (_, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/students/create")
            .cookie(admin.clone())
            .set_json(student_body("Bob", "Ray", "bob@school.test")),
    )
    .await;
    let other = saved_id(&body, "student", "id");
    send(
        &app,
        TestRequest::post()
            .uri("/api/users/create")
            .cookie(admin)
            .set_json(account_body("ann@school.test", "student", "pw-ann")),
    )
    .await;

    let ann = login(&app, "ann@school.test", "pw-ann").await;
    let (status, body) = send(
        &app,
        TestRequest::get()
            .uri("/api/students?studentEmail=bob@school.test")
            .cookie(ann.clone()),
    )
    .await;
    assert_eq!(status, 200);
    let visible = body.as_array().expect("student list");
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0]["id"], roster.student.as_str());

    let (status, _) = send(
        &app,
        TestRequest::get()
            .uri(&format!("/api/students/{other}"))
            .cookie(ann.clone()),
    )
    .await;
    assert_eq!(status, 403);

    let (status, body) = send(&app, TestRequest::get().uri("/api/Enrollments").cookie(ann)).await;
    assert_eq!(status, 200);
    let enrollments = body.as_array().expect("enrollment list");
    assert_eq!(enrollments.len(), 1);
    assert_eq!(enrollments[0]["enrollment_id"], roster.enrollment.as_str());
    assert_eq!(enrollments[0]["course_title"], "Algebra");
    assert_eq!(enrollments[0]["teacher_email"], "tom@school.test");
}

#[actix_web::test]
async fn teachers_see_enrolled_students_and_their_courses() {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let roster = seed_roster(&app, &admin).await;
    send(
        &app,
        TestRequest::post()
            .uri("/api/students/create")
            .cookie(admin.clone())
            .set_json(student_body("Bob", "Ray", "bob@school.test")),
    )
    .await;
    send(
        &app,
        TestRequest::post()
            .uri("/api/users/create")
            .cookie(admin)
            .set_json(account_body("tom@school.test", "teacher", "pw-tom")),
    )
    .await;

    let tom = login(&app, "tom@school.test", "pw-tom").await;
    let (_, body) = send(&app, TestRequest::get().uri("/api/students").cookie(tom.clone())).await;
    let students = body.as_array().expect("student list");
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["id"], roster.student.as_str());

    let (_, body) = send(&app, TestRequest::get().uri("/api/courses").cookie(tom.clone())).await;
    let courses = body.as_array().expect("course list");
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["id"], roster.course.as_str());

    let (status, body) = send(
        &app,
        TestRequest::get()
            .uri("/api/teachers/lookup?email=tom@school.test")
            .cookie(tom),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["id"], roster.teacher.as_str());
}

#[actix_web::test]
async fn teacher_lookup_misses_are_not_found() {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, body) = send(
        &app,
        TestRequest::get()
            .uri("/api/teachers/lookup?email=nobody@school.test")
            .cookie(admin),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Teacher not found.");
}

#[actix_web::test]
async fn updates_replace_every_column() {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let mut created = teacher_body("Tom", "Hardy", "tom@school.test");
    created["phonenumber"] = json!("555-0100");
    let (_, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/teachers/create")
            .cookie(admin.clone())
            .set_json(created),
    )
    .await;
    let id = saved_id(&body, "teacher", "id");
    assert_eq!(body["teacher"]["phonenumber"], "555-0100");

    let (status, body) = send(
        &app,
        TestRequest::put()
            .uri(&format!("/api/teachers/{id}"))
            .cookie(admin)
            .set_json(teacher_body("Tom", "Hardy", "tom@school.test")),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Teacher updated successfully.");
    assert!(body["teacher"]["phonenumber"].is_null());
}

#[actix_web::test]
async fn teachers_with_courses_cannot_be_deleted() {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let roster = seed_roster(&app, &admin).await;

    let (status, body) = send(
        &app,
        TestRequest::delete()
            .uri(&format!("/api/teachers/{}", roster.teacher))
            .cookie(admin.clone()),
    )
    .await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "Database error: Could not delete teacher.");

    let (status, body) = send(
        &app,
        TestRequest::delete()
            .uri(&format!("/api/students/{}", roster.student))
            .cookie(admin.clone()),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Student deleted successfully.");

    let (_, body) = send(&app, TestRequest::get().uri("/api/Enrollments").cookie(admin)).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn enrollments_reject_unknown_references() {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let ghost = Uuid::new_v4().to_string();
    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/Enrollments/create")
            .cookie(admin)
            .set_json(enrollment_body(&ghost, &ghost, &ghost)),
    )
    .await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "Database error: Could not create enrollment.");
}

#[actix_web::test]
async fn percent_encoded_collections_keep_their_guard() {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    send(
        &app,
        TestRequest::post()
            .uri("/api/users/create")
            .cookie(admin.clone())
            .set_json(account_body("sam@school.test", "student", "pw-sam")),
    )
    .await;
    let before = row_count(&app, &admin, "users").await;

    let student = login(&app, "sam@school.test", "pw-sam").await;
    let (status, _) = send(
        &app,
        TestRequest::get().uri("/api/%75sers").cookie(student.clone()),
    )
    .await;
    assert_eq!(status, 403);
    let (status, _) = send(
        &app,
        TestRequest::post()
            .uri("/api/%75sers/create")
            .cookie(student)
            .set_json(account_body("eve@school.test", "admin", "pw-eve")),
    )
    .await;
    assert_eq!(status, 403);
    assert_eq!(row_count(&app, &admin, "users").await, before);
}

#[actix_web::test]
async fn role_changes_reach_sessions_already_signed_in() {
    let store = seeded_store().await;
    let app = init_app(memory_ports(&store)).await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (_, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/users/create")
            .cookie(admin.clone())
            .set_json(account_body("boss@school.test", "admin", "pw-boss")),
    )
    .await;
    let boss_id = saved_id(&body, "user", "user_id");

    let boss = login(&app, "boss@school.test", "pw-boss").await;
    let (status, _) = send(&app, TestRequest::get().uri("/api/users").cookie(boss.clone())).await;
    assert_eq!(status, 200);

    let (status, _) = send(
        &app,
        TestRequest::put()
            .uri(&format!("/api/users/{boss_id}"))
            .cookie(admin.clone())
            .set_json(account_body("boss@school.test", "student", "pw-boss")),
    )
    .await;
    assert_eq!(status, 200);
    let (status, _) = send(&app, TestRequest::get().uri("/api/users").cookie(boss.clone())).await;
    assert_eq!(status, 403);
    let (status, _) = send(
        &app,
        TestRequest::post()
            .uri("/api/students/create")
            .cookie(boss.clone())
            .set_json(student_body("Sly", "Fox", "sly@school.test")),
    )
    .await;
    assert_eq!(status, 403);

    let mut deactivate = account_body("boss@school.test", "student", "pw-boss");
    deactivate["is_active"] = json!(false);
    let (status, _) = send(
        &app,
        TestRequest::put()
            .uri(&format!("/api/users/{boss_id}"))
            .cookie(admin)
            .set_json(deactivate),
    )
    .await;
    assert_eq!(status, 200);
    let (status, body) = send(&app, TestRequest::get().uri("/api/me").cookie(boss)).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Unauthorized");
}
