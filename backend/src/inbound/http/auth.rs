//! Session endpoints.
//!
//! ```text
//! POST /api/login  {"email":"admin@school.test","password":"secret"}
//! POST /api/logout
//! GET  /api/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, LoginCredentials, LoginValidationError, Principal};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::resource::message_body;
use crate::inbound::http::schemas::MessageResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Account email, matched exactly after trimming.
    #[schema(example = "admin@school.test")]
    pub email: String,
    /// Plain-text password, verified against the stored digest.
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_login_validation_error(err: &LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    Error::invalid_request("Email and password are required.")
        .with_details(json!({ "field": field, "reason": err.to_string() }))
}

/// Verify credentials and remember the account in the session cookie.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = Principal,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Email or password missing", body = ErrorBody),
        (status = 401, description = "Invalid credentials.", body = ErrorBody),
        (status = 503, description = "Database unreachable", body = ErrorBody)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let request: LoginRequest = serde_json::from_slice(&body)
        .map_err(|_| Error::invalid_request("Email and password are required."))?;
    let credentials =
        LoginCredentials::try_from(request).map_err(|err| map_login_validation_error(&err))?;
    let principal = state.login.authenticate(&credentials).await?;
    session.sign_in(principal.user_id)?;
    Ok(HttpResponse::Ok().json(principal))
}

#[utoipa::path(
    post,
    path = "/api/logout",
    responses((status = 200, description = "Signed out", body = MessageResponse)),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.sign_out();
    HttpResponse::Ok().json(message_body("Logged out successfully.".to_owned()))
}

/// Principal of the current session.
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current principal", body = Principal),
        (status = 401, description = "Unauthorized", body = ErrorBody)
    ),
    tags = ["auth"],
    operation_id = "me"
)]
#[get("/me")]
pub async fn me(principal: web::ReqData<Principal>) -> HttpResponse {
    HttpResponse::Ok().json(principal.into_inner())
}

/// Register the sign-in, sign-out and `/me` handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login).service(logout).service(me);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockLoginService;
    use crate::domain::{Role, UserId};
    use crate::inbound::http::test_utils::{state_with_login, test_session_middleware};
    use crate::middleware::Authorize;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    fn admin() -> Principal {
        Principal {
            user_id: UserId::random(),
            role: Role::Admin,
            email: "admin@school.test".into(),
        }
    }

    macro_rules! app {
        ($login:expr) => {
            actix_test::init_service(
                App::new().app_data(state_with_login($login)).service(
                    web::scope("/api")
                        .wrap(Authorize)
                        .wrap(test_session_middleware())
                        .configure(configure),
                ),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn login_sets_cookie_and_me_returns_principal() {
        let principal = admin();
        let expected = principal.clone();
        let resolved = principal.clone();
        let mut login_service = MockLoginService::new();
        login_service
            .expect_authenticate()
            .withf(|creds| creds.email() == "admin@school.test" && creds.password() == "secret")
            .times(1)
            .return_once(move |_| Ok(principal));
        login_service
            .expect_resolve()
            .withf(move |id| *id == resolved.user_id)
            .times(1)
            .return_once(move |_| Ok(Some(resolved)));
        let app = app!(login_service);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/login")
                .set_json(json!({"email": " admin@school.test ", "password": "secret"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status().as_u16(), 200);
        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("session cookie")
            .into_owned();

        let me_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(me_res.status().as_u16(), 200);
        let body: Principal = actix_test::read_body_json(me_res).await;
        assert_eq!(body, expected);
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorised() {
        let mut login_service = MockLoginService::new();
        login_service
            .expect_authenticate()
            .return_once(|_| Err(Error::unauthorized("Invalid credentials.")));
        let app = app!(login_service);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/login")
                .set_json(json!({"email": "admin@school.test", "password": "nope"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status().as_u16(), 401);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["error"], "Invalid credentials.");
    }

    #[rstest]
    #[case(json!({"email": "  ", "password": "secret"}), "email")]
    #[case(json!({"email": "admin@school.test", "password": ""}), "password")]
    #[actix_web::test]
    async fn blank_credentials_never_reach_the_service(
        #[case] payload: Value,
        #[case] field: &str,
    ) {
        let mut login_service = MockLoginService::new();
        login_service.expect_authenticate().never();
        let app = app!(login_service);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/login")
                .set_json(payload)
                .to_request(),
        )
        .await;
        assert_eq!(res.status().as_u16(), 400);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], field);
    }

    #[actix_web::test]
    async fn me_without_session_is_unauthorised() {
        let app = app!(MockLoginService::new());
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/me").to_request(),
        )
        .await;
        assert_eq!(res.status().as_u16(), 401);
    }

    #[actix_web::test]
    async fn logout_is_public() {
        let app = app!(MockLoginService::new());
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post().uri("/api/logout").to_request(),
        )
        .await;
        assert_eq!(res.status().as_u16(), 200);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["message"], "Logged out successfully.");
    }

    #[actix_web::test]
    async fn deactivated_account_loses_its_session() {
        let principal = admin();
        let mut login_service = MockLoginService::new();
        login_service
            .expect_authenticate()
            .return_once(move |_| Ok(principal));
        login_service.expect_resolve().times(1).return_once(|_| Ok(None));
        let app = app!(login_service);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/login")
                .set_json(json!({"email": "admin@school.test", "password": "secret"}))
                .to_request(),
        )
        .await;
        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("session cookie")
            .into_owned();

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status().as_u16(), 401);
        let cleared = res
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("removal cookie");
        assert_eq!(cleared.value(), "");
    }
}
