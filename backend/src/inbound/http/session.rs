//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie holds only the signed-in account id. Role and active flag are
//! read from the store on every guarded request, so demotions and
//! deactivations apply to sessions already issued.

use actix_session::{Session, SessionExt};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap the Actix session for the current request.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Remember `user_id` and rotate the session id.
    ///
    /// # Errors
    /// Internal error when the session cannot be serialised.
    pub fn sign_in(&self, user_id: UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop every session value.
    pub fn sign_out(&self) {
        self.0.purge();
    }

    /// Signed-in account; a cookie that no longer decodes counts as absent.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        read_user_id(&self.0)
    }
}

pub(crate) fn read_user_id(session: &Session) -> Option<UserId> {
    match session.get::<UserId>(USER_ID_KEY) {
        Ok(user_id) => user_id,
        Err(error) => {
            warn!(%error, "discarding unreadable session account id");
            None
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self::new(req.get_session())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::test_session_middleware;
    use actix_web::{App, HttpResponse, test, web};

    fn session_cookie(res: &actix_web::dev::ServiceResponse) -> actix_web::cookie::Cookie<'static> {
        res.response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("session cookie")
            .into_owned()
    }

    #[actix_web::test]
    async fn account_id_survives_the_cookie() {
        let expected = UserId::random();
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/in",
                    web::get().to(move |session: SessionContext| async move {
                        session.sign_in(expected)?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/who",
                    web::get().to(|session: SessionContext| async move {
                        HttpResponse::Ok().json(session.user_id())
                    }),
                ),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/in").to_request()).await;
        let cookie = session_cookie(&res);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/who").cookie(cookie).to_request(),
        )
        .await;
        let body: Option<UserId> = test::read_body_json(res).await;
        assert_eq!(body, Some(expected));
    }

    #[actix_web::test]
    async fn anonymous_has_no_account() {
        let app = test::init_service(App::new().wrap(test_session_middleware()).route(
            "/who",
            web::get().to(|session: SessionContext| async move {
                HttpResponse::Ok().body(session.user_id().is_some().to_string())
            }),
        ))
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/who").to_request()).await;
        assert_eq!(test::read_body(res).await, "false");
    }

    #[actix_web::test]
    async fn garbage_account_id_is_ignored() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/poison",
                    web::get().to(|session: Session| async move {
                        session
                            .insert(USER_ID_KEY, "not an id")
                            .expect("insert");
                        HttpResponse::Ok()
                    }),
                )
                .route(
                    "/who",
                    web::get().to(|session: SessionContext| async move {
                        HttpResponse::Ok().body(session.user_id().is_some().to_string())
                    }),
                ),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/poison").to_request()).await;
        let cookie = session_cookie(&res);
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/who").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(test::read_body(res).await, "false");
    }
}
