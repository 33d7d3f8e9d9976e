//! HTTP inbound adapter exposing the `/api` surface.

pub mod auth;
pub mod courses;
pub mod enrollments;
pub mod error;
pub mod health;
pub mod resource;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub mod students;
pub mod teachers;
#[cfg(test)]
pub mod test_utils;
pub mod users;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api` route.
///
/// Mount inside a scope wrapped by the authorisation guard and a session
/// middleware. The guard resolves accounts through the `HttpState` app
/// data, so register that on the app as well:
///
/// ```
/// use actix_web::{App, web};
/// use actix_session::{SessionMiddleware, storage::CookieSessionStore};
/// use actix_web::cookie::Key;
/// use schoolapp::middleware::Authorize;
///
/// let session = SessionMiddleware::new(CookieSessionStore::default(), Key::generate());
/// let app = App::new().service(
///     web::scope("/api")
///         .wrap(Authorize)
///         .wrap(session)
///         .configure(schoolapp::inbound::http::configure),
/// );
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    auth::configure(cfg);
    students::configure(cfg);
    teachers::configure(cfg);
    courses::configure(cfg);
    enrollments::configure(cfg);
    users::configure(cfg);
}
