//! Session and role guard for the `/api` scope.
//!
//! Every request is checked against [`required_access`] before routing
//! reaches a handler, so no handler can forget a check. The guard needs the
//! session middleware to run first: wrap `Authorize` before the session layer
//! (Actix applies the last `wrap` outermost).
//!
//! The session only names an account. Its role and active flag are resolved
//! through [`crate::domain::ports::LoginService::resolve`] on every guarded
//! request; a session whose account is gone or inactive is purged and
//! treated as signed out.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_session::SessionExt;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use actix_web::{Error, HttpMessage, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, info};

use crate::domain::{Error as DomainError, Principal, Role};
use crate::inbound::http::session::read_user_id;
use crate::inbound::http::state::HttpState;

/// Who may call a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No session needed.
    Public,
    /// Any signed-in account.
    Session,
    /// Signed-in account holding one of these roles.
    Roles(&'static [Role]),
}

const STAFF: &[Role] = &[Role::Admin, Role::Teacher];
const ADMIN: &[Role] = &[Role::Admin];

/// Access rule for `method` on the percent-decoded `path`.
///
/// Callers must pass the path the router matches on, not the raw request
/// target. Unknown collections stay readable by any session, while writes to
/// them need an administrator.
///
/// # Examples
/// ```
/// use actix_web::http::Method;
/// use schoolapp::middleware::authorize::{Access, required_access};
///
/// assert_eq!(required_access(&Method::POST, "/api/login"), Access::Public);
/// assert_eq!(required_access(&Method::GET, "/api/students"), Access::Session);
/// ```
#[must_use]
pub fn required_access(method: &Method, path: &str) -> Access {
    let rest = path.strip_prefix("/api").unwrap_or(path);
    let collection = rest.trim_start_matches('/').split('/').next().unwrap_or("");
    let reading = *method == Method::GET || *method == Method::HEAD;

    match collection {
        "login" | "logout" => Access::Public,
        "me" => Access::Session,
        "students" | "Enrollments" if reading => Access::Session,
        "teachers" | "courses" if reading => Access::Roles(STAFF),
        "students" | "Enrollments" | "teachers" | "courses" | "users" => Access::Roles(ADMIN),
        _ if reading => Access::Session,
        _ => Access::Roles(ADMIN),
    }
}

fn check(access: Access, principal: Option<&Principal>) -> Result<(), DomainError> {
    match (access, principal) {
        (Access::Public, _) => Ok(()),
        (_, None) => Err(DomainError::unauthorized("Unauthorized")),
        (Access::Session, Some(_)) => Ok(()),
        (Access::Roles(roles), Some(p)) if roles.contains(&p.role) => Ok(()),
        (Access::Roles(_), Some(_)) => Err(DomainError::forbidden("Forbidden")),
    }
}

/// Principal for the session's account as the store sees it now.
async fn current_principal(req: &ServiceRequest) -> Result<Option<Principal>, DomainError> {
    let session = req.get_session();
    let Some(user_id) = read_user_id(&session) else {
        return Ok(None);
    };
    let state = req
        .app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| DomainError::internal("HTTP state is not configured"))?;
    let principal = state.login.resolve(user_id).await?;
    if principal.is_none() {
        info!(%user_id, "session account is gone or inactive; signing out");
        session.purge();
    }
    Ok(principal)
}

/// Guard middleware; see the module docs.
#[derive(Clone, Default)]
pub struct Authorize;

impl<S, B> Transform<S, ServiceRequest> for Authorize
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthorizeMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthorizeMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Service produced by [`Authorize`].
pub struct AuthorizeMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthorizeMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let access = required_access(req.method(), req.match_info().as_str());
            if access == Access::Public {
                return service.call(req).await.map(ServiceResponse::map_into_left_body);
            }
            let decision = match current_principal(&req).await {
                Ok(principal) => check(access, principal.as_ref()).map(|()| principal),
                Err(err) => Err(err),
            };
            match decision {
                Ok(principal) => {
                    if let Some(principal) = principal {
                        req.extensions_mut().insert(principal);
                    }
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Err(err) => {
                    debug!(path = req.path(), ?access, code = %err.code(), "request refused");
                    Ok(req.error_response(err).map_into_right_body())
                }
            }
        })
    }
}
