//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::web;

use super::session_config::SessionSettings;
use super::state::{HttpState, HttpStatePorts};
use crate::domain::ports::LoginService;
use crate::outbound::memory::MemoryStore;

/// Production cookie layer with a throwaway key and `Secure` off, so the
/// test client sends the cookie back over plain HTTP.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    }
    .middleware()
}

/// Handler state over an empty memory store and the given login double.
pub fn state_with_login(login: impl LoginService + 'static) -> web::Data<HttpState> {
    let store = Arc::new(MemoryStore::default());
    web::Data::new(HttpState::new(HttpStatePorts {
        students: store.clone(),
        teachers: store.clone(),
        courses: store.clone(),
        enrollments: store.clone(),
        users: store,
        login: Arc::new(login),
    }))
}
