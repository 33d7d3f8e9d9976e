//! HTTP server configuration object.

use std::net::SocketAddr;

use schoolapp::inbound::http::session_config::SessionSettings;
use schoolapp::outbound::persistence::DbPool;

/// Everything `create_server` needs besides the handler state.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            bind_addr,
            db_pool: None,
        }
    }

    /// Use the Diesel adapters backed by `pool` instead of the in-memory
    /// store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn db_pool(&self) -> Option<&DbPool> {
        self.db_pool.as_ref()
    }
}
