//! Process configuration loaded via OrthoConfig.
//!
//! Values layer CLI flags over `SCHOOLAPP_*` environment variables over an
//! optional configuration file. Session cookie settings are read separately
//! by `inbound::http::session_config`.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_IDLE: u32 = 2;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SCHOOLAPP")]
pub struct Settings {
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Listen address.
    pub bind_addr: Option<String>,
    /// Upper bound on pooled connections.
    pub db_max_connections: Option<u32>,
    /// Idle connections kept open.
    pub db_min_idle: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub db_connect_timeout_secs: Option<u64>,
    /// Apply embedded migrations at start-up.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
    /// Email of the administrator created on first start.
    pub bootstrap_admin_email: Option<String>,
    /// Password for that administrator.
    pub bootstrap_admin_password: Option<String>,
    /// Insert the placeholder teachers and students at start-up.
    #[ortho_config(default = false)]
    pub seed_example_data: bool,
}

impl Settings {
    /// Configured listen address, falling back to `0.0.0.0:8080`.
    #[must_use]
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Pool settings when a database is configured.
    #[must_use]
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self.database_url.as_deref()?.trim();
        if url.is_empty() {
            return None;
        }
        Some(
            PoolConfig::new(url)
                .with_max_size(self.db_max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS))
                .with_min_idle(Some(self.db_min_idle.unwrap_or(DEFAULT_MIN_IDLE)))
                .with_connection_timeout(Duration::from_secs(
                    self.db_connect_timeout_secs
                        .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
                )),
        )
    }

    /// Bootstrap administrator credentials; both halves must be present.
    #[must_use]
    pub fn bootstrap_admin(&self) -> Option<(&str, &str)> {
        match (
            self.bootstrap_admin_email.as_deref(),
            self.bootstrap_admin_password.as_deref(),
        ) {
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                Some((email.trim(), password))
            }
            _ => None,
        }
    }
}
