//! Backend entry-point: loads configuration, prepares storage, and serves
//! the `/api` surface with health checks and OpenAPI docs.

mod server;

use std::net::SocketAddr;

use actix_web::web;
use color_eyre::eyre::{WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use schoolapp::domain::{RecordGateway, ensure_admin_account};
use schoolapp::example_data::{PlaceholderData, seed_example_data};
use schoolapp::inbound::http::health::HealthState;
use schoolapp::inbound::http::session_config::{BuildMode, session_settings_from_env};
use schoolapp::inbound::http::state::HttpState;
use schoolapp::outbound::persistence::{DbPool, run_migrations};
use schoolapp::settings::Settings;
use server::{ServerConfig, Stores, build_stores, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = Settings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    let bind_addr: SocketAddr = settings
        .bind_addr()
        .parse()
        .wrap_err_with(|| format!("invalid bind address {}", settings.bind_addr()))?;

    let pool = open_database(&settings).await?;
    let mut config = ServerConfig::new(session, bind_addr);
    if let Some(pool) = &pool {
        config = config.with_db_pool(pool.clone());
    }

    let Stores { ports, credentials } = build_stores(config.db_pool());
    if let Some((email, password)) = settings.bootstrap_admin() {
        ensure_admin_account(credentials.as_ref(), email, password)
            .await
            .map_err(|err| eyre!("bootstrap administrator failed: {}", err.message()))?;
    }
    if settings.seed_example_data {
        let data = PlaceholderData::bundled()?;
        seed_example_data(
            &RecordGateway::new(ports.teachers.clone()),
            &RecordGateway::new(ports.students.clone()),
            &data,
        )
        .await
        .wrap_err("placeholder data seeding failed")?;
    } else {
        info!(reason = "disabled", "placeholder data seeding skipped");
    }

    let health_state = web::Data::new(HealthState::new());
    let http_state = web::Data::new(HttpState::new(ports));
    info!(%bind_addr, "listening");
    let served = create_server(health_state.clone(), config, http_state)?.await;

    health_state.mark_unhealthy();
    drop(pool);
    info!("server stopped");
    served.wrap_err("server terminated with an error")
}

/// Build the pool and apply migrations when a database is configured.
async fn open_database(settings: &Settings) -> color_eyre::Result<Option<DbPool>> {
    let Some(pool_config) = settings.pool_config() else {
        return Ok(None);
    };
    if settings.run_migrations {
        let url = pool_config.database_url().to_owned();
        tokio::task::spawn_blocking(move || run_migrations(&url))
            .await
            .wrap_err("migration task panicked")?
            .wrap_err("failed to apply migrations")?;
        info!("database migrations applied");
    }
    let pool = DbPool::new(pool_config)
        .await
        .wrap_err("failed to build database pool")?;
    Ok(Some(pool))
}
