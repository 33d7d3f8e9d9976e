//! PostgreSQL databases for the Diesel suites.
//!
//! By default each test gets a throwaway database cloned from a migrated
//! template on a shared embedded cluster. Set `SCHOOLAPP_TEST_DATABASE_URL`
//! to run against an existing server instead; migrations are applied to it
//! and rows are left behind.
//!
//! When the cluster cannot start (no binaries and no network, say) the suite
//! prints a skip marker. Set `SCHOOLAPP_REQUIRE_TEST_CLUSTER=1` in CI to turn
//! that into a failure.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use pg_embedded_setup_unpriv::test_support::{hash_directory, shared_cluster_handle};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use schoolapp::outbound::persistence::run_migrations;
use uuid::Uuid;

use super::TEST_DATABASE_ENV;

const REQUIRE_CLUSTER_ENV: &str = "SCHOOLAPP_REQUIRE_TEST_CLUSTER";
const TEMPLATE_PREFIX: &str = "schoolapp_template";
const CLUSTER_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);
const EMBEDDED_PASSWORD: &str = "schoolapp_embedded_test";

static BOOTSTRAP_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// A database the suite may write to.
pub enum TestDatabase {
    /// Server named by `SCHOOLAPP_TEST_DATABASE_URL`.
    External(String),
    /// Temporary database on the embedded cluster, dropped with the value.
    Embedded(TemporaryDatabase),
}

impl TestDatabase {
    /// Connection URL.
    pub fn url(&self) -> &str {
        match self {
            Self::External(url) => url,
            Self::Embedded(database) => database.url(),
        }
    }
}

/// Migrated database for one test, or `None` after printing a skip marker.
///
/// Blocking; call it outside the Tokio runtime.
pub fn test_database() -> Option<TestDatabase> {
    if let Some(url) = external_url() {
        if let Err(err) = run_migrations(&url) {
            panic!("migrate {TEST_DATABASE_ENV}: {err}");
        }
        return Some(TestDatabase::External(url));
    }
    let provisioned = shared_cluster().and_then(provision_from_template);
    match provisioned {
        Ok(database) => Some(TestDatabase::Embedded(database)),
        Err(reason) => cluster_unavailable(reason),
    }
}

fn external_url() -> Option<String> {
    std::env::var(TEST_DATABASE_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty())
}

fn cluster_unavailable<T>(reason: String) -> Option<T> {
    let required = std::env::var(REQUIRE_CLUSTER_ENV)
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    assert!(!required, "test database unavailable: {reason}");
    eprintln!("SKIP-TEST-CLUSTER: {reason}");
    None
}

fn target_dir() -> PathBuf {
    std::env::var_os("CARGO_TARGET_DIR").map_or_else(
        || PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("target"),
        PathBuf::from,
    )
}

/// Cluster shared by every test in this binary.
///
/// Installation and data directories default to the cargo target directory
/// so sandboxes that forbid `/var/tmp` still work. The password is pinned so
/// a reused data directory keeps accepting connections.
fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let _bootstrap = BOOTSTRAP_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let base = target_dir().join("pg-embed").join("schoolapp");
    let overrides = [
        ("PG_RUNTIME_DIR", base.join("install")),
        ("PG_DATA_DIR", base.join("data")),
    ];
    let mut scoped: Vec<(&str, Option<String>)> = overrides
        .iter()
        .filter(|(name, _)| std::env::var_os(name).is_none())
        .map(|(name, dir)| (*name, Some(dir.to_string_lossy().into_owned())))
        .collect();
    if std::env::var_os("PG_PASSWORD").is_none() {
        scoped.push(("PG_PASSWORD", Some(EMBEDDED_PASSWORD.to_owned())));
    }
    let _env = env_lock::lock_env(scoped);

    let mut last_error = String::new();
    for attempt in 1..=CLUSTER_RETRIES {
        match shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(err) => last_error = format!("start embedded cluster: {err:?}"),
        }
        if attempt < CLUSTER_RETRIES {
            std::thread::sleep(RETRY_DELAY * attempt);
        }
    }
    Err(last_error)
}

fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

/// Template named after the migration hash, so schema edits get a fresh one.
fn template_name() -> Result<String, String> {
    let hash = hash_directory(migrations_dir()).map_err(|err| format!("hash migrations: {err}"))?;
    Ok(format!("{TEMPLATE_PREFIX}_{}", hash.get(..8).unwrap_or(&hash)))
}

fn ensure_template(cluster: &ClusterHandle) -> Result<String, String> {
    let name = template_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());
    let exists = cluster
        .database_exists(name.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(name.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        let url = cluster.connection().database_url(&name);
        run_migrations(&url).map_err(|err| format!("migrate template: {err}"))?;
    }
    Ok(name)
}

fn provision_from_template(cluster: &'static ClusterHandle) -> Result<TemporaryDatabase, String> {
    let template = ensure_template(cluster)?;
    let name = format!("test_{}", Uuid::new_v4().simple());
    cluster
        .temporary_database_from_template(name.as_str(), template.as_str())
        .map_err(|err| format!("clone {template}: {err:?}"))
}
