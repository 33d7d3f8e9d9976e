//! Port wiring: Diesel adapters when a pool exists, otherwise one shared
//! in-memory store.

use std::sync::Arc;

use schoolapp::domain::CredentialLoginService;
use schoolapp::domain::ports::CredentialRepository;
use schoolapp::inbound::http::state::HttpStatePorts;
use schoolapp::outbound::memory::MemoryStore;
use schoolapp::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselCourseRepository, DieselEnrollmentRepository,
    DieselStudentRepository, DieselTeacherRepository,
};
use tracing::{info, warn};

/// Handler ports plus the credential store used for the admin bootstrap.
pub struct Stores {
    pub ports: HttpStatePorts,
    pub credentials: Arc<dyn CredentialRepository>,
}

fn with_login(
    credentials: Arc<dyn CredentialRepository>,
    build: impl FnOnce(Arc<CredentialLoginService>) -> HttpStatePorts,
) -> Stores {
    let login = Arc::new(CredentialLoginService::new(credentials.clone()));
    Stores {
        ports: build(login),
        credentials,
    }
}

fn diesel_stores(pool: &DbPool) -> Stores {
    let accounts = Arc::new(DieselAccountRepository::new(pool.clone()));
    with_login(accounts.clone(), |login| HttpStatePorts {
        students: Arc::new(DieselStudentRepository::new(pool.clone())),
        teachers: Arc::new(DieselTeacherRepository::new(pool.clone())),
        courses: Arc::new(DieselCourseRepository::new(pool.clone())),
        enrollments: Arc::new(DieselEnrollmentRepository::new(pool.clone())),
        users: accounts,
        login,
    })
}

fn memory_stores() -> Stores {
    let store = Arc::new(MemoryStore::default());
    with_login(store.clone(), |login| HttpStatePorts {
        students: store.clone(),
        teachers: store.clone(),
        courses: store.clone(),
        enrollments: store.clone(),
        users: store,
        login,
    })
}

/// Choose adapters for the configured backend.
pub fn build_stores(pool: Option<&DbPool>) -> Stores {
    match pool {
        Some(pool) => {
            info!("using PostgreSQL-backed repositories");
            diesel_stores(pool)
        }
        None => {
            warn!("no database configured; records live in process memory only");
            memory_stores()
        }
    }
}
