//! Domain ports and supporting types for the hexagonal boundary.

mod credential_repository;
mod login_service;
mod record_repository;

#[cfg(test)]
pub use credential_repository::MockCredentialRepository;
pub use credential_repository::CredentialRepository;
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
pub use record_repository::{RecordRepository, RepositoryError};
