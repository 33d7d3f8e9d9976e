//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each repository implements the domain's `RecordRepository` port for one
//! resource, with async access through `diesel-async` and a `bb8` pool.
//! Row structs (`models.rs`) and the table definitions (`schema.rs`) stay
//! private to this module; callers only see domain types and
//! [`RepositoryError`](crate::domain::ports::RepositoryError).
//!
//! # Example
//!
//! ```ignore
//! use schoolapp::outbound::persistence::{DbPool, DieselStudentRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/school")).await?;
//! let students = DieselStudentRepository::new(pool);
//! ```

mod diesel_account_repository;
mod diesel_course_repository;
mod diesel_enrollment_repository;
mod diesel_student_repository;
mod diesel_teacher_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_course_repository::DieselCourseRepository;
pub use diesel_enrollment_repository::DieselEnrollmentRepository;
pub use diesel_student_repository::DieselStudentRepository;
pub use diesel_teacher_repository::DieselTeacherRepository;
pub use migrations::run_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};
