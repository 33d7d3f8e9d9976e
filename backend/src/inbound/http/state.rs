//! Shared HTTP adapter state.
//!
//! Handlers receive this state through `web::Data` and only see gateways and
//! ports, so the whole HTTP surface runs against the in-memory store in
//! tests.

use std::sync::Arc;

use crate::domain::ports::{LoginService, RecordRepository};
use crate::domain::{Account, Course, EnrollmentView, RecordGateway, Resource, Student, Teacher};

/// Repositories backing each record kind.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub students: Arc<dyn RecordRepository<Student>>,
    pub teachers: Arc<dyn RecordRepository<Teacher>>,
    pub courses: Arc<dyn RecordRepository<Course>>,
    pub enrollments: Arc<dyn RecordRepository<EnrollmentView>>,
    pub users: Arc<dyn RecordRepository<Account>>,
    pub login: Arc<dyn LoginService>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub students: RecordGateway<Student>,
    pub teachers: RecordGateway<Teacher>,
    pub courses: RecordGateway<Course>,
    pub enrollments: RecordGateway<EnrollmentView>,
    pub users: RecordGateway<Account>,
    pub login: Arc<dyn LoginService>,
}

impl HttpState {
    /// Wrap every repository in its gateway.
    #[must_use]
    pub fn new(ports: HttpStatePorts) -> Self {
        Self {
            students: RecordGateway::new(ports.students),
            teachers: RecordGateway::new(ports.teachers),
            courses: RecordGateway::new(ports.courses),
            enrollments: RecordGateway::new(ports.enrollments),
            users: RecordGateway::new(ports.users),
            login: ports.login,
        }
    }
}

/// Record kinds that have a gateway in [`HttpState`].
pub trait Served: Resource {
    fn gateway(state: &HttpState) -> &RecordGateway<Self>;
}

macro_rules! served {
    ($($record:ty => $field:ident),+ $(,)?) => {
        $(
            impl Served for $record {
                fn gateway(state: &HttpState) -> &RecordGateway<Self> {
                    &state.$field
                }
            }
        )+
    };
}

served! {
    Student => students,
    Teacher => teachers,
    Course => courses,
    EnrollmentView => enrollments,
    Account => users,
}
