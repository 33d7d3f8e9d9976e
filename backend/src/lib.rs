//! School administration backend.
//!
//! A session-authenticated JSON API over students, teachers, courses,
//! enrollments and login accounts, plus the client-side list/detail
//! controllers that consume it.

pub mod client;
pub mod doc;
pub mod domain;
pub mod example_data;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
