//! Request middleware: trace identifiers and the access guard.

pub mod authorize;
pub mod trace;

pub use authorize::Authorize;
pub use trace::Trace;
