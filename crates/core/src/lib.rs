//! Value types shared by the logger factory, the query log
//! adapter and the HTTP middleware.
//!
//! Nothing in here touches a sink; these are pure values.

pub mod context;
pub mod error;
pub mod severity;

pub use context::LogContext;
pub use error::UnknownSeverity;
pub use severity::Severity;
