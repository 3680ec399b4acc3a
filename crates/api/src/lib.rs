//! HTTP request logging: scope, middleware and router wiring.

pub mod app;
pub mod context;
pub mod errors;
pub mod middleware;

pub use context::RequestScope;
