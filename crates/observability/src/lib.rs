//! Structured logger factory (shared setup).
//!
//! Builds [`Logger`] instances from a [`LoggerConfig`]. Every record written
//! through a logger carries `timestamp`, `level`, `caller` and `message`,
//! plus `service_name` when one was configured.

pub mod config;
pub mod error;
pub mod format;
pub mod logger;
mod macros;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use format::{Encoding, Profile, RecordFormat};
pub use logger::Logger;
pub use sharedlog_core::{LogContext, Severity};

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}

/// Initialize process-wide logging from the environment.
///
/// Builds a logger from [`LoggerConfig::from_env`] and installs it as the
/// global default. Safe to call multiple times: if a global logger is already
/// installed, the new logger is still returned but the global one is kept.
pub fn init(service_name: &str) -> Result<Logger, LoggerError> {
    let logger = Logger::new(&LoggerConfig::from_env(service_name))?;

    match logger.install_global() {
        Ok(()) | Err(LoggerError::AlreadyInstalled) => Ok(logger),
        Err(e) => Err(e),
    }
}
