//! Logging hook a database layer calls into.

use std::error::Error as StdError;
use std::fmt;
use std::time::Instant;

use sharedlog_core::LogContext;

use super::config::QueryLogLevel;

/// Callback contract between a database layer and its logger.
///
/// Implementations must be safe to call concurrently from many in-flight
/// queries and must never alter the errors they are shown.
pub trait QueryLogHook: Send + Sync {
    /// New hook with `level` replacing the current one; `self` is unchanged.
    fn log_mode(&self, level: QueryLogLevel) -> Self
    where
        Self: Sized;

    fn info(&self, ctx: &LogContext, msg: &str, data: &[&dyn fmt::Debug]);

    fn warn(&self, ctx: &LogContext, msg: &str, data: &[&dyn fmt::Debug]);

    fn error(&self, ctx: &LogContext, msg: &str, data: &[&dyn fmt::Debug]);

    /// Report a finished query.
    ///
    /// `statement` yields the executed SQL and the affected row count (`-1`
    /// when unknown). It may not be called at all when nothing is logged.
    fn trace(
        &self,
        ctx: &LogContext,
        begin: Instant,
        statement: &dyn Fn() -> (String, i64),
        err: Option<&(dyn StdError + 'static)>,
    );
}
