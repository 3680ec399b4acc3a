//! Database query logging.
//!
//! [`QueryLog`] turns query execution events into structured records through
//! a [`sharedlog_observability::Logger`]. Each finished query lands in one of
//! three buckets, checked in this order:
//!
//! | Condition | Severity | Message |
//! |-----------|----------|---------|
//! | error present, level ≥ `Error`, not a suppressed "row not found" | error | `Database query error` |
//! | elapsed > slow threshold (> 0), level ≥ `Warn` | warn | `Slow database query detected` |
//! | level ≥ `Info` | debug | `Database query executed` |
//!
//! Query errors are only observed here; callers always get them back
//! unchanged.

pub mod config;
pub mod logger;
pub mod observe;
pub mod r#trait;

pub use config::{QueryLogConfig, QueryLogLevel};
pub use logger::QueryLog;
pub use observe::AffectedRows;
pub use r#trait::QueryLogHook;

use std::error::Error as StdError;

/// Whether `err`, or any error in its `source()` chain, is
/// [`sqlx::Error::RowNotFound`].
pub fn is_record_not_found(err: &(dyn StdError + 'static)) -> bool {
    std::iter::successors(Some(err), |&e| e.source())
        .any(|e| matches!(e.downcast_ref::<sqlx::Error>(), Some(sqlx::Error::RowNotFound)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("loading invoice failed")]
    struct LoadInvoice(#[source] sqlx::Error);

    #[test]
    fn detects_row_not_found_directly_and_through_sources() {
        assert!(is_record_not_found(&sqlx::Error::RowNotFound));
        assert!(is_record_not_found(&LoadInvoice(sqlx::Error::RowNotFound)));
    }

    #[derive(Debug, thiserror::Error)]
    #[error("rendering statement failed")]
    struct RenderStatement(#[source] LoadInvoice);

    #[test]
    fn walks_nested_sources() {
        let nested = RenderStatement(LoadInvoice(sqlx::Error::RowNotFound));
        assert!(is_record_not_found(&nested));

        let boxed: Box<dyn StdError + Send + Sync> = Box::new(nested);
        assert!(is_record_not_found(boxed.as_ref()));
    }

        #[test]
    fn other_errors_are_not_row_not_found() {
        assert!(!is_record_not_found(&sqlx::Error::PoolTimedOut));
        assert!(!is_record_not_found(&LoadInvoice(sqlx::Error::PoolClosed)));
    }
}
