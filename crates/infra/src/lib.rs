//! Infrastructure adapters: database query logging.

pub mod query_log;

pub use query_log::{
    AffectedRows, QueryLog, QueryLogConfig, QueryLogHook, QueryLogLevel, is_record_not_found,
};
