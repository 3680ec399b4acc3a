use std::error::Error as StdError;
use std::fmt;
use std::time::Instant;

use sharedlog_core::{LogContext, Severity};
use sharedlog_observability::{Logger, log_at};

use super::config::{QueryLogConfig, QueryLogLevel};
use super::is_record_not_found;
use super::r#trait::QueryLogHook;

/// [`QueryLogHook`] writing through a shared [`Logger`].
#[derive(Debug, Clone)]
pub struct QueryLog {
    logger: Logger,
    config: QueryLogConfig,
}

impl QueryLog {
    pub fn new(logger: Logger, config: QueryLogConfig) -> Self {
        Self { logger, config }
    }

    /// Info level, 200ms slow threshold, "row not found" suppressed.
    pub fn with_default_config(logger: Logger) -> Self {
        Self::new(logger, QueryLogConfig::default())
    }

    pub fn config(&self) -> &QueryLogConfig {
        &self.config
    }

    fn allows(&self, level: QueryLogLevel) -> bool {
        self.config.level >= level
    }
}

impl QueryLogHook for QueryLog {
    fn log_mode(&self, level: QueryLogLevel) -> Self {
        Self {
            logger: self.logger.clone(),
            config: self.config.with_level(level),
        }
    }

    fn info(&self, ctx: &LogContext, msg: &str, data: &[&dyn fmt::Debug]) {
        if self.allows(QueryLogLevel::Info) {
            log_at!(self.logger, Severity::Info, context: ctx, data = ?data, "database info: {}", msg);
        }
    }

    fn warn(&self, ctx: &LogContext, msg: &str, data: &[&dyn fmt::Debug]) {
        if self.allows(QueryLogLevel::Warn) {
            log_at!(self.logger, Severity::Warn, context: ctx, data = ?data, "database warning: {}", msg);
        }
    }

    fn error(&self, ctx: &LogContext, msg: &str, data: &[&dyn fmt::Debug]) {
        if self.allows(QueryLogLevel::Error) {
            log_at!(self.logger, Severity::Error, context: ctx, data = ?data, "database error: {}", msg);
        }
    }

    fn trace(
        &self,
        ctx: &LogContext,
        begin: Instant,
        statement: &dyn Fn() -> (String, i64),
        err: Option<&(dyn StdError + 'static)>,
    ) {
        if self.config.level <= QueryLogLevel::Silent {
            return;
        }

        let elapsed = begin.elapsed();
        let (sql, rows) = statement();
        let threshold = self.config.slow_threshold;

        match err {
            Some(err)
                if self.allows(QueryLogLevel::Error)
                    && !(self.config.ignore_record_not_found && is_record_not_found(err)) =>
            {
                log_at!(
                    self.logger,
                    Severity::Error,
                    context: ctx,
                    elapsed = elapsed.as_secs_f64(),
                    rows_affected = rows,
                    sql = sql.as_str(),
                    error = %err,
                    "Database query error"
                );
            }
            _ if !threshold.is_zero()
                && elapsed > threshold
                && self.allows(QueryLogLevel::Warn) =>
            {
                log_at!(
                    self.logger,
                    Severity::Warn,
                    context: ctx,
                    elapsed = elapsed.as_secs_f64(),
                    rows_affected = rows,
                    sql = sql.as_str(),
                    slow_threshold = threshold.as_secs_f64(),
                    is_slow_query = true,
                    "Slow database query detected"
                );
            }
            _ if self.allows(QueryLogLevel::Info) => {
                log_at!(
                    self.logger,
                    Severity::Debug,
                    context: ctx,
                    elapsed = elapsed.as_secs_f64(),
                    rows_affected = rows,
                    sql = sql.as_str(),
                    "Database query executed"
                );
            }
            _ => {}
        }
    }
}
