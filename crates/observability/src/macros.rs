/// Emit one record through a [`Logger`](crate::Logger) at a runtime-chosen
/// severity.
///
/// Fields use `tracing` syntax and the message comes last:
///
/// ```ignore
/// log_at!(logger, Severity::Warn, http_status = 404u64, "HTTP request client error");
/// log_at!(logger, Severity::Error, context: &ctx, error = %err, "Database query error");
/// ```
///
/// With `context:`, whichever of `request_id`, `user_id`, `tenant_id` and
/// `correlation_id` are present in the [`LogContext`](crate::LogContext) are
/// written ahead of the other fields; absent ones are omitted.
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $severity:expr, context: $ctx:expr, $($rest:tt)+) => {{
        let ctx: &$crate::LogContext = $ctx;
        $crate::log_at!(
            $logger,
            $severity,
            request_id = ctx.request_id.as_deref(),
            user_id = ctx.user_id,
            tenant_id = ctx.tenant_id,
            correlation_id = ctx.correlation_id.as_deref(),
            $($rest)+
        )
    }};
    ($logger:expr, $severity:expr, $($rest:tt)+) => {{
        let logger: &$crate::Logger = &$logger;
        let severity: $crate::Severity = $severity;
        if logger.enabled(severity) {
            logger.in_scope(|| match severity {
                $crate::Severity::Debug => $crate::__private::tracing::debug!($($rest)+),
                $crate::Severity::Info => $crate::__private::tracing::info!($($rest)+),
                $crate::Severity::Warn => $crate::__private::tracing::warn!($($rest)+),
                $crate::Severity::Error => $crate::__private::tracing::error!($($rest)+),
                $crate::Severity::Fatal => {
                    $crate::__private::tracing::error!(__sharedlog_fatal = true, $($rest)+)
                }
            });
        }
    }};
}
