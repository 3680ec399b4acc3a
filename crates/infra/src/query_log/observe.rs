//! Timing `sqlx` queries through a [`QueryLogHook`].

use std::error::Error as StdError;
use std::future::Future;
use std::time::Instant;

use sharedlog_core::LogContext;

use super::logger::QueryLog;
use super::r#trait::QueryLogHook;

/// Row count reported for a successful query result.
pub trait AffectedRows {
    fn affected_rows(&self) -> i64;
}

impl AffectedRows for sqlx::postgres::PgQueryResult {
    fn affected_rows(&self) -> i64 {
        i64::try_from(self.rows_affected()).unwrap_or(i64::MAX)
    }
}

impl AffectedRows for u64 {
    fn affected_rows(&self) -> i64 {
        i64::try_from(*self).unwrap_or(i64::MAX)
    }
}

impl<T> AffectedRows for Vec<T> {
    fn affected_rows(&self) -> i64 {
        i64::try_from(self.len()).unwrap_or(i64::MAX)
    }
}

impl<T> AffectedRows for Option<T> {
    fn affected_rows(&self) -> i64 {
        i64::from(self.is_some())
    }
}

impl QueryLog {
    /// Await `query`, report it via [`QueryLogHook::trace`], and hand back its
    /// result untouched.
    ///
    /// ```ignore
    /// let row = query_log
    ///     .observe(&ctx, SQL, sqlx::query(SQL).bind(id).fetch_optional(&pool))
    ///     .await?;
    /// ```
    pub async fn observe<F, T, E>(&self, ctx: &LogContext, sql: &str, query: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        T: AffectedRows,
        E: StdError + 'static,
    {
        let begin = Instant::now();
        let result = query.await;

        let rows = match &result {
            Ok(value) => value.affected_rows(),
            Err(_) => -1,
        };
        let statement = || (sql.to_string(), rows);
        let err = result.as_ref().err().map(|e| e as &(dyn StdError + 'static));

        self.trace(ctx, begin, &statement, err);
        result
    }
}
