use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use axum::extract::Request;

use sharedlog_core::LogContext;

/// Per-request logging scope.
///
/// Stored in request extensions by whichever middleware runs first and shared
/// (by handle) with everything downstream. Identifier fields are write-once;
/// handler errors are append-only.
#[derive(Debug, Clone, Default)]
pub struct RequestScope {
    inner: Arc<ScopeFields>,
}

#[derive(Debug, Default)]
struct ScopeFields {
    request_id: OnceLock<String>,
    user_id: OnceLock<u64>,
    tenant_id: OnceLock<u64>,
    correlation_id: OnceLock<String>,
    errors: Mutex<Vec<String>>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// The scope attached to `req`, inserting a fresh one if there is none.
    pub fn ensure(req: &mut Request) -> Self {
        if let Some(scope) = req.extensions().get::<RequestScope>() {
            return scope.clone();
        }

        let scope = RequestScope::new();
        req.extensions_mut().insert(scope.clone());
        scope
    }

    /// Set the request ID unless one is already present; returns the stored ID.
    pub fn assign_request_id(&self, id: impl Into<String>) -> &str {
        let id = id.into();
        self.inner.request_id.get_or_init(|| id)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.inner.request_id.get().map(String::as_str)
    }

    /// Returns `false` if a user ID was already set.
    pub fn set_user_id(&self, id: u64) -> bool {
        self.inner.user_id.set(id).is_ok()
    }

    pub fn user_id(&self) -> Option<u64> {
        self.inner.user_id.get().copied()
    }

    /// Returns `false` if a tenant ID was already set.
    pub fn set_tenant_id(&self, id: u64) -> bool {
        self.inner.tenant_id.set(id).is_ok()
    }

    pub fn tenant_id(&self) -> Option<u64> {
        self.inner.tenant_id.get().copied()
    }

    /// Returns `false` if a correlation ID was already set.
    pub fn set_correlation_id(&self, id: impl Into<String>) -> bool {
        self.inner.correlation_id.set(id.into()).is_ok()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.inner.correlation_id.get().map(String::as_str)
    }

    /// Record a handler error for the access log.
    pub fn push_error(&self, err: impl fmt::Display) {
        self.inner
            .errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(err.to_string());
    }

    /// Errors recorded so far, in push order.
    pub fn errors(&self) -> Vec<String> {
        self.inner
            .errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of the identifiers, e.g. to hand to the query logger.
    pub fn log_context(&self) -> LogContext {
        LogContext {
            request_id: self.request_id().map(str::to_owned),
            user_id: self.user_id(),
            tenant_id: self.tenant_id(),
            correlation_id: self.correlation_id().map(str::to_owned),
        }
    }
}
