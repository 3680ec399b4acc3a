//! Identifiers copied from the current request into each log record.

use serde::{Deserialize, Serialize};

/// Ambient identifiers for the operation being logged.
///
/// Every field is optional; an absent field is left out of the record
/// entirely rather than written as an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl LogContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn with_user_id(mut self, id: u64) -> Self {
        self.user_id = Some(id);
        self
    }

    pub fn with_tenant_id(mut self, id: u64) -> Self {
        self.tenant_id = Some(id);
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// True when no identifier is present.
    pub fn is_empty(&self) -> bool {
        self.request_id.is_none()
            && self.user_id.is_none()
            && self.tenant_id.is_none()
            && self.correlation_id.is_none()
    }
}
