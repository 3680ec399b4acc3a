//! Error model for the shared value types.

use thiserror::Error;

/// A level name did not match any known severity.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown severity: {0:?} (expected one of: debug, info, warn, error, fatal)")]
pub struct UnknownSeverity(pub String);

impl UnknownSeverity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}
