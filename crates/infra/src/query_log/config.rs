use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Verbosity of query logging, ordered `Silent < Error < Warn < Info`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryLogLevel {
    Silent,
    Error,
    Warn,
    Info,
}

/// Query logging settings.
///
/// Immutable once built; use [`QueryLogConfig::with_level`] to derive a copy
/// with a different level. Deserializes from
/// `{"level": "warn", "slow_threshold_ms": 500, "ignore_record_not_found": true}`
/// with every key optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLogConfig {
    pub level: QueryLogLevel,
    /// Queries slower than this are reported as slow. Zero disables the check.
    #[serde(rename = "slow_threshold_ms", with = "millis")]
    pub slow_threshold: Duration,
    /// Do not report "row not found" errors as errors.
    pub ignore_record_not_found: bool,
}

impl Default for QueryLogConfig {
    fn default() -> Self {
        Self {
            level: QueryLogLevel::Info,
            slow_threshold: Duration::from_millis(200),
            ignore_record_not_found: true,
        }
    }
}

impl QueryLogConfig {
    /// Copy of this config with `level` replaced.
    pub fn with_level(&self, level: QueryLogLevel) -> Self {
        Self {
            level,
            ..self.clone()
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
