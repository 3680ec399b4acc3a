//! Logger configuration.

use serde::{Deserialize, Serialize};

use sharedlog_core::Severity;

/// Configuration for [`crate::Logger`] construction.
///
/// Created once at process start and read-only afterwards. Field names match
/// the `level` / `format` / `output` / `service_name` keys used by service
/// config files; loading those files is left to the embedding service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// One of `debug`, `info`, `warn`, `error`, `fatal`. Anything else is
    /// treated as `info`.
    pub level: String,

    /// `json` or `console`. Empty picks the profile's default encoding.
    pub format: String,

    /// `stdout`, `stderr`, or a file path opened for appending.
    pub output: String,

    /// Added to every record as `service_name` when non-empty.
    pub service_name: String,

    /// Optional `EnvFilter` directive (e.g. `"info,sqlx=warn"`) applied to
    /// every event reaching the logger, including third-party ones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
            output: "stdout".to_string(),
            service_name: String::new(),
            filter: None,
        }
    }
}

impl LoggerConfig {
    /// Production defaults (`info`, `json`, `stdout`) for the given service.
    pub fn default_for(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Self::default()
        }
    }

    /// Development preset: `debug` level, human-readable console encoding.
    pub fn development(service_name: impl Into<String>) -> Self {
        Self {
            level: "debug".to_string(),
            format: "console".to_string(),
            ..Self::default_for(service_name)
        }
    }

    /// Production preset: `info` level, JSON encoding.
    pub fn production(service_name: impl Into<String>) -> Self {
        Self::default_for(service_name)
    }

    /// Production defaults overridden by `LOG_LEVEL`, `LOG_FORMAT`,
    /// `LOG_OUTPUT`, `SERVICE_NAME` and `RUST_LOG`.
    pub fn from_env(service_name: &str) -> Self {
        Self::from_lookup(service_name, |key| std::env::var(key).ok())
    }

    fn from_lookup(service_name: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default_for(service_name);
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            level: var("LOG_LEVEL").unwrap_or(defaults.level),
            format: var("LOG_FORMAT").unwrap_or(defaults.format),
            output: var("LOG_OUTPUT").unwrap_or(defaults.output),
            service_name: var("SERVICE_NAME").unwrap_or(defaults.service_name),
            filter: var("RUST_LOG"),
        }
    }

    /// Parsed severity threshold; unknown names fall back to `info`.
    pub fn severity(&self) -> Severity {
        self.level.parse().unwrap_or(Severity::Info)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn presets_differ_only_in_level_and_format() {
        let dev = LoggerConfig::development("billing");
        let prod = LoggerConfig::production("billing");

        assert_eq!(dev.level, "debug");
        assert_eq!(dev.format, "console");
        assert_eq!(prod.level, "info");
        assert_eq!(prod.format, "json");
        assert_eq!(dev.output, prod.output);
        assert_eq!(dev.service_name, "billing");
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let config = LoggerConfig {
            level: "chatty".to_string(),
            ..LoggerConfig::default()
        };
        assert_eq!(config.severity(), Severity::Info);
    }

    #[test]
    fn environment_overrides_defaults() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LOG_LEVEL", "warn"),
            ("LOG_OUTPUT", "stderr"),
            ("LOG_FORMAT", "  "),
            ("RUST_LOG", "info,sqlx=warn"),
        ]);
        let config =
            LoggerConfig::from_lookup("orders", |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.level, "warn");
        assert_eq!(config.output, "stderr");
        assert_eq!(config.format, "json");
        assert_eq!(config.service_name, "orders");
        assert_eq!(config.filter.as_deref(), Some("info,sqlx=warn"));
    }

    #[test]
    fn deserializes_partial_documents() {
        let config: LoggerConfig =
            serde_json::from_str(r#"{"level":"error","service_name":"gateway"}"#).unwrap();

        assert_eq!(config.severity(), Severity::Error);
        assert_eq!(config.format, "json");
        assert_eq!(config.output, "stdout");
        assert_eq!(config.service_name, "gateway");
        assert!(config.filter.is_none());
    }
}
