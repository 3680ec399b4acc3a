//! Logger factory.

use std::fs::OpenOptions;
use std::io;
use std::panic::Location;
use std::sync::Mutex;

use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

use sharedlog_core::Severity;

use crate::config::LoggerConfig;
use crate::error::LoggerError;
use crate::format::{Encoding, Profile, RecordFormat, short_caller};

/// A configured structured logger.
///
/// Cheap to clone and safe to share across threads; every clone writes to
/// the same sink. Records are emitted with [`crate::log_at!`] or the
/// per-severity helpers below.
#[derive(Debug, Clone)]
pub struct Logger {
    dispatch: Dispatch,
    level: Severity,
    profile: Profile,
    directive: bool,
}

impl Logger {
    /// Build a logger writing to the configured output target.
    pub fn new(config: &LoggerConfig) -> Result<Self, LoggerError> {
        let writer = open_output(&config.output)?;
        Self::with_writer(config, writer)
    }

    /// Build a logger writing to an arbitrary sink; `config.output` is ignored.
    pub fn with_writer<W>(config: &LoggerConfig, writer: W) -> Result<Self, LoggerError>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let level = config.severity();
        let profile = Profile::for_severity(level);
        let encoding = Encoding::resolve(&config.format, profile)?;

        let format = RecordFormat::new(encoding)
            .with_service_name(config.service_name.clone())
            .with_target(profile.includes_target())
            .with_stacktrace_at(profile.stacktrace_level());

        let filter = match config.filter.as_deref() {
            Some(directives) => EnvFilter::try_new(directives)?,
            None => EnvFilter::default().add_directive(level.as_level_filter().into()),
        };

        let records = tracing_subscriber::fmt::layer()
            .event_format(format)
            .with_writer(writer)
            .with_filter(filter);

        let subscriber = tracing_subscriber::registry().with(records);

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
            level,
            profile,
            directive: config.filter.is_some(),
        })
    }

    /// Debug level, console encoding, stdout.
    pub fn development(service_name: &str) -> Result<Self, LoggerError> {
        Self::new(&LoggerConfig::development(service_name))
    }

    /// Info level, JSON encoding, stdout.
    pub fn production(service_name: &str) -> Result<Self, LoggerError> {
        Self::new(&LoggerConfig::production(service_name))
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Whether a record of `severity` may be written.
    ///
    /// With a filter directive configured, the directive alone decides per
    /// event and this always returns `true`.
    pub fn enabled(&self, severity: Severity) -> bool {
        self.directive || self.level.allows(severity)
    }

    /// Run `f` with this logger as the current `tracing` dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Make this logger the process-wide default for all `tracing` events.
    pub fn install_global(&self) -> Result<(), LoggerError> {
        tracing::dispatcher::set_global_default(self.dispatch.clone())
            .map_err(|_| LoggerError::AlreadyInstalled)
    }

    #[track_caller]
    pub fn debug(&self, message: &str) {
        self.emit(Severity::Debug, message, Location::caller());
    }

    #[track_caller]
    pub fn info(&self, message: &str) {
        self.emit(Severity::Info, message, Location::caller());
    }

    #[track_caller]
    pub fn warn(&self, message: &str) {
        self.emit(Severity::Warn, message, Location::caller());
    }

    #[track_caller]
    pub fn error(&self, message: &str) {
        self.emit(Severity::Error, message, Location::caller());
    }

    /// Writes a `fatal` record. Does not terminate the process.
    #[track_caller]
    pub fn fatal(&self, message: &str) {
        self.emit(Severity::Fatal, message, Location::caller());
    }

    /// Helper records report the helper's caller, not this file.
    fn emit(&self, severity: Severity, message: &str, location: &Location<'_>) {
        if !self.enabled(severity) {
            return;
        }
        let caller = short_caller(location.file(), Some(location.line()));
        crate::log_at!(
            self,
            severity,
            __sharedlog_caller = caller.as_str(),
            "{}",
            message
        );
    }
}

fn open_output(target: &str) -> Result<BoxMakeWriter, LoggerError> {
    match target.trim() {
        "" => Err(LoggerError::EmptyOutput),
        "stdout" => Ok(BoxMakeWriter::new(io::stdout)),
        "stderr" => Ok(BoxMakeWriter::new(io::stderr)),
        path => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggerError::Output {
                    target: path.to_string(),
                    source,
                })?;
            Ok(BoxMakeWriter::new(Mutex::new(file)))
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::testing::CapturedLogs;

    fn config(level: &str, format: &str) -> LoggerConfig {
        LoggerConfig {
            level: level.to_string(),
            format: format.to_string(),
            service_name: "inventory".to_string(),
            ..LoggerConfig::default()
        }
    }

    #[test]
    fn json_records_carry_the_fixed_field_set() {
        let logs = CapturedLogs::new();
        let logger = logs.logger(&config("info", "json"));

        logger.info("started");

        let records = logs.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record["level"], "info");
        assert_eq!(record["message"], "started");
        assert_eq!(record["service_name"], "inventory");
        assert!(record["caller"].as_str().unwrap().contains("logger.rs:"));

        let timestamp = record["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
        assert!(record.get("target").is_none());
    }

    #[test]
    fn key_order_is_stable() {
        let logs = CapturedLogs::new();
        let logger = logs.logger(&config("info", "json"));

        crate::log_at!(logger, Severity::Warn, rows = 3u64, "slow");

        let keys: Vec<String> = logs.records()[0]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(
            keys,
            ["timestamp", "level", "caller", "message", "service_name", "rows"]
        );
    }

    #[test]
    fn service_name_is_omitted_when_empty() {
        let logs = CapturedLogs::new();
        let logger = logs.logger(&LoggerConfig::default());

        logger.warn("no service");

        assert!(logs.records()[0].get("service_name").is_none());
    }

    #[test]
    fn debug_level_uses_development_profile() {
        let logs = CapturedLogs::new();
        let logger = logs.logger(&config("debug", ""));

        logger.debug("verbose");

        assert_eq!(logger.profile(), Profile::Development);
        let line = logs.contents();
        let columns: Vec<&str> = line.trim_end().split('\t').collect();
        assert_eq!(columns[1], "debug");
        assert_eq!(columns[3], "verbose");
        let tail: serde_json::Value = serde_json::from_str(columns[4]).unwrap();
        assert_eq!(tail["service_name"], "inventory");
        assert!(tail["target"].as_str().unwrap().contains("sharedlog_observability"));
    }

    #[test]
    fn fatal_records_are_labelled_fatal() {
        let logs = CapturedLogs::new();
        let logger = logs.logger(&config("fatal", "json"));

        logger.error("dropped");
        logger.fatal("kept");

        let records = logs.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["level"], "fatal");
        assert_eq!(records[0]["message"], "kept");
        assert!(records[0].get("__sharedlog_fatal").is_none());
    }

    #[test]
    fn a_fatal_field_does_not_relabel_the_record() {
        let logs = CapturedLogs::new();
        let logger = logs.logger(&config("info", "json"));

        crate::log_at!(logger, Severity::Warn, fatal = true, "disk nearly full");

        let record = &logs.records()[0];
        assert_eq!(record["level"], "warn");
        assert_eq!(record["fatal"], true);
    }

    #[test]
    fn event_fields_cannot_replace_fixed_keys() {
        let logs = CapturedLogs::new();
        let logger = logs.logger(&config("info", "json"));

        crate::log_at!(
            logger,
            Severity::Error,
            level = "ok",
            service_name = "spoof",
            caller = "elsewhere",
            "collision"
        );

        let record = &logs.records()[0];
        assert_eq!(record["level"], "error");
        assert_eq!(record["service_name"], "inventory");
        assert!(record["caller"].as_str().unwrap().starts_with("src/logger.rs:"));
        assert_eq!(record["message"], "collision");
        assert_eq!(record["fields.level"], "ok");
        assert_eq!(record["fields.service_name"], "spoof");
        assert_eq!(record["fields.caller"], "elsewhere");
    }

    #[test]
    fn helpers_report_their_call_site() {
        let logs = CapturedLogs::new();
        let logger = logs.logger(&config("info", "json"));

        let expected = format!("src/logger.rs:{}", line!() + 1);
        logger.warn("from the test body");

        let record = &logs.records()[0];
        assert_eq!(record["caller"], expected.as_str());
        assert!(record.get("__sharedlog_caller").is_none());
    }

    #[test]
    fn stack_traces_follow_the_profile() {
        let logs = CapturedLogs::new();
        let production = logs.logger(&config("info", "json"));

        production.warn("no trace");
        production.error("with trace");

        let records = logs.records();
        assert!(records[0].get("stacktrace").is_none());
        assert!(!records[1]["stacktrace"].as_str().unwrap().is_empty());
        let keys: Vec<&String> = records[1].as_object().unwrap().keys().collect();
        assert_eq!(keys.last().unwrap().as_str(), "stacktrace");

        let logs = CapturedLogs::new();
        let development = logs.logger(&config("debug", "json"));

        development.info("no trace");
        development.warn("with trace");

        let records = logs.records();
        assert!(records[0].get("stacktrace").is_none());
        assert!(records[1]["stacktrace"].is_string());
    }

    #[test]
    fn filter_directive_replaces_the_level() {
        let logs = CapturedLogs::new();
        let wider = logs.logger(&LoggerConfig {
            filter: Some("debug".to_string()),
            ..config("info", "json")
        });

        wider.debug("let through by the directive");

        assert_eq!(logs.records_at("debug").len(), 1);

        let logs = CapturedLogs::new();
        let narrower = logs.logger(&LoggerConfig {
            filter: Some("warn".to_string()),
            ..config("debug", "json")
        });

        narrower.info("dropped by the directive");
        narrower.warn("kept");

        let records = logs.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["message"], "kept");
    }

    #[test]
    fn context_fields_are_written_only_when_present() {
        let logs = CapturedLogs::new();
        let logger = logs.logger(&config("info", "json"));
        let ctx = sharedlog_core::LogContext::new()
            .with_request_id("req-9")
            .with_tenant_id(12);

        crate::log_at!(logger, Severity::Info, context: &ctx, "scoped");

        let record = &logs.records()[0];
        assert_eq!(record["request_id"], "req-9");
        assert_eq!(record["tenant_id"], 12);
        assert!(record.get("user_id").is_none());
        assert!(record.get("correlation_id").is_none());
    }

    #[test]
    fn file_output_appends_records() {
        let path = std::env::temp_dir().join(format!(
            "sharedlog-{}-{}.log",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let config = LoggerConfig {
            output: path.to_string_lossy().into_owned(),
            ..LoggerConfig::default_for("files")
        };

        let logger = Logger::new(&config).unwrap();
        logger.info("to disk");

        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        let record: serde_json::Value = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(record["message"], "to disk");
        assert_eq!(record["service_name"], "files");
    }

    #[test]
    fn construction_errors() {
        let empty = LoggerConfig {
            output: String::new(),
            ..LoggerConfig::default()
        };
        assert!(matches!(Logger::new(&empty), Err(LoggerError::EmptyOutput)));

        let missing_dir = LoggerConfig {
            output: "/nonexistent-sharedlog-dir/out.log".to_string(),
            ..LoggerConfig::default()
        };
        assert!(matches!(
            Logger::new(&missing_dir),
            Err(LoggerError::Output { .. })
        ));

        let bad_format = config("info", "yaml");
        assert!(matches!(
            Logger::new(&bad_format),
            Err(LoggerError::UnknownFormat(_))
        ));

        let bad_filter = LoggerConfig {
            filter: Some("sqlx=notalevel".to_string()),
            ..LoggerConfig::default()
        };
        assert!(matches!(Logger::new(&bad_filter), Err(LoggerError::Filter(_))));
    }

    #[test]
    fn presets_build() {
        assert_eq!(Logger::development("svc").unwrap().level(), Severity::Debug);
        assert_eq!(Logger::production("svc").unwrap().level(), Severity::Info);
    }

    fn severity() -> impl Strategy<Value = Severity> {
        prop::sample::select(Severity::ALL.to_vec())
    }

    proptest! {
        /// Property: a record is written iff its severity is at or above the
        /// configured level.
        #[test]
        fn record_written_iff_severity_meets_level(level in severity(), event in severity()) {
            let logs = CapturedLogs::new();
            let logger = logs.logger(&config(level.as_str(), "json"));

            crate::log_at!(logger, event, "gated");

            let records = logs.records();
            prop_assert_eq!(records.len() == 1, event >= level);
            if let Some(record) = records.first() {
                prop_assert_eq!(record["level"].as_str().unwrap(), event.as_str());
            }
        }
    }
}
