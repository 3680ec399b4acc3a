//! Record encoding.
//!
//! [`RecordFormat`] renders each `tracing` event as one line with a fixed key
//! layout: `timestamp`, `level`, `caller`, `message`, then `service_name`
//! (if configured), `target` (development profile only) and the event's own
//! fields in the order they were written. Records at or above the profile's
//! stack trace level end with `stacktrace`.

use std::backtrace::Backtrace;
use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use sharedlog_core::Severity;

use crate::error::LoggerError;

/// Field used by `log_at!` to mark a record as `fatal`; never written out.
pub(crate) const FATAL_MARKER: &str = "__sharedlog_fatal";

/// Caller location captured by the `Logger` helpers; replaces the event's own.
pub(crate) const CALLER_MARKER: &str = "__sharedlog_caller";

/// Keys owned by the formatter. Event fields with these names are written as
/// `fields.<name>` instead.
const RESERVED_KEYS: [&str; 7] = [
    "timestamp",
    "level",
    "caller",
    "message",
    "service_name",
    "target",
    "stacktrace",
];

/// Base configuration selected by the logger's level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Profile {
    /// Chosen for `debug`: console encoding by default, records carry `target`,
    /// stack traces from `warn` up.
    Development,
    /// Everything else: JSON by default, minimal key set, stack traces from
    /// `error` up.
    Production,
}

impl Profile {
    pub fn for_severity(level: Severity) -> Self {
        if level == Severity::Debug {
            Profile::Development
        } else {
            Profile::Production
        }
    }

    pub fn default_encoding(&self) -> Encoding {
        match self {
            Profile::Development => Encoding::Console,
            Profile::Production => Encoding::Json,
        }
    }

    pub fn includes_target(&self) -> bool {
        matches!(self, Profile::Development)
    }

    /// Lowest severity whose records carry a `stacktrace`.
    pub fn stacktrace_level(&self) -> Severity {
        match self {
            Profile::Development => Severity::Warn,
            Profile::Production => Severity::Error,
        }
    }
}

/// Line encoding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Encoding {
    /// One JSON object per line.
    Json,
    /// `timestamp<TAB>level<TAB>caller<TAB>message<TAB>{fields as JSON}`.
    Console,
}

impl Encoding {
    /// Resolve a configured format name; empty means the profile default.
    pub fn resolve(name: &str, profile: Profile) -> Result<Self, LoggerError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" => Ok(profile.default_encoding()),
            "json" => Ok(Encoding::Json),
            "console" => Ok(Encoding::Console),
            _ => Err(LoggerError::UnknownFormat(name.to_string())),
        }
    }
}

/// `FormatEvent` implementation behind every [`crate::Logger`].
#[derive(Debug, Clone)]
pub struct RecordFormat {
    encoding: Encoding,
    service_name: Option<String>,
    include_target: bool,
    stacktrace_at: Option<Severity>,
}

impl RecordFormat {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            service_name: None,
            include_target: false,
            stacktrace_at: None,
        }
    }

    /// Attach `service_name` to every record; empty names are ignored.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.service_name = (!name.is_empty()).then_some(name);
        self
    }

    pub fn with_target(mut self, include: bool) -> Self {
        self.include_target = include;
        self
    }

    /// Attach a captured `stacktrace` to records at `level` and above.
    pub fn with_stacktrace_at(mut self, level: Severity) -> Self {
        self.stacktrace_at = Some(level);
        self
    }

    fn context_fields(&self, meta: &Metadata<'_>) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(name) = &self.service_name {
            fields.insert("service_name".into(), Value::String(name.clone()));
        }
        if self.include_target {
            fields.insert("target".into(), Value::String(meta.target().to_string()));
        }
        fields
    }
}

impl<S, N> FormatEvent<S, N> for RecordFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let level = if visitor.fatal {
            Severity::Fatal
        } else {
            severity_of(meta.level())
        };
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let caller = match visitor.caller {
            Some(caller) => caller,
            None => caller_of(meta),
        };

        let mut fields = self.context_fields(meta);
        for (key, value) in visitor.fields {
            if RESERVED_KEYS.contains(&key.as_str()) {
                fields.insert(format!("fields.{key}"), value);
            } else {
                fields.insert(key, value);
            }
        }
        let stacktrace = self
            .stacktrace_at
            .is_some_and(|at| level >= at)
            .then(|| Backtrace::force_capture().to_string());

        match self.encoding {
            Encoding::Json => {
                let mut record = Map::new();
                record.insert("timestamp".into(), Value::String(timestamp));
                record.insert("level".into(), Value::String(level.as_str().into()));
                record.insert("caller".into(), Value::String(caller));
                record.insert("message".into(), Value::String(visitor.message));
                record.extend(fields);
                if let Some(trace) = stacktrace {
                    record.insert("stacktrace".into(), Value::String(trace));
                }

                let line = serde_json::to_string(&record).map_err(|_| fmt::Error)?;
                writeln!(writer, "{line}")
            }
            Encoding::Console => {
                write!(
                    writer,
                    "{timestamp}\t{level}\t{caller}\t{}",
                    visitor.message
                )?;
                if !fields.is_empty() {
                    let tail = serde_json::to_string(&fields).map_err(|_| fmt::Error)?;
                    write!(writer, "\t{tail}")?;
                }
                if let Some(trace) = stacktrace {
                    write!(writer, "\n{}", trace.trim_end())?;
                }
                writeln!(writer)
            }
        }
    }
}

fn severity_of(level: &Level) -> Severity {
    match *level {
        Level::ERROR => Severity::Error,
        Level::WARN => Severity::Warn,
        Level::INFO => Severity::Info,
        _ => Severity::Debug,
    }
}

fn caller_of(meta: &Metadata<'_>) -> String {
    match meta.file() {
        Some(file) => short_caller(file, meta.line()),
        None => meta.target().to_string(),
    }
}

/// `dir/file.rs:line`, keeping only the last two path components.
pub(crate) fn short_caller(file: &str, line: Option<u32>) -> String {
    let mut parts = file.rsplit(['/', '\\']);
    let name = parts.next().unwrap_or(file);
    let short = match parts.next() {
        Some(dir) => format!("{dir}/{name}"),
        None => name.to_string(),
    };

    match line {
        Some(line) => format!("{short}:{line}"),
        None => short,
    }
}

#[derive(Default)]
struct RecordVisitor {
    message: String,
    fields: Map<String, Value>,
    fatal: bool,
    caller: Option<String>,
}

impl RecordVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for RecordVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.insert(field, Value::String(format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else if field.name() == CALLER_MARKER {
            self.caller = Some(value.to_string());
        } else {
            self.insert(field, Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        let value = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string()));
        self.insert(field, value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == FATAL_MARKER {
            self.fatal = value;
        } else {
            self.insert(field, Value::Bool(value));
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::String(value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_format_uses_profile_default() {
        assert_eq!(
            Encoding::resolve("", Profile::Development).unwrap(),
            Encoding::Console
        );
        assert_eq!(
            Encoding::resolve("", Profile::Production).unwrap(),
            Encoding::Json
        );
        assert_eq!(
            Encoding::resolve("JSON", Profile::Development).unwrap(),
            Encoding::Json
        );
    }

    #[test]
    fn unknown_format_is_rejected() {
        let err = Encoding::resolve("xml", Profile::Production).unwrap_err();
        assert!(matches!(err, LoggerError::UnknownFormat(name) if name == "xml"));
    }

    #[test]
    fn only_debug_selects_development_profile() {
        assert_eq!(Profile::for_severity(Severity::Debug), Profile::Development);
        for level in [Severity::Info, Severity::Warn, Severity::Error, Severity::Fatal] {
            assert_eq!(Profile::for_severity(level), Profile::Production);
        }
    }

    #[test]
    fn stack_traces_start_lower_in_development() {
        assert_eq!(Profile::Development.stacktrace_level(), Severity::Warn);
        assert_eq!(Profile::Production.stacktrace_level(), Severity::Error);
    }

    #[test]
    fn caller_keeps_last_two_components() {
        assert_eq!(
            short_caller("crates/api/tests/request_logging.rs", Some(12)),
            "tests/request_logging.rs:12"
        );
        assert_eq!(short_caller("main.rs", None), "main.rs");
        assert_eq!(short_caller(r"src\logger.rs", Some(3)), "src/logger.rs:3");
    }

    #[test]
    fn empty_service_name_is_dropped() {
        let format = RecordFormat::new(Encoding::Json).with_service_name("");
        assert!(format.service_name.is_none());
    }
}
