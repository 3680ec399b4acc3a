use std::io;

use thiserror::Error;

/// Logger construction failure.
///
/// Fatal to startup: callers are expected to surface it, not retry.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format {0:?} (expected \"json\" or \"console\")")]
    UnknownFormat(String),

    #[error("log output target is empty")]
    EmptyOutput,

    #[error("failed to open log output {target:?}: {source}")]
    Output {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid log filter directive: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("a global logger is already installed")]
    AlreadyInstalled,
}
