//! Structured logging setup.
//!
//! Library code only emits `tracing` events. Hosts that want them on stderr
//! call [`enable_logging`] once at startup.

use std::env;
use std::io;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive read when no level is passed.
pub const TRACE_ENV: &str = "QUORUM_TRACE";
/// Output format selector: `json`, `pretty` or `compact`.
pub const FORMAT_ENV: &str = "QUORUM_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("compact") {
            Some(LogFormat::Compact)
        } else if value.eq_ignore_ascii_case("pretty") {
            Some(LogFormat::Pretty)
        } else if value.eq_ignore_ascii_case("json") {
            Some(LogFormat::Json)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    /// The filter directive could not be parsed.
    InvalidFilter(String),
    /// `QUORUM_LOG_FORMAT` holds an unknown format.
    InvalidFormat(String),
    /// The subscriber could not be installed.
    Init(String),
}

impl LoggingError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            LoggingError::InvalidFilter(_) => "LOG_INVALID_FILTER",
            LoggingError::InvalidFormat(_) => "LOG_INVALID_FORMAT",
            LoggingError::Init(_) => "LOG_INIT",
        }
    }
}

impl std::fmt::Display for LoggingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggingError::InvalidFilter(msg) => {
                write!(f, "[{}] Invalid log filter: {}", self.code(), msg)
            }
            LoggingError::InvalidFormat(value) => write!(
                f,
                "[{}] Invalid {} '{}' (expected 'json', 'pretty' or 'compact')",
                self.code(),
                FORMAT_ENV,
                value
            ),
            LoggingError::Init(msg) => {
                write!(f, "[{}] Failed to initialize logging: {}", self.code(), msg)
            }
        }
    }
}

impl std::error::Error for LoggingError {}

/// Build the filter for `level`, falling back to `QUORUM_TRACE`, then `warn`.
pub fn build_filter(level: Option<&str>) -> Result<EnvFilter, LoggingError> {
    let value = level
        .map(str::to_string)
        .or_else(|| env::var(TRACE_ENV).ok())
        .unwrap_or_else(|| "warn".to_string());

    if value.eq_ignore_ascii_case("off") {
        return Ok(EnvFilter::default().add_directive(LevelFilter::OFF.into()));
    }
    EnvFilter::try_new(&value).map_err(|err| LoggingError::InvalidFilter(err.to_string()))
}

fn format_from_env() -> Result<LogFormat, LoggingError> {
    match env::var(FORMAT_ENV) {
        Ok(value) => LogFormat::parse(&value).ok_or(LoggingError::InvalidFormat(value)),
        Err(_) => Ok(LogFormat::Compact),
    }
}

/// Install a stderr subscriber. Returns `Ok(false)` when a global subscriber
/// is already set.
pub fn enable_logging(level: Option<&str>) -> Result<bool, LoggingError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(false);
    }

    let filter = build_filter(level)?;
    let registry = tracing_subscriber::registry().with(filter);
    let init = match format_from_env()? {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).json())
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).pretty())
            .try_init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).compact())
            .try_init(),
    };
    init.map_err(|err| LoggingError::Init(err.to_string()))?;

    tracing::debug!(
        component = "logging",
        operation = "enable",
        status = "success",
        "Installed stderr subscriber"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_are_case_insensitive() {
        assert_eq!(LogFormat::parse("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("pretty"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::parse("Compact"), Some(LogFormat::Compact));
        assert_eq!(LogFormat::parse("xml"), None);
    }

    #[test]
    fn explicit_level_builds_filter() {
        assert!(build_filter(Some("quorum_core=debug")).is_ok());
        assert!(build_filter(Some("off")).is_ok());
        let err = build_filter(Some("quorum_core=nonsense")).unwrap_err();
        assert_eq!(err.code(), "LOG_INVALID_FILTER");
    }

    #[test]
    fn second_install_is_a_no_op() {
        let _ = enable_logging(Some("off"));
        assert_eq!(enable_logging(Some("off")), Ok(false));
    }

    #[test]
    fn display_prefixes_error_code() {
        let err = LoggingError::InvalidFormat("xml".into());
        assert!(err.to_string().starts_with("[LOG_INVALID_FORMAT]"));
    }
}
