//! Logging infrastructure for ado-rest.
//!
//! The library itself only emits `tracing` events (request method, URL and
//! status at `debug`, payload sizes at `trace`). This module wires up a
//! subscriber for the command line front end:
//! - Output to stderr or a file
//! - Configurable log levels
//! - Selectable format (text or JSON)

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a log level from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Convert to a filter string for tracing-subscriber.
    #[must_use]
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

impl LogFormat {
    /// Parse a log format from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Configuration for the logging system.
#[derive(Debug, Default)]
pub struct LogConfig {
    /// Log level (None means logging is disabled).
    pub level: Option<LogLevel>,
    /// Output file path (None means stderr).
    pub file: Option<PathBuf>,
    /// Output format.
    pub format: LogFormat,
}

/// Guard that must be held to ensure logs are flushed.
///
/// When this guard is dropped, all pending log messages are flushed.
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Initialize the logging system.
///
/// Returns `None` when logging is disabled or the log file cannot be opened.
/// The guard must be held until exit so buffered lines reach the writer.
///
/// # Example
///
/// ```rust,no_run
/// use ado_rest::logging::{LogConfig, LogLevel, LogFormat, init_logging};
///
/// let config = LogConfig {
///     level: Some(LogLevel::Debug),
///     file: None,
///     format: LogFormat::Json,
/// };
///
/// let _guard = init_logging(config);
/// ```
#[must_use = "the returned guard must be held until application exit"]
pub fn init_logging(config: LogConfig) -> Option<LogGuard> {
    let level = config.level?;

    // Only our own events; reqwest/hyper are noisy at debug
    let filter = EnvFilter::new(format!("ado_rest={}", level.as_filter_str()));

    let (non_blocking, guard) = match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_file(config.file.is_some())
                .with_line_number(config.file.is_some());

            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
                .ok()?;
        }
        LogFormat::Text => {
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_level(true)
                .with_ansi(config.file.is_none())
                .compact();

            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
                .ok()?;
        }
    }

    Some(LogGuard { _guard: guard })
}

/// Parse logging configuration from command-line arguments and environment.
///
/// This runs before clap so that argument parsing itself can be traced.
/// Precedence: CLI args > environment variables.
#[must_use]
pub fn parse_early_log_config(args: &[String]) -> LogConfig {
    let cli_level = extract_arg_value(args, "--log-level");
    let cli_file = extract_arg_value(args, "--log-file");
    let cli_format = extract_arg_value(args, "--log-format");

    let env_level = std::env::var("ADO_REST_LOG_LEVEL").ok();
    let env_file = std::env::var("ADO_REST_LOG_FILE").ok();
    let env_format = std::env::var("ADO_REST_LOG_FORMAT").ok();

    let level_str = cli_level.or(env_level);
    let file_str = cli_file.or(env_file);
    let format_str = cli_format.or(env_format);

    LogConfig {
        level: level_str.and_then(|s| LogLevel::parse(&s)),
        file: file_str.map(PathBuf::from),
        format: format_str
            .and_then(|s| LogFormat::parse(&s))
            .unwrap_or_default(),
    }
}

/// Extract a value following a flag in command-line arguments.
///
/// Accepts both `--flag value` and `--flag=value`.
fn extract_arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    args.iter()
        .find_map(|a| a.strip_prefix(&prefix).map(str::to_string))
        .or_else(|| args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::file_serial;

    /// # Test: Log Level Parsing
    ///
    /// Verifies that log levels are parsed correctly from strings.
    ///
    /// ## Test Scenario
    /// - Parse valid log level strings (case-insensitive)
    /// - Parse invalid log level strings
    ///
    /// ## Expected Outcome
    /// - Valid strings return the corresponding LogLevel
    /// - Invalid strings return None
    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::parse("trace"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("error"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("verbose"), None);
        assert_eq!(LogLevel::parse(""), None);
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::parse("Text"), Some(LogFormat::Text));
        assert_eq!(LogFormat::parse("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("yaml"), None);
    }

    /// # Test: Early Config Parsing from Args
    ///
    /// ## Test Scenario
    /// - Parse args that mix `--flag value` and `--flag=value`
    ///
    /// ## Expected Outcome
    /// - All three settings are extracted
    #[test]
    #[file_serial(env_tests)]
    fn test_early_config_parsing_from_args() {
        let args: Vec<String> = [
            "ado-rest",
            "--log-level",
            "debug",
            "--log-file=/tmp/ado.log",
            "--log-format",
            "json",
            "git",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let config = parse_early_log_config(&args);
        assert_eq!(config.level, Some(LogLevel::Debug));
        assert_eq!(config.file, Some(PathBuf::from("/tmp/ado.log")));
        assert_eq!(config.format, LogFormat::Json);
    }

    /// # Test: Environment Fallback
    ///
    /// ## Test Scenario
    /// - Sets ADO_REST_LOG_LEVEL and passes a CLI format only
    ///
    /// ## Expected Outcome
    /// - The level comes from the environment, the format from the CLI
    #[test]
    #[file_serial(env_tests)]
    fn test_early_config_env_fallback() {
        unsafe {
            std::env::set_var("ADO_REST_LOG_LEVEL", "trace");
        }
        let args = vec!["ado-rest".to_string(), "--log-format".to_string(), "text".to_string()];
        let config = parse_early_log_config(&args);
        unsafe {
            std::env::remove_var("ADO_REST_LOG_LEVEL");
        }

        assert_eq!(config.level, Some(LogLevel::Trace));
        assert_eq!(config.format, LogFormat::Text);
        assert!(config.file.is_none());
    }

    #[test]
    fn test_logging_disabled_without_level() {
        let guard = init_logging(LogConfig::default());
        assert!(guard.is_none());
    }

    #[test]
    fn test_extract_arg_value() {
        let args: Vec<String> = vec!["cmd".to_string(), "--flag".to_string(), "value".to_string()];
        assert_eq!(
            extract_arg_value(&args, "--flag"),
            Some("value".to_string())
        );
        assert_eq!(extract_arg_value(&args, "--other"), None);

        // Flag at end without value
        let args: Vec<String> = vec!["cmd".to_string(), "--flag".to_string()];
        assert_eq!(extract_arg_value(&args, "--flag"), None);
    }
}
