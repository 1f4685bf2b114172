//! Structured logging set-up for RememberMe.
//!
//! Built on `tracing`: one `fmt` layer in the configured format plus an
//! `EnvFilter` (`RUST_LOG` takes precedence over the configured level).

mod formatters;

pub use formatters::DevelopmentFormatter;

use crate::config::{LogFormat, LogLevel, LoggingConfig};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Error type for logging operations
#[derive(Debug)]
pub enum LogError {
    /// IO error occurred
    IoError(std::io::Error),

    /// Error parsing a filter directive
    InvalidFilter(String),
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::IoError(err)
    }
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::IoError(e) => write!(f, "IO error: {}", e),
            LogError::InvalidFilter(s) => write!(f, "Invalid log filter: {}", s),
        }
    }
}

impl std::error::Error for LogError {}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Keeps the background file writer alive; logs are flushed when dropped
#[must_use = "dropping the guard stops file logging"]
#[derive(Debug, Default)]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Initialize the logging system with the given configuration.
///
/// If a global subscriber is already installed it is left in place.
pub fn init(config: &LoggingConfig) -> Result<LogGuard> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .map_err(|e| LogError::InvalidFilter(format!("{}: {}", directives, e)))?,
        _ => EnvFilter::new(config.level.to_string()),
    };

    let (writer, guard, ansi) = make_writer(config)?;

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_line_number(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_ansi(ansi)
            .with_target(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_ansi(ansi)
            .with_line_number(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Default => tracing_subscriber::fmt::layer()
            .event_format(DevelopmentFormatter::new(ansi))
            .with_writer(writer)
            .boxed(),
    };

    if tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global subscriber already installed, keeping it");
    }

    Ok(LogGuard { _file: guard })
}

/// Pick stdout, a log file, or both
fn make_writer(config: &LoggingConfig) -> Result<(BoxMakeWriter, Option<WorkerGuard>, bool)> {
    match &config.file {
        Some(path) => {
            let (file, guard) = create_non_blocking_file(path)?;
            let writer = if config.stdout {
                BoxMakeWriter::new(std::io::stdout.and(file))
            } else {
                BoxMakeWriter::new(file)
            };
            Ok((writer, Some(guard), false))
        }
        None if config.stdout => Ok((BoxMakeWriter::new(std::io::stdout), None, true)),
        None => Ok((BoxMakeWriter::new(std::io::sink), None, false)),
    }
}

/// Create a non-blocking file writer.
fn create_non_blocking_file(
    path: impl AsRef<Path>,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file_name = path.file_name().ok_or_else(|| {
        LogError::IoError(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("log file path has no file name: {}", path.display()),
        ))
    })?;

    let file_appender = tracing_appender::rolling::never(
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new(".")),
        file_name,
    );

    Ok(tracing_appender::non_blocking(file_appender))
}

/// Convert a tracing::Level to a LogLevel enum.
pub fn level_to_log_level(level: Level) -> LogLevel {
    match level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        Level::ERROR => LogLevel::Error,
    }
}
