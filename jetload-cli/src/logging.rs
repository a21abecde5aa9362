//! Console and rolling file logging.

use std::fs;
use std::path::{Path, PathBuf};

use time::macros::format_description;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::time::{FormatTime, OffsetTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::error::CliError;

/// Log file name inside the log directory; the appender adds the date.
const LOG_FILE_NAME: &str = "jetload.log";

/// Keeps the non-blocking file writer flushing until dropped.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Local wall-clock timestamps, falling back to UTC when the local offset
/// cannot be determined.
///
/// Must run before any other thread is started: the local offset is only
/// readable from a single-threaded process on some platforms.
fn local_timer() -> impl FormatTime {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(
        offset,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"),
    )
}

/// Build the filter: `--verbose` wins, then `RUST_LOG`, then the configured
/// level.
fn build_filter(level: &str, verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize console and file logging.
///
/// # Arguments
///
/// * `log_dir` - Directory for the daily rolling `jetload.log`
/// * `level` - Default level when neither `--verbose` nor `RUST_LOG` is given
/// * `verbose` - Force debug level
pub fn init_logging(log_dir: &Path, level: &str, verbose: bool) -> Result<LoggingGuard, CliError> {
    fs::create_dir_all(log_dir).map_err(|e| {
        CliError::Logging(format!(
            "failed to create log directory {}: {}",
            log_dir.display(),
            e
        ))
    })?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_timer(local_timer())
        .with_filter(build_filter(level, verbose));

    let (file_writer, file_guard) =
        tracing_appender::non_blocking(rolling::daily(log_dir, LOG_FILE_NAME));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_timer(local_timer())
        .with_filter(build_filter(level, verbose));

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_dir: log_dir.to_path_buf(),
    })
}
