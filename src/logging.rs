//! File logging bootstrap.
//!
//! habitkit logs through the `log` facade. Hosts that want files on disk
//! call [`init_logging`] once at startup; everything after that goes to a
//! size-rotated log under the configured directory.

use std::path::{Path, PathBuf};

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use once_cell::sync::OnceCell;

use crate::config::{LoggingConfig, Paths};
use crate::error::HabitError;

const LOG_FILE_BASENAME: &str = "habitkit";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

/// Start file logging at `level` under `log_dir`.
///
/// Calling again with the same settings is a no-op. A second call asking
/// for a different level or directory is rejected; the first logger stays
/// active.
///
/// # Errors
///
/// Returns `HabitError::Logging` for an unknown level, a relative or empty
/// directory, a conflicting re-initialization, or a backend failure.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), HabitError> {
    let level = normalize_level(level)?;
    let log_dir = normalize_log_dir(log_dir)?;

    let state = LOGGING_STATE.get_or_try_init(|| start_logger(level, &log_dir))?;

    if state.log_dir != log_dir {
        return Err(HabitError::Logging(format!(
            "logging already initialized at `{}`; refusing to switch to `{}`",
            state.log_dir.display(),
            log_dir.display()
        )));
    }
    if state.level != level {
        return Err(HabitError::Logging(format!(
            "logging already initialized with level `{}`; refusing to switch to `{level}`",
            state.level
        )));
    }

    Ok(())
}

/// Start file logging from the `logging` section of the config.
///
/// # Errors
///
/// See [`init_logging`].
pub fn init_from_config(config: &LoggingConfig, paths: &Paths) -> Result<(), HabitError> {
    init_logging(&config.level, &config.log_dir(paths))
}

/// Active `(level, directory)`, or `None` before initialization.
#[must_use]
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.log_dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
#[must_use]
pub const fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(level: &'static str, log_dir: &Path) -> Result<LoggingState, HabitError> {
    std::fs::create_dir_all(log_dir).map_err(|e| {
        HabitError::Logging(format!(
            "failed to create log directory `{}`: {e}",
            log_dir.display()
        ))
    })?;

    let logger = Logger::try_with_str(level)
        .map_err(|e| HabitError::Logging(format!("invalid log level `{level}`: {e}")))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|e| HabitError::Logging(format!("failed to start logger: {e}")))?;

    info!(
        "event=logging_init module=logging status=ok level={level} log_dir={} version={}",
        log_dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(LoggingState {
        level,
        log_dir: log_dir.to_path_buf(),
        _logger: logger,
    })
}

fn normalize_level(level: &str) -> Result<&'static str, HabitError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(HabitError::Logging(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        ))),
    }
}

fn normalize_log_dir(log_dir: &Path) -> Result<PathBuf, HabitError> {
    if log_dir.as_os_str().is_empty() {
        return Err(HabitError::Logging("log directory cannot be empty".to_string()));
    }
    if !log_dir.is_absolute() {
        return Err(HabitError::Logging(format!(
            "log directory must be absolute, got `{}`",
            log_dir.display()
        )));
    }
    Ok(log_dir.to_path_buf())
}
