//! Process-wide logging bootstrap.
//!
//! # Responsibility
//! - Initialize the `log` facade with a `flexi_logger` backend exactly once.
//! - Support stderr output for CLI use and rotating files for long runs.
//!
//! # Invariants
//! - Re-initialization with the same config is a no-op.
//! - Re-initialization with a different config is rejected, never applied.
//! - Core log events carry record kind and id only, never field values.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const LOG_FILE_BASENAME: &str = "recstore";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    config: LogConfig,
    _logger: LoggerHandle,
}

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Absolute directory receiving rotating `recstore` log files.
    Directory(PathBuf),
}

/// Logging level plus destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: &'static str,
    pub target: LogTarget,
}

impl LogConfig {
    /// Builds a config after normalizing `level`.
    ///
    /// # Errors
    /// - `UnsupportedLevel` for anything outside trace|debug|info|warn|error.
    /// - `RelativeLogDir` when a directory target is not absolute.
    pub fn new(level: &str, target: LogTarget) -> Result<Self, LoggingError> {
        if let LogTarget::Directory(dir) = &target {
            if !dir.is_absolute() {
                return Err(LoggingError::RelativeLogDir(dir.clone()));
            }
        }
        Ok(Self {
            level: normalize_level(level)?,
            target,
        })
    }
}

/// Logging bootstrap failures.
#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    RelativeLogDir(PathBuf),
    AlreadyInitialized { active: LogConfig },
    CreateDir { dir: PathBuf, source: std::io::Error },
    Backend(flexi_logger::FlexiLoggerError),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeLogDir(dir) => {
                write!(f, "log_dir must be an absolute path, got `{}`", dir.display())
            }
            Self::AlreadyInitialized { active } => write!(
                f,
                "logging already initialized with level `{}` and target {:?}; refusing to switch",
                active.level, active.target
            ),
            Self::CreateDir { dir, source } => write!(
                f,
                "failed to create log directory `{}`: {source}",
                dir.display()
            ),
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<flexi_logger::FlexiLoggerError> for LoggingError {
    fn from(value: flexi_logger::FlexiLoggerError) -> Self {
        Self::Backend(value)
    }
}

/// Initializes logging for this process.
///
/// # Errors
/// - `AlreadyInitialized` when called again with a different config.
/// - `CreateDir` / `Backend` when the logger cannot be started.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let state = LOGGING_STATE.get_or_try_init(|| start_logger(config))?;
    if &state.config != config {
        return Err(LoggingError::AlreadyInitialized {
            active: state.config.clone(),
        });
    }
    Ok(())
}

/// Returns the active config, or `None` before `init_logging` succeeded.
pub fn logging_status() -> Option<LogConfig> {
    LOGGING_STATE.get().map(|state| state.config.clone())
}

fn start_logger(config: &LogConfig) -> Result<LoggingState, LoggingError> {
    let logger = Logger::try_with_str(config.level)?;
    let logger = match &config.target {
        LogTarget::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::default_format)
            .start()?,
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
                dir: dir.clone(),
                source,
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
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
                .start()?
        }
    };

    info!(
        "event=logging_init module=core status=ok level={} target={:?} version={}",
        config.level,
        config.target,
        env!("CARGO_PKG_VERSION")
    );

    Ok(LoggingState {
        config: config.clone(),
        _logger: logger,
    })
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}
