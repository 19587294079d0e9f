//! Store configuration and backend selection.
//!
//! # Responsibility
//! - Describe which backend to use and where its files live.
//! - Resolve configuration from environment variables.
//! - Build a boxed `RecordStore` for backend-agnostic callers.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - Opening a store never creates CSV files or record tables; that happens on
//!   first `create`.

use crate::repo::csv_store::CsvRecordStore;
use crate::repo::record_store::{RecordStore, StoreResult};
use crate::repo::sqlite_store::SqliteRecordStore;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

/// File name of the SQLite database inside `data_dir`.
pub const SQLITE_DB_FILE_NAME: &str = "records.sqlite3";
/// Env var selecting the backend (`csv` or `sqlite`).
pub const BACKEND_ENV_VAR: &str = "RECSTORE_BACKEND";
/// Env var pointing at the data directory.
pub const DATA_DIR_ENV_VAR: &str = "RECSTORE_DATA_DIR";

/// Available storage media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Csv,
    Sqlite,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Sqlite => "sqlite",
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            _ => Err(ConfigError::UnsupportedBackend(value.to_string())),
        }
    }
}

/// Configuration parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedBackend(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedBackend(value) => {
                write!(f, "unsupported backend `{value}`; expected csv|sqlite")
            }
        }
    }
}

impl Error for ConfigError {}

/// Backend choice plus the directory holding its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: BackendKind,
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            data_dir: PathBuf::from("."),
        }
    }
}

impl StoreConfig {
    pub fn new(backend: BackendKind, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            data_dir: data_dir.into(),
        }
    }

    /// Reads `RECSTORE_BACKEND` / `RECSTORE_DATA_DIR`, falling back to
    /// defaults for unset or blank values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with a caller-supplied variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(backend) = non_blank(BACKEND_ENV_VAR) {
            config.backend = backend.parse()?;
        }
        if let Some(data_dir) = non_blank(DATA_DIR_ENV_VAR) {
            config.data_dir = PathBuf::from(data_dir);
        }
        Ok(config)
    }

    /// Path of the SQLite database file for this configuration.
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join(SQLITE_DB_FILE_NAME)
    }
}

/// Opens the configured backend behind the `RecordStore` facade.
///
/// # Side effects
/// - For `sqlite`, creates `data_dir` and opens the database file.
pub fn open_store(config: &StoreConfig) -> StoreResult<Box<dyn RecordStore>> {
    let store: Box<dyn RecordStore> = match config.backend {
        BackendKind::Csv => Box::new(CsvRecordStore::new(config.data_dir.clone())),
        BackendKind::Sqlite => {
            std::fs::create_dir_all(&config.data_dir)?;
            Box::new(SqliteRecordStore::open(config.sqlite_path())?)
        }
    };

    info!(
        "event=store_open module=config status=ok backend={} data_dir={}",
        config.backend,
        config.data_dir.display()
    );
    Ok(store)
}
