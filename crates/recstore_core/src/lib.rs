//! Record persistence core.
//! One create/get contract over a CSV-file backend and a SQLite backend.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod validation;

pub use config::{open_store, BackendKind, ConfigError, StoreConfig};
pub use logging::{init_logging, logging_status, LogConfig, LogTarget, LoggingError};
pub use model::record::{Car, Record, RecordId, RecordKind, User};
pub use repo::csv_store::CsvRecordStore;
pub use repo::record_store::{RecordStore, StoreError, StoreResult};
pub use repo::sqlite_store::SqliteRecordStore;
pub use validation::{validate_kind, validate_record, ValidationError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
