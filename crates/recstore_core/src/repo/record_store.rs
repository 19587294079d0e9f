//! Backend-agnostic record store contract.
//!
//! # Responsibility
//! - Define the two-operation capability set every backend implements.
//! - Route untyped boundary input through `validation` before delegating.
//!
//! # Invariants
//! - `create` is an upsert: after it returns, exactly one record exists for
//!   `(record.kind(), record.id())` in the backing medium.
//! - `get` never masks a missing record; it returns `StoreError::NotFound`.
//!
//! # See also
//! - `repo::csv_store`, `repo::sqlite_store`

use crate::db::DbError;
use crate::model::record::{Record, RecordId, RecordKind};
use crate::validation::{validate_kind, validate_record, ValidationError};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for record persistence and lookup operations.
#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    NotFound { kind: RecordKind, id: RecordId },
    Db(DbError),
    Csv(csv::Error),
    Io(std::io::Error),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} with id '{id}' not found"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<csv::Error> for StoreError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_invalid_type(&self) -> bool {
        matches!(self, Self::Validation(ValidationError::InvalidType { .. }))
    }

    pub fn is_invalid_kind(&self) -> bool {
        matches!(self, Self::Validation(ValidationError::InvalidKind(_)))
    }
}

/// Storage facade implemented by every backend.
///
/// Callers can be written once against `&dyn RecordStore`.
pub trait RecordStore {
    /// Inserts `record`, or overwrites the stored record with the same id.
    fn create(&self, record: &Record) -> StoreResult<()>;

    /// Loads the record of `kind` with identity `id`.
    fn get(&self, id: RecordId, kind: RecordKind) -> StoreResult<Record>;

    /// Short backend name used in logs and CLI output.
    fn backend_name(&self) -> &'static str;

    /// Validates an untyped value and upserts it.
    ///
    /// # Errors
    /// - `InvalidType` before any I/O when `data` is not a tagged record.
    fn create_value(&self, data: &Value) -> StoreResult<()> {
        let record = validate_record(data)?;
        self.create(&record)
    }

    /// Validates a kind name and looks the record up.
    ///
    /// # Errors
    /// - `InvalidKind` before any I/O when `kind` is not `user`/`car`.
    fn get_named(&self, id: RecordId, kind: &str) -> StoreResult<Record> {
        let kind = validate_kind(kind)?;
        self.get(id, kind)
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn create(&self, record: &Record) -> StoreResult<()> {
        (**self).create(record)
    }

    fn get(&self, id: RecordId, kind: RecordKind) -> StoreResult<Record> {
        (**self).get(id, kind)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}
