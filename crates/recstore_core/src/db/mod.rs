//! SQLite connection bootstrap and per-kind table registry.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the record store.
//! - Create record tables lazily and idempotently.
//!
//! # Invariants
//! - Tables are only ever created with `CREATE TABLE IF NOT EXISTS`; an
//!   existing table is never altered.
//! - Every statement issued by this crate binds values as parameters.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
