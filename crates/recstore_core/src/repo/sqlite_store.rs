//! SQLite-backed record store.
//!
//! # Responsibility
//! - Persist each record kind to its own table.
//! - Upsert with `INSERT OR REPLACE` keyed on the `id` primary key.
//!
//! # Invariants
//! - The kind's table is ensured before every statement that touches it.
//! - Field values are always bound as parameters, never spliced into SQL.
//! - Read paths reject unexpected column values instead of masking them.

use crate::db::schema::ensure_table;
use crate::db::{open_db, open_db_in_memory};
use crate::model::record::{Car, Record, RecordId, RecordKind, User};
use crate::repo::record_store::{RecordStore, StoreError, StoreResult};
use log::debug;
use rusqlite::types::FromSql;
use rusqlite::{params, Connection, Row};
use std::path::Path;

const USER_UPSERT_SQL: &str = "INSERT OR REPLACE INTO user (id, name, age)
    VALUES (?1, ?2, ?3);";
const CAR_UPSERT_SQL: &str = "INSERT OR REPLACE INTO car (id, color, type, model)
    VALUES (?1, ?2, ?3, ?4);";
const USER_SELECT_SQL: &str = "SELECT id, name, age FROM user WHERE id = ?1;";
const CAR_SELECT_SQL: &str = "SELECT id, color, type, model FROM car WHERE id = ?1;";

/// Record store owning one long-lived SQLite connection.
///
/// Statements run in autocommit mode, so each `create` is durable on return.
pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    /// Wraps an already-open connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (creating if absent) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Borrows the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl RecordStore for SqliteRecordStore {
    fn create(&self, record: &Record) -> StoreResult<()> {
        let kind = record.kind();
        ensure_table(&self.conn, kind)?;

        match record {
            Record::User(user) => self.conn.execute(
                USER_UPSERT_SQL,
                params![user.id, user.name.as_str(), user.age],
            )?,
            Record::Car(car) => self.conn.execute(
                CAR_UPSERT_SQL,
                params![
                    car.id,
                    car.color.as_str(),
                    car.car_type.as_str(),
                    car.model.as_str(),
                ],
            )?,
        };

        debug!(
            "event=record_upsert module=repo backend=sqlite status=ok kind={} id={}",
            kind,
            record.id()
        );
        Ok(())
    }

    fn get(&self, id: RecordId, kind: RecordKind) -> StoreResult<Record> {
        ensure_table(&self.conn, kind)?;

        let sql = match kind {
            RecordKind::User => USER_SELECT_SQL,
            RecordKind::Car => CAR_SELECT_SQL,
        };
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return parse_record_row(kind, row);
        }

        debug!("event=record_get module=repo backend=sqlite status=not_found kind={kind} id={id}");
        Err(StoreError::NotFound { kind, id })
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

fn parse_record_row(kind: RecordKind, row: &Row<'_>) -> StoreResult<Record> {
    let record = match kind {
        RecordKind::User => Record::User(User {
            id: column(kind, row, "id")?,
            name: column(kind, row, "name")?,
            age: column(kind, row, "age")?,
        }),
        RecordKind::Car => Record::Car(Car {
            id: column(kind, row, "id")?,
            color: column(kind, row, "color")?,
            car_type: column(kind, row, "type")?,
            model: column(kind, row, "model")?,
        }),
    };
    Ok(record)
}

fn column<T: FromSql>(kind: RecordKind, row: &Row<'_>, name: &str) -> StoreResult<T> {
    row.get(name).map_err(|err| match err {
        rusqlite::Error::InvalidColumnType(_, _, found) => StoreError::InvalidData(format!(
            "unexpected {found} value in {kind}.{name}"
        )),
        rusqlite::Error::FromSqlConversionFailure(_, _, source) => {
            StoreError::InvalidData(format!("invalid value in {kind}.{name}: {source}"))
        }
        other => other.into(),
    })
}
