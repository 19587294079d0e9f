//! Table definitions for each record kind.
//!
//! # Responsibility
//! - Own the DDL for the `user` and `car` tables.
//! - Create a kind's table on first use.
//!
//! # Invariants
//! - Table name equals `RecordKind::as_str()`.
//! - Column order equals `RecordKind::fields()`.

use super::DbResult;
use crate::model::record::RecordKind;
use log::debug;
use rusqlite::Connection;

const CREATE_USER_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS user (
    id INTEGER PRIMARY KEY,
    name TEXT,
    age INTEGER
);";

const CREATE_CAR_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS car (
    id INTEGER PRIMARY KEY,
    color TEXT,
    type TEXT,
    model TEXT
);";

/// Returns the idempotent `CREATE TABLE` statement for `kind`.
pub fn create_table_sql(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::User => CREATE_USER_TABLE_SQL,
        RecordKind::Car => CREATE_CAR_TABLE_SQL,
    }
}

/// Creates the table backing `kind` when it does not exist yet.
pub fn ensure_table(conn: &Connection, kind: RecordKind) -> DbResult<()> {
    conn.execute_batch(create_table_sql(kind))?;
    debug!("event=ensure_table module=db status=ok table={kind}");
    Ok(())
}

/// Returns whether `kind`'s table is present.
pub fn table_exists(conn: &Connection, kind: RecordKind) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [kind.as_str()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
