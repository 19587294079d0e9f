//! CSV-file-backed record store.
//!
//! # Responsibility
//! - Persist each record kind to its own header-led CSV file.
//! - Upsert by id through a full read-modify-rewrite of the kind's file.
//!
//! # Invariants
//! - The header row lists field names in declaration order for new files;
//!   an existing file's header (including unknown extra columns) is kept.
//! - Rows whose `id` cell does not parse as an integer never match a lookup
//!   and are written back untouched.
//! - The whole read-modify-write runs under an exclusive lock on a sidecar
//!   `<file>.lock`, and the rewrite is a temp file renamed over the target
//!   with the target's permissions.
//! - `get` never creates files: it shares the sidecar lock only when a
//!   writer has already created it.
//!
//! # See also
//! - `repo::record_store`

use crate::model::record::{Car, Record, RecordId, RecordKind, User};
use crate::repo::record_store::{RecordStore, StoreError, StoreResult};
use fs2::FileExt;
use log::{debug, warn};
use std::fs::{self, File, OpenOptions, Permissions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File holding `user` rows inside the store directory.
pub const USERS_FILE_NAME: &str = "users.csv";
/// File holding `car` rows inside the store directory.
pub const CARS_FILE_NAME: &str = "cars.csv";

const LOCK_FILE_SUFFIX: &str = ".lock";

/// Returns the CSV file name used for `kind`.
pub fn csv_file_name(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::User => USERS_FILE_NAME,
        RecordKind::Car => CARS_FILE_NAME,
    }
}

/// Record store writing one CSV file per kind under a directory.
#[derive(Debug, Clone)]
pub struct CsvRecordStore {
    dir: PathBuf,
}

impl CsvRecordStore {
    /// Uses `dir` as the store directory. Nothing is touched until the first
    /// `create`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the CSV file backing `kind`.
    pub fn file_path(&self, kind: RecordKind) -> PathBuf {
        self.dir.join(csv_file_name(kind))
    }

    fn lock_path(&self, kind: RecordKind) -> PathBuf {
        self.dir.join(format!("{}{LOCK_FILE_SUFFIX}", csv_file_name(kind)))
    }
}

impl RecordStore for CsvRecordStore {
    fn create(&self, record: &Record) -> StoreResult<()> {
        let kind = record.kind();
        fs::create_dir_all(&self.dir)?;
        let _lock = FileLock::exclusive(&self.lock_path(kind))?;

        let path = self.file_path(kind);
        let mut table = CsvTable::load(&path, kind)?;
        let outcome = table.upsert(record)?;
        table.write_atomic(&path)?;

        debug!(
            "event=record_upsert module=repo backend=csv status=ok kind={} id={} action={} rows={}",
            kind,
            record.id(),
            outcome.as_str(),
            table.rows.len()
        );
        Ok(())
    }

    fn get(&self, id: RecordId, kind: RecordKind) -> StoreResult<Record> {
        let path = self.file_path(kind);
        if !path.exists() {
            debug!("event=record_get module=repo backend=csv status=not_found kind={kind} id={id} reason=no_file");
            return Err(StoreError::NotFound { kind, id });
        }

        let _lock = FileLock::shared(&self.lock_path(kind))?;
        let table = CsvTable::load(&path, kind)?;
        match table.find_row(id) {
            Some(index) => table.record_at(kind, index, id),
            None => {
                debug!("event=record_get module=repo backend=csv status=not_found kind={kind} id={id}");
                Err(StoreError::NotFound { kind, id })
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "csv"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpsertOutcome {
    Inserted,
    Replaced,
}

impl UpsertOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Inserted => "insert",
            Self::Replaced => "replace",
        }
    }
}

/// In-memory copy of one CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CsvTable {
    file_name: &'static str,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    fn empty(kind: RecordKind) -> Self {
        Self {
            file_name: csv_file_name(kind),
            headers: kind.fields().iter().map(|field| field.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Reads every row of `path`; a missing or empty file is an empty table.
    fn load(path: &Path, kind: RecordKind) -> StoreResult<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::empty(kind)),
            Err(err) => return Err(err.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            return Ok(Self::empty(kind));
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let row = result?;
            rows.push(row.iter().map(str::to_string).collect());
        }

        Ok(Self {
            file_name: csv_file_name(kind),
            headers,
            rows,
        })
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let column = self.column(name)?;
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// Index of the first row whose `id` cell parses to `id`.
    fn find_row(&self, id: RecordId) -> Option<usize> {
        let id_column = self.column("id")?;
        self.rows.iter().position(|row| {
            row.get(id_column)
                .and_then(|cell| cell.trim().parse::<RecordId>().ok())
                == Some(id)
        })
    }

    fn upsert(&mut self, record: &Record) -> StoreResult<UpsertOutcome> {
        let mut positioned = Vec::new();
        for (name, value) in record.field_values() {
            let column = self.column(name).ok_or_else(|| {
                StoreError::InvalidData(format!(
                    "{} is missing the `{name}` column",
                    self.file_name
                ))
            })?;
            positioned.push((column, value));
        }

        let (index, outcome) = match self.find_row(record.id()) {
            Some(index) => (index, UpsertOutcome::Replaced),
            None => {
                self.rows.push(Vec::new());
                (self.rows.len() - 1, UpsertOutcome::Inserted)
            }
        };

        let header_len = self.headers.len();
        let row = &mut self.rows[index];
        if row.len() < header_len {
            row.resize(header_len, String::new());
        }
        for (column, value) in positioned {
            row[column] = value;
        }
        Ok(outcome)
    }

    fn record_at(&self, kind: RecordKind, row: usize, id: RecordId) -> StoreResult<Record> {
        let text = |name: &str| -> StoreResult<String> {
            self.cell(row, name).map(str::to_string).ok_or_else(|| {
                StoreError::InvalidData(format!(
                    "{} row for id {id} has no `{name}` value",
                    self.file_name
                ))
            })
        };
        let integer = |name: &str| -> StoreResult<i64> {
            let value = text(name)?;
            value.trim().parse::<i64>().map_err(|_| {
                StoreError::InvalidData(format!(
                    "{} row for id {id} has non-integer `{name}` value `{value}`",
                    self.file_name
                ))
            })
        };

        let record = match kind {
            RecordKind::User => Record::User(User {
                id,
                name: text("name")?,
                age: integer("age")?,
            }),
            RecordKind::Car => Record::Car(Car {
                id,
                color: text("color")?,
                car_type: text("type")?,
                model: text("model")?,
            }),
        };
        Ok(record)
    }

    /// Rewrites `path` with the header plus every row.
    ///
    /// A table with zero rows produces a header-only file. The rewritten file
    /// keeps the permissions of the file it replaces.
    fn write_atomic(&self, path: &Path) -> StoreResult<()> {
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(temp.as_file_mut());
            writer.write_record(&self.headers)?;
            for row in &self.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        temp.as_file().set_permissions(target_permissions(path)?)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|err| StoreError::Io(err.error))?;
        Ok(())
    }
}

/// Permissions the rewritten file should carry.
///
/// A missing target is created empty first so it gets the process umask mode
/// rather than the owner-only mode of the temp file. Callers hold the
/// exclusive lock, and an empty file loads as an empty table.
fn target_permissions(path: &Path) -> StoreResult<Permissions> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(metadata.permissions()),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            let file = OpenOptions::new().write(true).create_new(true).open(path)?;
            Ok(file.metadata()?.permissions())
        }
        Err(err) => Err(err.into()),
    }
}

/// Advisory lock on a sidecar file, released on drop.
struct FileLock {
    file: File,
}

impl FileLock {
    /// Creates the sidecar when missing; writers always lock.
    fn exclusive(path: &Path) -> StoreResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }

    /// Opens the sidecar read-only and never creates it.
    ///
    /// Returns `None` when no writer has created the sidecar yet. Reading
    /// unlocked is then safe because writers only replace the data file by
    /// rename.
    fn shared(path: &Path) -> StoreResult<Option<Self>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        FileExt::lock_shared(&file)?;
        Ok(Some(Self { file }))
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            warn!("event=csv_unlock module=repo status=error error={err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CsvTable, UpsertOutcome};
    use crate::model::record::{Record, RecordKind, User};

    fn user_table(rows: &[&[&str]]) -> CsvTable {
        let mut table = CsvTable::empty(RecordKind::User);
        table.rows = rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        table
    }

    #[test]
    fn find_row_skips_unparsable_ids() {
        let table = user_table(&[&["abc", "Broken", "1"], &[" 2 ", "Mary", "30"]]);
        assert_eq!(table.find_row(2), Some(1));
        assert_eq!(table.find_row(3), None);
    }

    #[test]
    fn upsert_replaces_in_place_and_keeps_extra_columns() {
        let mut table = user_table(&[&["1", "John", "20", "keep-me"]]);
        table.headers.push("note".to_string());

        let outcome = table
            .upsert(&Record::from(User::new(1, "Mary", 30)))
            .expect("upsert");
        assert_eq!(outcome, UpsertOutcome::Replaced);
        assert_eq!(table.rows, vec![vec!["1", "Mary", "30", "keep-me"]]);
    }

    #[test]
    fn upsert_pads_short_rows_and_appends_new_ids() {
        let mut table = user_table(&[&["1"]]);
        table
            .upsert(&Record::from(User::new(2, "Mike", 40)))
            .expect("append");
        table
            .upsert(&Record::from(User::new(1, "John", 20)))
            .expect("replace short row");

        assert_eq!(
            table.rows,
            vec![vec!["1", "John", "20"], vec!["2", "Mike", "40"]]
        );
    }

    #[test]
    fn record_at_rejects_non_integer_age() {
        let table = user_table(&[&["5", "Odd", "forty"]]);
        let err = table
            .record_at(RecordKind::User, 0, 5)
            .expect_err("bad age must fail");
        assert!(err.to_string().contains("non-integer `age`"));
    }
}
