use recstore_core::db::schema::table_exists;
use recstore_core::db::{open_db, open_db_in_memory};
use recstore_core::{Car, Record, RecordKind, RecordStore, SqliteRecordStore, User};
use rusqlite::Connection;

fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn tables_are_created_lazily_per_kind() {
    let store = SqliteRecordStore::new(open_db_in_memory().unwrap());
    assert!(!table_exists(store.connection(), RecordKind::User).unwrap());
    assert!(!table_exists(store.connection(), RecordKind::Car).unwrap());

    store.create(&Record::from(User::new(1, "John", 20))).unwrap();
    assert!(table_exists(store.connection(), RecordKind::User).unwrap());
    assert!(!table_exists(store.connection(), RecordKind::Car).unwrap());

    assert!(store.get(1, RecordKind::Car).unwrap_err().is_not_found());
    assert!(table_exists(store.connection(), RecordKind::Car).unwrap());
}

#[test]
fn upsert_keeps_one_row_per_id() {
    let store = SqliteRecordStore::open_in_memory().unwrap();

    store.create(&Record::from(User::new(1, "John", 20))).unwrap();
    store.create(&Record::from(User::new(1, "Mary", 30))).unwrap();
    store.create(&Record::from(User::new(2, "Mike", 40))).unwrap();

    assert_eq!(row_count(store.connection(), "user"), 2);
    let (name, age): (String, i64) = store
        .connection()
        .query_row("SELECT name, age FROM user WHERE id = 1;", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(name, "Mary");
    assert_eq!(age, 30);
}

#[test]
fn values_are_bound_not_interpolated() {
    let store = SqliteRecordStore::open_in_memory().unwrap();
    let hostile = Record::from(Car::new(
        9,
        "red'); DROP TABLE car; --",
        "o'reilly",
        "\"quoted\"",
    ));

    store.create(&hostile).unwrap();

    assert_eq!(store.get(9, RecordKind::Car).unwrap(), hostile);
    assert_eq!(row_count(store.connection(), "car"), 1);
}

#[test]
fn age_is_stored_as_integer() {
    let store = SqliteRecordStore::open_in_memory().unwrap();
    store.create(&Record::from(User::new(3, "Ann", 61))).unwrap();

    let storage_class: String = store
        .connection()
        .query_row("SELECT typeof(age) FROM user WHERE id = 3;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(storage_class, "integer");
}

#[test]
fn records_survive_reopening_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.sqlite3");

    {
        let store = SqliteRecordStore::open(&path).unwrap();
        store
            .create(&Record::from(Car::new(4, "blue", "toyota", "corolla")))
            .unwrap();
    }

    let reopened = SqliteRecordStore::new(open_db(&path).unwrap());
    assert_eq!(
        reopened.get(4, RecordKind::Car).unwrap(),
        Record::Car(Car::new(4, "blue", "toyota", "corolla"))
    );
}

#[test]
fn invalid_type_does_not_create_tables() {
    let store = SqliteRecordStore::open_in_memory().unwrap();

    let err = store
        .create_value(&serde_json::json!({"id": 1, "color": "red", "type": "toyota", "model": "corolla"}))
        .unwrap_err();
    assert!(err.is_invalid_type());
    assert!(!table_exists(store.connection(), RecordKind::Car).unwrap());
}
