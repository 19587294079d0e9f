use recstore_core::{
    open_store, BackendKind, Car, CsvRecordStore, Record, RecordKind, RecordStore,
    SqliteRecordStore, StoreConfig, StoreError, User, ValidationError,
};
use serde_json::json;
use tempfile::TempDir;

/// Runs `check` once against a fresh CSV store and once against a fresh
/// SQLite store.
fn for_each_backend(check: impl Fn(&dyn RecordStore)) {
    let dir = TempDir::new().unwrap();
    let csv = CsvRecordStore::new(dir.path().join("csv"));
    check(&csv);

    let sqlite = SqliteRecordStore::open(dir.path().join("records.sqlite3")).unwrap();
    check(&sqlite);
}

fn seed(store: &dyn RecordStore) {
    for user in [
        User::new(1, "John", 20),
        User::new(2, "Mary", 30),
        User::new(3, "Mike", 40),
    ] {
        store.create(&Record::from(user)).unwrap();
    }
    for car in [
        Car::new(1, "red", "toyota", "corolla"),
        Car::new(2, "blue", "toyota", "camry"),
        Car::new(3, "green", "ford", "mustang"),
    ] {
        store.create(&Record::from(car)).unwrap();
    }
}

#[test]
fn create_then_get_roundtrips_every_field() {
    for_each_backend(|store| {
        seed(store);

        let user = store.get(2, RecordKind::User).unwrap();
        assert_eq!(user, Record::User(User::new(2, "Mary", 30)), "{}", store.backend_name());

        let car = store.get(3, RecordKind::Car).unwrap();
        assert_eq!(
            car,
            Record::Car(Car::new(3, "green", "ford", "mustang")),
            "{}",
            store.backend_name()
        );
    });
}

#[test]
fn repeated_create_overwrites_instead_of_accumulating() {
    for_each_backend(|store| {
        store.create(&Record::from(User::new(1, "John", 20))).unwrap();
        store.create(&Record::from(User::new(1, "Mary", 30))).unwrap();

        let loaded = store.get(1, RecordKind::User).unwrap();
        let user = loaded.as_user().unwrap();
        assert_eq!(user.name, "Mary", "{}", store.backend_name());
        assert_eq!(user.age, 30, "{}", store.backend_name());
    });
}

#[test]
fn same_record_twice_is_idempotent() {
    for_each_backend(|store| {
        let record = Record::from(Car::new(7, "black", "honda", "civic"));
        store.create(&record).unwrap();
        store.create(&record).unwrap();

        assert_eq!(store.get(7, RecordKind::Car).unwrap(), record);
    });
}

#[test]
fn car_fields_come_back_exactly() {
    for_each_backend(|store| {
        store
            .create(&Record::from(Car::new(4, "blue", "toyota", "corolla")))
            .unwrap();

        let loaded = store.get(4, RecordKind::Car).unwrap();
        let car = loaded.as_car().unwrap();
        assert_eq!(car.color, "blue");
        assert_eq!(car.car_type, "toyota");
        assert_eq!(car.model, "corolla");
    });
}

#[test]
fn user_and_car_ids_are_independent() {
    for_each_backend(|store| {
        store.create(&Record::from(User::new(5, "Ana", 33))).unwrap();
        store
            .create(&Record::from(Car::new(5, "white", "kia", "rio")))
            .unwrap();

        assert_eq!(store.get(5, RecordKind::User).unwrap().kind(), RecordKind::User);
        assert_eq!(store.get(5, RecordKind::Car).unwrap().kind(), RecordKind::Car);
    });
}

#[test]
fn unknown_id_returns_not_found_with_kind_and_id() {
    for_each_backend(|store| {
        seed(store);

        let err = store.get(100, RecordKind::User).unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound {
                kind: RecordKind::User,
                id: 100
            }
        ));
        assert!(store.get(100, RecordKind::Car).unwrap_err().is_not_found());
    });
}

#[test]
fn get_on_empty_medium_returns_not_found() {
    for_each_backend(|store| {
        let err = store.get(1, RecordKind::User).unwrap_err();
        assert!(err.is_not_found(), "{}: {err}", store.backend_name());
    });
}

#[test]
fn plain_mapping_is_rejected_as_invalid_type_without_side_effects() {
    for_each_backend(|store| {
        let invalid_user = json!({"id": 1, "name": "John", "age": 20});
        let invalid_car = json!({"id": 1, "color": "red", "type": "toyota", "model": "corolla"});

        assert!(store.create_value(&invalid_user).unwrap_err().is_invalid_type());
        assert!(store.create_value(&invalid_car).unwrap_err().is_invalid_type());

        assert!(store.get(1, RecordKind::User).unwrap_err().is_not_found());
        assert!(store.get(1, RecordKind::Car).unwrap_err().is_not_found());
    });
}

#[test]
fn mixed_record_shape_is_rejected_as_invalid_type_without_side_effects() {
    for_each_backend(|store| {
        let mixed = json!({
            "kind": "user", "id": 1, "name": "John", "age": 20, "color": "red", "model": "x"
        });

        assert!(store.create_value(&mixed).unwrap_err().is_invalid_type());

        assert!(store.get(1, RecordKind::User).unwrap_err().is_not_found());
        assert!(store.get(1, RecordKind::Car).unwrap_err().is_not_found());
    });
}

#[test]
fn tagged_value_is_accepted_through_create_value() {
    for_each_backend(|store| {
        store
            .create_value(&json!({"kind": "user", "id": 8, "name": "Zoe", "age": 27}))
            .unwrap();
        assert_eq!(
            store.get_named(8, "USER").unwrap(),
            Record::User(User::new(8, "Zoe", 27))
        );
    });
}

#[test]
fn unknown_kind_is_rejected_as_invalid_kind() {
    for_each_backend(|store| {
        seed(store);

        let err = store.get_named(1, "truck").unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::InvalidKind(ref kind)) if kind == "truck"
        ));
        assert!(err.is_invalid_kind());
    });
}

#[test]
fn open_store_selects_backend_from_config() {
    let dir = TempDir::new().unwrap();
    for backend in [BackendKind::Csv, BackendKind::Sqlite] {
        let config = StoreConfig::new(backend, dir.path().join(backend.as_str()));
        let store = open_store(&config).unwrap();
        assert_eq!(store.backend_name(), backend.as_str());

        store.create(&Record::from(User::new(2, "Bob", 40))).unwrap();
        store.create(&Record::from(User::new(2, "Alice", 30))).unwrap();
        assert_eq!(
            store.get_named(2, "user").unwrap(),
            Record::User(User::new(2, "Alice", 30))
        );
    }
}
