//! Record domain model.
//!
//! # Responsibility
//! - Define the two persisted record shapes (`User`, `Car`).
//! - Define the closed `Record` union and the `RecordKind` selector used to
//!   pick a storage unit (CSV file or SQLite table).
//!
//! # Invariants
//! - `id` is the only identity field; `(kind, id)` is unique per medium.
//! - Field declaration order is the persisted column order.
//! - `Car::car_type` is serialized as `type` in every medium.
//! - Deserializing a shape with fields of another shape fails; nothing is
//!   silently dropped.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Integer identity shared by every record kind.
pub type RecordId = i64;

/// Persisted column names for `user` rows, in declaration order.
pub const USER_FIELDS: &[&str] = &["id", "name", "age"];
/// Persisted column names for `car` rows, in declaration order.
pub const CAR_FIELDS: &[&str] = &["id", "color", "type", "model"];

/// Selector for record shape and physical storage unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    User,
    Car,
}

impl RecordKind {
    /// All kinds, in a stable order.
    pub const ALL: [RecordKind; 2] = [RecordKind::User, RecordKind::Car];

    /// Stable lowercase name; also the SQLite table name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Car => "car",
        }
    }

    /// Column names in persisted order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::User => USER_FIELDS,
            Self::Car => CAR_FIELDS,
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    pub id: RecordId,
    pub name: String,
    pub age: i64,
}

impl User {
    pub fn new(id: RecordId, name: impl Into<String>, age: i64) -> Self {
        Self {
            id,
            name: name.into(),
            age,
        }
    }
}

/// A vehicle record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Car {
    pub id: RecordId,
    pub color: String,
    /// Serialized as `type` to match the persisted column name.
    #[serde(rename = "type")]
    pub car_type: String,
    pub model: String,
}

impl Car {
    pub fn new(
        id: RecordId,
        color: impl Into<String>,
        car_type: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id,
            color: color.into(),
            car_type: car_type.into(),
            model: model.into(),
        }
    }
}

/// Closed union over every storable record shape.
///
/// Serialized with an inline `kind` tag, e.g.
/// `{"kind":"user","id":1,"name":"John","age":20}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    User(User),
    Car(Car),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::User(_) => RecordKind::User,
            Self::Car(_) => RecordKind::Car,
        }
    }

    pub fn id(&self) -> RecordId {
        match self {
            Self::User(user) => user.id,
            Self::Car(car) => car.id,
        }
    }

    /// Text values for each column of `self.kind().fields()`, same order.
    pub fn field_values(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::User(user) => vec![
                ("id", user.id.to_string()),
                ("name", user.name.clone()),
                ("age", user.age.to_string()),
            ],
            Self::Car(car) => vec![
                ("id", car.id.to_string()),
                ("color", car.color.clone()),
                ("type", car.car_type.clone()),
                ("model", car.model.clone()),
            ],
        }
    }

    pub fn as_user(&self) -> Option<&User> {
        match self {
            Self::User(user) => Some(user),
            Self::Car(_) => None,
        }
    }

    pub fn as_car(&self) -> Option<&Car> {
        match self {
            Self::Car(car) => Some(car),
            Self::User(_) => None,
        }
    }
}

impl From<User> for Record {
    fn from(value: User) -> Self {
        Self::User(value)
    }
}

impl From<Car> for Record {
    fn from(value: Car) -> Self {
        Self::Car(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{Car, Record, RecordKind, User};

    #[test]
    fn field_values_follow_declared_column_order() {
        let car = Record::from(Car::new(4, "blue", "toyota", "corolla"));
        let names: Vec<&str> = car.field_values().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, RecordKind::Car.fields());

        let user = Record::from(User::new(1, "John", 20));
        let names: Vec<&str> = user.field_values().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, RecordKind::User.fields());
    }

    #[test]
    fn record_kind_and_id_match_variant() {
        let record = Record::from(User::new(7, "Mike", 40));
        assert_eq!(record.kind(), RecordKind::User);
        assert_eq!(record.id(), 7);
        assert!(record.as_car().is_none());
    }
}
