//! Shared input checks run by every backend before touching its medium.
//!
//! # Responsibility
//! - Turn untyped boundary input (JSON values, kind strings) into the closed
//!   `Record` / `RecordKind` types.
//! - Reject anything else with `InvalidType` / `InvalidKind`.
//!
//! # Invariants
//! - Pure functions: no I/O, no logging side effects.
//! - Kind names are matched case-insensitively after trimming.

use crate::model::record::{Record, RecordKind};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Rejections raised before any persistence side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value is not exactly a `User` or `Car` shape.
    InvalidType { got: String },
    /// Kind selector is not `user` or `car`.
    InvalidKind(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidType { got } => {
                write!(f, "invalid data type: expected `user` or `car` but got {got}")
            }
            Self::InvalidKind(kind) => {
                write!(f, "invalid kind: expected `user` or `car` but got `{kind}`")
            }
        }
    }
}

impl Error for ValidationError {}

/// Validates a kind selector such as `"user"` or `" CAR "`.
///
/// # Errors
/// - `InvalidKind` for anything other than `user` / `car`.
pub fn validate_kind(kind: &str) -> ValidationResult<RecordKind> {
    let normalized = kind.trim().to_ascii_lowercase();
    RecordKind::ALL
        .into_iter()
        .find(|candidate| candidate.as_str() == normalized)
        .ok_or_else(|| ValidationError::InvalidKind(kind.to_string()))
}

/// Validates an untyped value and converts it into a `Record`.
///
/// Accepts only objects carrying a `kind` tag and the full field set of that
/// kind, e.g. `{"kind":"car","id":4,"color":"blue","type":"toyota","model":"corolla"}`.
/// A plain field mapping without the tag is not a record.
///
/// # Errors
/// - `InvalidType` when the shape is not exactly a `User` or `Car`,
///   including extra fields belonging to neither.
pub fn validate_record(data: &Value) -> ValidationResult<Record> {
    let object = match data {
        Value::Object(object) => object,
        other => {
            return Err(ValidationError::InvalidType {
                got: describe_value(other),
            })
        }
    };

    let kind = match object.get("kind").and_then(Value::as_str).map(validate_kind) {
        Some(Ok(kind)) => kind,
        _ => {
            return Err(ValidationError::InvalidType {
                got: describe_value(data),
            })
        }
    };

    let mut normalized = object.clone();
    normalized.insert("kind".to_string(), Value::from(kind.as_str()));
    serde_json::from_value::<Record>(Value::Object(normalized)).map_err(|err| {
        ValidationError::InvalidType {
            got: format!("{} ({err})", describe_value(data)),
        }
    })
}

impl FromStr for RecordKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        validate_kind(value)
    }
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(object) => {
            let keys = object.keys().map(String::as_str).collect::<Vec<_>>();
            format!("mapping with keys [{}]", keys.join(", "))
        }
    }
}
