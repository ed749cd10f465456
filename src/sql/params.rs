//! Convert JSON values (and query-string values) into typed SQLite bind values.

use crate::orm::FieldType;
use serde_json::Value;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

/// A value that can be bound to a SQLite query, already coerced to its column type.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

/// Why a value could not be coerced; the caller turns this into a field-level message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoerceError {
    pub expected: FieldType,
}

impl BindValue {
    /// Coerce a JSON value from a request body into the column type of `field_type`.
    pub fn from_json(field_type: FieldType, v: &Value) -> Result<Self, CoerceError> {
        let err = || CoerceError { expected: field_type };
        if v.is_null() {
            return Ok(BindValue::Null);
        }
        Ok(match field_type {
            FieldType::Text => match v {
                Value::String(s) => BindValue::Text(s.clone()),
                Value::Number(n) => BindValue::Text(n.to_string()),
                Value::Bool(b) => BindValue::Text(b.to_string()),
                _ => return Err(err()),
            },
            FieldType::Integer => match v {
                Value::Number(n) => BindValue::Integer(n.as_i64().ok_or_else(err)?),
                Value::String(s) => BindValue::Integer(s.trim().parse().map_err(|_| err())?),
                _ => return Err(err()),
            },
            FieldType::Number => match v {
                Value::Number(n) => BindValue::Real(n.as_f64().ok_or_else(err)?),
                Value::String(s) => BindValue::Real(parse_finite(s).ok_or_else(err)?),
                _ => return Err(err()),
            },
            FieldType::Boolean => match v {
                Value::Bool(b) => BindValue::Bool(*b),
                Value::Number(n) => match n.as_i64() {
                    Some(0) => BindValue::Bool(false),
                    Some(1) => BindValue::Bool(true),
                    _ => return Err(err()),
                },
                Value::String(s) => BindValue::Bool(parse_bool(s).ok_or_else(err)?),
                _ => return Err(err()),
            },
            FieldType::Date => match v {
                Value::String(s) => BindValue::Text(normalize_date(s).ok_or_else(err)?),
                _ => return Err(err()),
            },
            FieldType::Object => BindValue::Text(v.to_string()),
        })
    }

    /// Coerce a raw query-string value (list filters) into the column type.
    pub fn from_query(field_type: FieldType, s: &str) -> Result<Self, CoerceError> {
        match field_type {
            FieldType::Text => Ok(BindValue::Text(s.to_string())),
            FieldType::Object => Ok(BindValue::Text(s.to_string())),
            _ => Self::from_json(field_type, &Value::String(s.to_string())),
        }
    }
}

fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// RFC 3339 timestamps are stored normalized to UTC; plain `YYYY-MM-DD` dates as given.
fn normalize_date(s: &str) -> Option<String> {
    let s = s.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&chrono::Utc).to_rfc3339());
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Bind params in order onto a query built from a `QueryBuf`.
pub fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &[BindValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for p in params {
        query = match p {
            BindValue::Null => query.bind(None::<String>),
            BindValue::Bool(b) => query.bind(*b),
            BindValue::Integer(n) => query.bind(*n),
            BindValue::Real(f) => query.bind(*f),
            BindValue::Text(s) => query.bind(s.clone()),
        };
    }
    query
}
