use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A generated value for a column.
///
/// The `Str` variant uses `Cow<'static, str>` so that values drawn from
/// static lookup tables (personas, statuses, edge-case catalogs) can be held
/// as zero-cost `&'static str` borrows, while dynamically generated values
/// are stored as owned `String`s.
///
/// `Decimal` carries its arbitrary-scale textual form so precision/scale are
/// preserved exactly through every output format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(String),
    Str(Cow<'static, str>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Uuid(Uuid),
    Json(serde_json::Value),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn from_string(s: String) -> Self {
        Value::Str(Cow::Owned(s))
    }

    pub fn from_static_str(s: &'static str) -> Self {
        Value::Str(Cow::Borrowed(s))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view used by CHECK evaluation and bounds narrowing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Decimal(d) => d.parse().ok(),
            _ => None,
        }
    }

    /// Convert to a SQL literal suitable for INSERT statements. String
    /// literals are single-quoted with doubled-quote escaping, bytes are
    /// emitted as hex, temporal values as ISO-8601.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => {
                if f.is_finite() {
                    format!("{}", f)
                } else {
                    format!("'{}'", f)
                }
            }
            Value::Decimal(d) => d.clone(),
            Value::Str(s) => format!("'{}'", s.replace('\'', "''")),
            Value::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
            Value::Time(t) => format!("'{}'", t.format("%H:%M:%S")),
            Value::Timestamp(ts) => format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S")),
            Value::Uuid(u) => format!("'{}'", u),
            Value::Json(j) => format!("'{}'", j.to_string().replace('\'', "''")),
            Value::Bytes(b) => format!("X'{}'", hex_encode(b)),
        }
    }

    /// Convert to a CSV cell string (unquoted; RFC 4180 quoting is applied
    /// by the CSV writer).
    pub fn to_csv_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Decimal(d) => d.clone(),
            Value::Str(s) => s.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Time(t) => t.format("%H:%M:%S").to_string(),
            Value::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::Uuid(u) => u.to_string(),
            Value::Json(j) => j.to_string(),
            Value::Bytes(b) => hex_encode(b),
        }
    }

    /// Canonical string form used for uniqueness tracking.
    pub fn to_unique_key(&self) -> String {
        match self {
            Value::Null => "__NULL__".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format!("{:.10}", f),
            Value::Decimal(d) => d.clone(),
            Value::Str(s) => s.to_string(),
            Value::Date(d) => d.to_string(),
            Value::Time(t) => t.to_string(),
            Value::Timestamp(ts) => ts.to_string(),
            Value::Uuid(u) => u.to_string(),
            Value::Json(j) => j.to_string(),
            Value::Bytes(b) => hex_encode(b),
        }
    }

    /// JSON representation for the JSON / JSON Lines exporters.
    /// Bytes are rendered as hex strings, temporals as ISO-8601.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::json!(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Decimal(d) => serde_json::Value::String(d.clone()),
            Value::Str(s) => serde_json::Value::String(s.to_string()),
            Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            Value::Time(t) => serde_json::Value::String(t.format("%H:%M:%S").to_string()),
            Value::Timestamp(ts) => {
                serde_json::Value::String(ts.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
            Value::Uuid(u) => serde_json::Value::String(u.to_string()),
            Value::Json(j) => j.clone(),
            Value::Bytes(b) => serde_json::Value::String(hex_encode(b)),
        }
    }

    /// Rebuild a `Value` from an exported JSON value. Types that serialize
    /// as strings (dates, UUIDs, decimals) come back as strings; round-trip
    /// identity holds at the JSON level, which is what the importer
    /// guarantees.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::from_string(s.clone()),
            other => Value::Json(other.clone()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Str(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d),
            Value::Time(t) => write!(f, "{}", t),
            Value::Timestamp(ts) => write!(f, "{}", ts),
            Value::Uuid(u) => write!(f, "{}", u),
            Value::Json(j) => write!(f, "{}", j),
            Value::Bytes(b) => write!(f, "{}", hex_encode(b)),
        }
    }
}

pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_literal_quoting() {
        let v = Value::from_string("O'Brien".to_string());
        assert_eq!(v.to_sql_literal(), "'O''Brien'");
    }

    #[test]
    fn test_sql_literal_bytes_hex() {
        let v = Value::Bytes(vec![0xDE, 0xAD]);
        assert_eq!(v.to_sql_literal(), "X'dead'");
    }

    #[test]
    fn test_decimal_keeps_scale() {
        let v = Value::Decimal("12.340".to_string());
        assert_eq!(v.to_sql_literal(), "12.340");
        assert_eq!(v.to_csv_string(), "12.340");
        assert_eq!(v.as_f64(), Some(12.34));
    }

    #[test]
    fn test_unique_key_normalizes_null() {
        assert_eq!(Value::Null.to_unique_key(), "__NULL__");
    }

    #[test]
    fn test_json_round_trip_scalars() {
        for v in [
            Value::Null,
            Value::Bool(true),
            Value::Int(-3),
            Value::from_string("hi".to_string()),
        ] {
            let back = Value::from_json(&v.to_json());
            assert_eq!(back.to_json(), v.to_json());
        }
    }
}
