//! Attribute values held by records
//!
//! A [`Value`] is the in-memory form of one column of one row. It doubles as a
//! bind parameter when the adapter builds INSERT, UPDATE and locator queries.

use std::fmt;

use bytes::Bytes;

use crate::types::{LobData, OracleDate};

/// Represents the value of one record attribute.
///
/// # Example
///
/// ```rust
/// use oracle_enhanced::Value;
///
/// let title: Value = "Release notes".into();
/// assert_eq!(title.as_str(), Some("Release notes"));
/// assert!(Value::from(None::<i64>).is_null());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,
    /// String value (VARCHAR2, CHAR, CLOB content)
    String(String),
    /// Byte array (RAW, BLOB content)
    Bytes(Bytes),
    /// Integer value (NUMBER that fits in i64)
    Integer(i64),
    /// Floating point value (NUMBER, BINARY_FLOAT, BINARY_DOUBLE)
    Float(f64),
    /// Boolean value (emulated as NUMBER(1))
    Boolean(bool),
    /// Date value
    Date(OracleDate),
    /// Structured value of a serialized attribute, stored as JSON text
    Json(serde_json::Value),
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is NULL or an empty string/byte array
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            _ => false,
        }
    }

    /// Try to get as a string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert into LOB content, if this value has a LOB representation
    ///
    /// JSON values are rendered as text; scalars have no LOB form.
    pub fn to_lob_data(&self) -> Option<LobData> {
        match self {
            Value::String(s) => Some(LobData::String(s.clone())),
            Value::Bytes(b) => Some(LobData::Bytes(b.clone())),
            Value::Json(j) => Some(LobData::String(j.to_string())),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(Bytes::copy_from_slice(v))
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(v))
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<OracleDate> for Value {
    fn from(v: OracleDate) -> Self {
        Value::Date(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::String(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d),
            Value::Json(json) => write!(f, "{}", json),
        }
    }
}
