use serde::Serialize;
use std::fmt;

/// A cell of a [`crate::ResultTable`] or a property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Number of characters the value occupies when displayed.
    pub fn display_width(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Text(s) => s.chars().count(),
            other => other.to_string().chars().count(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

/// A routine argument after coercion to its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Int(i32),
    Float(f32),
    Text(String),
}

impl BindValue {
    pub fn to_duckdb(&self) -> duckdb::types::Value {
        match self {
            BindValue::Int(i) => duckdb::types::Value::Int(*i),
            BindValue::Float(x) => duckdb::types::Value::Float(*x),
            BindValue::Text(s) => duckdb::types::Value::Text(s.clone()),
        }
    }
}

impl fmt::Display for BindValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindValue::Int(i) => write!(f, "{i}"),
            BindValue::Float(x) => write!(f, "{x}"),
            BindValue::Text(s) => write!(f, "'{s}'"),
        }
    }
}
