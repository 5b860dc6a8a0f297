//! Values produced by function evaluation.

use std::fmt;

/// SQL type of a function argument or result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlKind {
    Integer,
    Double,
    Varchar,
}

impl SqlKind {
    pub fn name(&self) -> &'static str {
        match self {
            SqlKind::Integer => "INTEGER",
            SqlKind::Double => "DOUBLE",
            SqlKind::Varchar => "VARCHAR",
        }
    }
}

impl fmt::Display for SqlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one function call.
///
/// Spatial predicates return `Integer(1)` or `Integer(0)`; a call with any
/// NULL argument returns `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i32),
    Double(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            Value::Integer(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether a predicate result is true.
    pub fn is_true(&self) -> bool {
        self.as_i32() == Some(1)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Integer(i32::from(b))
    }
}
