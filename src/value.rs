//! Typed scalar values stored in a configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single setting value.
///
/// Serialized untagged so configuration files hold plain scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The tag matching this value, `None` for null.
    pub fn type_tag(&self) -> Option<TypeTag> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(TypeTag::Bool),
            Value::Int(_) => Some(TypeTag::Int),
            Value::Float(_) => Some(TypeTag::Float),
            Value::Str(_) => Some(TypeTag::Str),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Declared value type of a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Str,
    Int,
    Float,
    Bool,
}

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Str => "str",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Bool => "bool",
        }
    }

    /// Convert `value` into this type.
    ///
    /// `Null` passes through untouched: an unset default stays unset.
    /// Returns `None` when the conversion is not possible.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (_, Value::Null) => Some(Value::Null),

            (TypeTag::Str, Value::Str(s)) => Some(Value::Str(s.clone())),
            (TypeTag::Str, other) => Some(Value::Str(other.to_string())),

            (TypeTag::Int, Value::Int(i)) => Some(Value::Int(*i)),
            (TypeTag::Int, Value::Float(f)) => {
                // Truncates toward zero; out-of-range floats are rejected.
                if f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                    Some(Value::Int(f.trunc() as i64))
                } else {
                    None
                }
            }
            (TypeTag::Int, Value::Str(s)) => s.trim().parse::<i64>().ok().map(Value::Int),
            (TypeTag::Int, Value::Bool(b)) => Some(Value::Int(i64::from(*b))),

            (TypeTag::Float, Value::Float(f)) => Some(Value::Float(*f)),
            (TypeTag::Float, Value::Int(i)) => Some(Value::Float(*i as f64)),
            (TypeTag::Float, Value::Str(s)) => s.trim().parse::<f64>().ok().map(Value::Float),
            (TypeTag::Float, Value::Bool(b)) => Some(Value::Float(if *b { 1.0 } else { 0.0 })),

            (TypeTag::Bool, Value::Bool(b)) => Some(Value::Bool(*b)),
            (TypeTag::Bool, Value::Int(i)) => Some(Value::Bool(*i != 0)),
            (TypeTag::Bool, Value::Float(f)) => Some(Value::Bool(*f != 0.0)),
            (TypeTag::Bool, Value::Str(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
