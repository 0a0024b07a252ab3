use super::Connection;
use crate::{Error, Result};

use indexmap::IndexMap;

/// A value flowing through the planner: row cells, parameters, arguments,
/// and the nested result handed back to the caller.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// Null value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Signed 64-bit integer
    I64(i64),

    /// 64-bit float
    F64(f64),

    /// String value
    String(String),

    /// A structured value returned by the database (`json`/`jsonb` columns)
    Json(serde_json::Value),

    /// A list of values
    List(Vec<Value>),

    /// A nested object keyed by response field name
    Object(IndexMap<String, Value>),

    /// A paginated connection
    Connection(Box<Connection>),
}

/// A hashable projection of a scalar value, used to correlate batch rows
/// with their parents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Bool(bool),
    Int(i64),
    /// Non-integral floats, compared by bit pattern
    Float(u64),
    String(String),
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn object() -> Self {
        Self::Object(IndexMap::new())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            Self::F64(v) if v.fract() == 0.0 => Some(*v as i64),
            Self::String(v) => v.parse().ok(),
            Self::Json(serde_json::Value::Number(v)) => v.as_i64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut IndexMap<String, Value>> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_connection(&self) -> Option<&Connection> {
        match self {
            Self::Connection(connection) => Some(connection),
            _ => None,
        }
    }

    /// Look up a field of an object value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.as_object()?.get(field)
    }

    pub fn into_list(self) -> Result<Vec<Value>> {
        match self {
            Self::List(items) => Ok(items),
            other => Err(Error::invalid_result(format!(
                "expected a list, got {}",
                other.kind_name()
            ))),
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::I64(_) => "I64",
            Self::F64(_) => "F64",
            Self::String(_) => "String",
            Self::Json(_) => "Json",
            Self::List(_) => "List",
            Self::Object(_) => "Object",
            Self::Connection(_) => "Connection",
        }
    }

    /// Normalize a value arriving from the database into plain scalars.
    ///
    /// Structured values are unpacked: JSON arrays become lists and JSON
    /// scalars become their typed equivalent. Integral floats collapse to
    /// integers so keys compare the same regardless of the column type the
    /// driver reported.
    pub fn normalize(self) -> Value {
        match self {
            Self::Json(json) => Value::from(json).normalize(),
            Self::F64(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Self::I64(v as i64),
            Self::List(items) => Self::List(items.into_iter().map(Value::normalize).collect()),
            other => other,
        }
    }

    /// Returns the correlation keys carried by this value: none for null,
    /// one for a scalar, and one per non-null item for a list.
    pub fn keys(&self) -> Vec<Key> {
        match self.clone().normalize() {
            Self::List(items) => items.iter().filter_map(Value::key).collect(),
            other => other.key().into_iter().collect(),
        }
    }

    /// Hashable projection of a scalar value.
    pub fn key(&self) -> Option<Key> {
        match self {
            Self::Bool(v) => Some(Key::Bool(*v)),
            Self::I64(v) => Some(Key::Int(*v)),
            Self::F64(v) if v.fract() == 0.0 => Some(Key::Int(*v as i64)),
            Self::F64(v) => Some(Key::Float(v.to_bits())),
            Self::String(v) => Some(Key::String(v.clone())),
            Self::Json(json) => Value::from(json.clone()).key(),
            _ => None,
        }
    }
}

impl Key {
    pub fn into_value(self) -> Value {
        match self {
            Key::Bool(v) => Value::Bool(v),
            Key::Int(v) => Value::I64(v),
            Key::Float(v) => Value::F64(f64::from_bits(v)),
            Key::String(v) => Value::String(v),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(src: serde_json::Value) -> Value {
        use serde_json::Value as Json;

        match src {
            Json::Null => Value::Null,
            Json::Bool(v) => Value::Bool(v),
            Json::Number(v) => match v.as_i64() {
                Some(v) => Value::I64(v),
                None => Value::F64(v.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(v) => Value::String(v),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(src: bool) -> Value {
        Value::Bool(src)
    }
}

impl From<i32> for Value {
    fn from(src: i32) -> Value {
        Value::I64(src.into())
    }
}

impl From<i64> for Value {
    fn from(src: i64) -> Value {
        Value::I64(src)
    }
}

impl From<f64> for Value {
    fn from(src: f64) -> Value {
        Value::F64(src)
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Value {
        Value::String(src.to_string())
    }
}

impl From<String> for Value {
    fn from(src: String) -> Value {
        Value::String(src)
    }
}

impl From<Connection> for Value {
    fn from(src: Connection) -> Value {
        Value::Connection(Box::new(src))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(src: Option<T>) -> Value {
        src.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(src: Vec<T>) -> Value {
        Value::List(src.into_iter().map(Into::into).collect())
    }
}
