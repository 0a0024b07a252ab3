use super::Direction;
use crate::{stmt::Value, Error, Result};

/// Type tag of a sort key column. Decoded cursor values are converted to
/// this type before being bound.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// Keep whatever the cursor carried
    #[default]
    Any,
    Int,
    Float,
    String,
    Bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKeyColumn {
    /// Column in the table
    pub column: String,

    /// Name under which the value appears in cursors
    pub name: String,

    pub direction: Direction,

    pub ty: KeyType,
}

/// A keyset pagination key: the columns rows are ordered by, which together
/// must be unique.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SortKey {
    pub columns: Vec<SortKeyColumn>,
}

impl SortKey {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Default, Clone)]
pub struct SortKeyBuilder {
    columns: Vec<SortKeyColumn>,
}

impl SortKeyBuilder {
    pub fn new() -> SortKeyBuilder {
        SortKeyBuilder::default()
    }

    pub fn by(&mut self, column: &str) -> &mut Self {
        self.push(column, Direction::Asc)
    }

    pub fn by_descending(&mut self, column: &str) -> &mut Self {
        self.push(column, Direction::Desc)
    }

    pub fn then_by(&mut self, column: &str) -> &mut Self {
        self.push(column, Direction::Asc)
    }

    pub fn then_by_descending(&mut self, column: &str) -> &mut Self {
        self.push(column, Direction::Desc)
    }

    /// Sets the cursor name of the most recently added column.
    pub fn named(&mut self, name: &str) -> &mut Self {
        if let Some(last) = self.columns.last_mut() {
            last.name = name.to_string();
        }
        self
    }

    /// Sets the type of the most recently added column.
    pub fn typed(&mut self, ty: KeyType) -> &mut Self {
        if let Some(last) = self.columns.last_mut() {
            last.ty = ty;
        }
        self
    }

    fn push(&mut self, column: &str, direction: Direction) -> &mut Self {
        self.columns.push(SortKeyColumn {
            column: column.to_string(),
            name: column.to_string(),
            direction,
            ty: KeyType::Any,
        });
        self
    }

    pub fn build(self) -> SortKey {
        SortKey {
            columns: self.columns,
        }
    }
}

impl KeyType {
    /// Converts a value decoded from a cursor.
    pub fn convert(self, name: &str, value: Value) -> Result<Value> {
        let value = value.normalize();

        let converted = match (self, &value) {
            (KeyType::Any, _) | (_, Value::Null) => Some(value.clone()),
            (KeyType::Int, _) => value.as_i64().map(Value::I64),
            (KeyType::Float, Value::F64(_)) => Some(value.clone()),
            (KeyType::Float, Value::I64(v)) => Some(Value::F64(*v as f64)),
            (KeyType::Float, Value::String(v)) => v.parse().ok().map(Value::F64),
            (KeyType::String, Value::String(_)) => Some(value.clone()),
            (KeyType::String, Value::I64(v)) => Some(Value::String(v.to_string())),
            (KeyType::Bool, Value::Bool(_)) => Some(value.clone()),
            _ => None,
        };

        converted.ok_or_else(|| {
            Error::invalid_cursor(format!(
                "value for `{name}` is not a valid {self:?}; got {}",
                value.kind_name()
            ))
        })
    }
}
