//! Declarative mapping of output types and fields onto tables and columns.
//!
//! A [`Schema`] is built once, validated, and then shared read-only by every
//! request.

mod delegate;
pub use delegate::{
    ColumnExprFn, JoinFn, OrderByFn, SortKeyFn, TableColumnExprFn, TableNameFn, WhereFn,
};

mod field;
pub use field::{Field, FieldType};

mod object_type;
pub use object_type::ObjectType;

mod relation;
pub use relation::{BatchConfig, JunctionBatchConfig, JunctionConfig};

mod table;
pub use table::{TableConfig, TableName, TableSource};

use crate::{Error, Result};

use indexmap::IndexMap;

#[derive(Debug)]
pub struct Schema {
    types: IndexMap<String, ObjectType>,
    query_type: String,
}

#[derive(Debug)]
pub struct Builder {
    types: Vec<ObjectType>,
    query_type: String,
}

impl Schema {
    pub fn builder() -> Builder {
        Builder {
            types: vec![],
            query_type: "Query".to_string(),
        }
    }

    /// The type whose fields are request entry points.
    pub fn query_type(&self) -> &ObjectType {
        &self.types[&self.query_type]
    }

    pub fn object_type(&self, name: &str) -> Option<&ObjectType> {
        self.types.get(name)
    }

    pub fn object_types(&self) -> impl Iterator<Item = &ObjectType> {
        self.types.values()
    }
}

impl Builder {
    /// Names the type holding the request entry points. Defaults to `Query`.
    pub fn query_type(mut self, name: impl Into<String>) -> Self {
        self.query_type = name.into();
        self
    }

    pub fn object(mut self, ty: ObjectType) -> Self {
        self.types.push(ty);
        self
    }

    pub fn build(self) -> Result<Schema> {
        let mut types = IndexMap::new();

        for ty in self.types {
            let name = ty.name().to_string();
            if types.insert(name.clone(), ty).is_some() {
                return Err(Error::invalid_configuration(format!(
                    "object type `{name}` is declared more than once"
                )));
            }
        }

        if !types.contains_key(&self.query_type) {
            return Err(Error::invalid_configuration(format!(
                "query type `{}` is not declared",
                self.query_type
            )));
        }

        for ty in types.values() {
            ty.validate(&types)?;
        }

        Ok(Schema {
            types,
            query_type: self.query_type,
        })
    }
}
