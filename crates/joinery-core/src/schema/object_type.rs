use super::{Field, TableConfig};
use crate::{Error, Result};

use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub struct ObjectType {
    name: String,
    table: Option<TableConfig>,
    fields: IndexMap<String, Field>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> ObjectType {
        ObjectType {
            name: name.into(),
            table: None,
            fields: IndexMap::new(),
        }
    }

    /// Backs the type by a table. Types without a table produce no SQL.
    pub fn table(mut self, table: TableConfig) -> Self {
        self.table = Some(table);
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_config(&self) -> Option<&TableConfig> {
        self.table.as_ref()
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub(super) fn validate(&self, types: &IndexMap<String, ObjectType>) -> Result<()> {
        if let Some(table) = &self.table {
            if table.unique_key.is_empty() {
                return Err(Error::invalid_configuration(format!(
                    "table for type `{}` has no unique key",
                    self.name
                )));
            }
        }

        for field in self.fields.values() {
            let location = format!("{}.{}", self.name, field.name);

            let Some((type_name, list)) = field.object_type() else {
                if field.paginate || field.batch.is_some() || field.junction.is_some() {
                    return Err(Error::invalid_configuration(format!(
                        "scalar field `{location}` cannot declare a relation"
                    )));
                }
                continue;
            };

            if !types.contains_key(type_name) {
                return Err(Error::invalid_configuration(format!(
                    "field `{location}` refers to unknown type `{type_name}`"
                )));
            }

            let relations = [
                field.join.is_some(),
                field.batch.is_some(),
                field.junction.is_some(),
            ];
            if relations.iter().filter(|set| **set).count() > 1 {
                return Err(Error::invalid_configuration(format!(
                    "field `{location}` declares more than one of join, batch and junction"
                )));
            }

            if field.paginate && !list {
                return Err(Error::invalid_configuration(format!(
                    "field `{location}` is paginated but is not a list"
                )));
            }
        }

        Ok(())
    }
}
