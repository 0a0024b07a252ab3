use super::{BatchConfig, ColumnExprFn, JoinFn, JunctionConfig, OrderByFn, SortKeyFn, WhereFn};
use crate::{
    clause::{JoinBuilder, OrderByBuilder, SortKeyBuilder, WhereBuilder},
    request::Context,
    stmt::Arguments,
};

use std::{fmt, sync::Arc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar,
    Object { type_name: String, list: bool },
}

/// Column metadata and relation delegates for one field of an object type.
#[derive(Clone)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) ty: FieldType,
    pub(crate) column: Option<String>,
    pub(crate) expression: Option<ColumnExprFn>,
    pub(crate) ignored: bool,
    pub(crate) dependencies: Vec<String>,
    pub(crate) join: Option<JoinFn>,
    pub(crate) batch: Option<BatchConfig>,
    pub(crate) junction: Option<JunctionConfig>,
    pub(crate) where_: Option<WhereFn>,
    pub(crate) order_by: Option<OrderByFn>,
    pub(crate) sort_key: Option<SortKeyFn>,
    pub(crate) paginate: bool,
}

impl Field {
    fn new(name: impl Into<String>, ty: FieldType) -> Field {
        Field {
            name: name.into(),
            ty,
            column: None,
            expression: None,
            ignored: false,
            dependencies: vec![],
            join: None,
            batch: None,
            junction: None,
            where_: None,
            order_by: None,
            sort_key: None,
            paginate: false,
        }
    }

    /// A field read from a column of the same name.
    pub fn scalar(name: impl Into<String>) -> Field {
        Field::new(name, FieldType::Scalar)
    }

    /// A field resolving to a single object of `type_name`.
    pub fn object(name: impl Into<String>, type_name: impl Into<String>) -> Field {
        Field::new(
            name,
            FieldType::Object {
                type_name: type_name.into(),
                list: false,
            },
        )
    }

    /// A field resolving to a list of `type_name`.
    pub fn list(name: impl Into<String>, type_name: impl Into<String>) -> Field {
        Field::new(
            name,
            FieldType::Object {
                type_name: type_name.into(),
                list: true,
            },
        )
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn expression(
        mut self,
        f: impl Fn(&str, &Arguments, &Context) -> String + Send + Sync + 'static,
    ) -> Self {
        self.expression = Some(Arc::new(f));
        self
    }

    /// Excludes the field from SQL; it is computed elsewhere.
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// Columns fetched on behalf of an ignored field.
    pub fn dependencies<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.dependencies = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn join(
        mut self,
        f: impl Fn(&mut JoinBuilder, &Arguments, &Context) + Send + Sync + 'static,
    ) -> Self {
        self.join = Some(Arc::new(f));
        self
    }

    pub fn batch(mut self, batch: BatchConfig) -> Self {
        self.batch = Some(batch);
        self
    }

    pub fn junction(mut self, junction: JunctionConfig) -> Self {
        self.junction = Some(junction);
        self
    }

    pub fn filter(
        mut self,
        f: impl Fn(&mut WhereBuilder, &Arguments, &Context) + Send + Sync + 'static,
    ) -> Self {
        self.where_ = Some(Arc::new(f));
        self
    }

    pub fn order_by(
        mut self,
        f: impl Fn(&mut OrderByBuilder, &Arguments, &Context) + Send + Sync + 'static,
    ) -> Self {
        self.order_by = Some(Arc::new(f));
        self
    }

    pub fn sort_key(
        mut self,
        f: impl Fn(&mut SortKeyBuilder, &Arguments, &Context) + Send + Sync + 'static,
    ) -> Self {
        self.sort_key = Some(Arc::new(f));
        self
    }

    /// Returns the relation as a connection paged by `first`/`after` or
    /// `last`/`before`.
    pub fn paginate(mut self) -> Self {
        self.paginate = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    /// Column the field reads, defaulting to the field name.
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }

    pub fn expression_fn(&self) -> Option<&ColumnExprFn> {
        self.expression.as_ref()
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    pub fn dependency_columns(&self) -> &[String] {
        &self.dependencies
    }

    pub fn join_fn(&self) -> Option<&JoinFn> {
        self.join.as_ref()
    }

    pub fn batch_config(&self) -> Option<&BatchConfig> {
        self.batch.as_ref()
    }

    pub fn junction_config(&self) -> Option<&JunctionConfig> {
        self.junction.as_ref()
    }

    pub fn where_fn(&self) -> Option<&WhereFn> {
        self.where_.as_ref()
    }

    pub fn order_by_fn(&self) -> Option<&OrderByFn> {
        self.order_by.as_ref()
    }

    pub fn sort_key_fn(&self) -> Option<&SortKeyFn> {
        self.sort_key.as_ref()
    }

    pub fn is_paginated(&self) -> bool {
        self.paginate
    }

    /// Target object type and whether the field is a list.
    pub fn object_type(&self) -> Option<(&str, bool)> {
        match &self.ty {
            FieldType::Object { type_name, list } => Some((type_name, *list)),
            FieldType::Scalar => None,
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("column", &self.column)
            .field("ignored", &self.ignored)
            .field("batch", &self.batch)
            .field("junction", &self.junction)
            .field("paginate", &self.paginate)
            .finish_non_exhaustive()
    }
}
