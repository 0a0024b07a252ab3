use super::{TableColumnExprFn, TableNameFn};
use crate::{request::Context, stmt::Arguments};

use std::{fmt, sync::Arc};

/// A table reference as it appears in a `FROM` or `JOIN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableName {
    /// An identifier, quoted on output. Dots separate schema qualifiers.
    Ident(String),

    /// A raw SQL expression such as a sub-select, emitted verbatim.
    Expr(String),
}

/// Where a table's name comes from.
#[derive(Clone)]
pub enum TableSource {
    Static(TableName),
    Dynamic(TableNameFn),
}

/// Table metadata attached to an object type.
#[derive(Clone)]
pub struct TableConfig {
    pub(crate) source: TableSource,
    pub(crate) unique_key: Vec<String>,
    pub(crate) always_fetch: Vec<String>,
    pub(crate) column_expression: Option<TableColumnExprFn>,
}

impl TableName {
    pub fn ident(name: impl Into<String>) -> TableName {
        TableName::Ident(name.into())
    }

    pub fn expr(sql: impl Into<String>) -> TableName {
        TableName::Expr(sql.into())
    }
}

impl TableSource {
    pub fn resolve(&self, args: &Arguments, cx: &Context) -> TableName {
        match self {
            TableSource::Static(name) => name.clone(),
            TableSource::Dynamic(f) => f(args, cx),
        }
    }
}

impl TableConfig {
    /// A table named by an identifier.
    pub fn new(name: impl Into<String>) -> TableConfig {
        TableConfig::from_source(TableSource::Static(TableName::ident(name)))
    }

    /// A table given by a raw SQL expression, e.g. a sub-select.
    pub fn expr(sql: impl Into<String>) -> TableConfig {
        TableConfig::from_source(TableSource::Static(TableName::expr(sql)))
    }

    /// A table whose name depends on the request.
    pub fn dynamic(
        f: impl Fn(&Arguments, &Context) -> TableName + Send + Sync + 'static,
    ) -> TableConfig {
        TableConfig::from_source(TableSource::Dynamic(Arc::new(f)))
    }

    fn from_source(source: TableSource) -> TableConfig {
        TableConfig {
            source,
            unique_key: vec![],
            always_fetch: vec![],
            column_expression: None,
        }
    }

    pub fn unique_key(mut self, column: impl Into<String>) -> Self {
        self.unique_key = vec![column.into()];
        self
    }

    /// A unique key spanning several columns.
    pub fn composite_key<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.unique_key = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Columns fetched whenever the table is queried.
    pub fn always_fetch(mut self, column: impl Into<String>) -> Self {
        self.always_fetch.push(column.into());
        self
    }

    pub fn column_expression(
        mut self,
        f: impl Fn(&str, &str, &Arguments, &Context) -> String + Send + Sync + 'static,
    ) -> Self {
        self.column_expression = Some(Arc::new(f));
        self
    }

    pub fn source(&self) -> &TableSource {
        &self.source
    }

    pub fn unique_key_columns(&self) -> &[String] {
        &self.unique_key
    }

    pub fn always_fetch_columns(&self) -> &[String] {
        &self.always_fetch
    }

    pub fn table_column_expression(&self) -> Option<&TableColumnExprFn> {
        self.column_expression.as_ref()
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableName::Ident(name) | TableName::Expr(name) => f.write_str(name),
        }
    }
}

impl fmt::Debug for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSource::Static(name) => f.debug_tuple("Static").field(name).finish(),
            TableSource::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl fmt::Debug for TableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableConfig")
            .field("source", &self.source)
            .field("unique_key", &self.unique_key)
            .field("always_fetch", &self.always_fetch)
            .field("column_expression", &self.column_expression.is_some())
            .finish()
    }
}
