use super::{JoinFn, OrderByFn, SortKeyFn, TableName, WhereFn};
use crate::{
    clause::{JoinBuilder, OrderByBuilder, SortKeyBuilder, WhereBuilder},
    request::Context,
    stmt::Arguments,
};

use std::{fmt, sync::Arc};

/// Fetches a relation with a separate statement, correlated with the parent
/// rows by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Column on the child table
    pub this_key: String,

    /// Column on the parent table
    pub parent_key: String,
}

/// A many-to-many relation traversed through a linking table.
#[derive(Clone)]
pub struct JunctionConfig {
    pub(crate) table: TableName,
    pub(crate) from_parent: Option<JoinFn>,
    pub(crate) to_child: Option<JoinFn>,
    pub(crate) batch: Option<JunctionBatchConfig>,
    pub(crate) where_: Option<WhereFn>,
    pub(crate) order_by: Option<OrderByFn>,
    pub(crate) sort_key: Option<SortKeyFn>,
}

/// Batches a junction relation: the linking table is queried together with
/// the child table and correlated with the parent rows by key.
#[derive(Clone)]
pub struct JunctionBatchConfig {
    /// Column on the junction table
    pub(crate) this_key: String,

    /// Column on the parent table
    pub(crate) parent_key: String,

    /// Joins the junction table (parent side) to the child table
    pub(crate) join: Option<JoinFn>,
}

impl BatchConfig {
    pub fn new(this_key: impl Into<String>, parent_key: impl Into<String>) -> BatchConfig {
        BatchConfig {
            this_key: this_key.into(),
            parent_key: parent_key.into(),
        }
    }
}

impl JunctionConfig {
    pub fn new(table: impl Into<String>) -> JunctionConfig {
        JunctionConfig::with_table(TableName::ident(table))
    }

    pub fn with_table(table: TableName) -> JunctionConfig {
        JunctionConfig {
            table,
            from_parent: None,
            to_child: None,
            batch: None,
            where_: None,
            order_by: None,
            sort_key: None,
        }
    }

    /// Joins the parent table (parent side) to the junction table.
    pub fn from_parent(
        mut self,
        f: impl Fn(&mut JoinBuilder, &Arguments, &Context) + Send + Sync + 'static,
    ) -> Self {
        self.from_parent = Some(Arc::new(f));
        self
    }

    /// Joins the junction table (parent side) to the child table.
    pub fn to_child(
        mut self,
        f: impl Fn(&mut JoinBuilder, &Arguments, &Context) + Send + Sync + 'static,
    ) -> Self {
        self.to_child = Some(Arc::new(f));
        self
    }

    pub fn batch(mut self, batch: JunctionBatchConfig) -> Self {
        self.batch = Some(batch);
        self
    }

    /// Filters rows of the junction table.
    pub fn filter(
        mut self,
        f: impl Fn(&mut WhereBuilder, &Arguments, &Context) + Send + Sync + 'static,
    ) -> Self {
        self.where_ = Some(Arc::new(f));
        self
    }

    /// Orders by columns of the junction table.
    pub fn order_by(
        mut self,
        f: impl Fn(&mut OrderByBuilder, &Arguments, &Context) + Send + Sync + 'static,
    ) -> Self {
        self.order_by = Some(Arc::new(f));
        self
    }

    /// Keyset pagination over columns of the junction table.
    pub fn sort_key(
        mut self,
        f: impl Fn(&mut SortKeyBuilder, &Arguments, &Context) + Send + Sync + 'static,
    ) -> Self {
        self.sort_key = Some(Arc::new(f));
        self
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn from_parent_fn(&self) -> Option<&JoinFn> {
        self.from_parent.as_ref()
    }

    pub fn to_child_fn(&self) -> Option<&JoinFn> {
        self.to_child.as_ref()
    }

    pub fn batch_config(&self) -> Option<&JunctionBatchConfig> {
        self.batch.as_ref()
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
}

impl JunctionBatchConfig {
    pub fn new(this_key: impl Into<String>, parent_key: impl Into<String>) -> JunctionBatchConfig {
        JunctionBatchConfig {
            this_key: this_key.into(),
            parent_key: parent_key.into(),
            join: None,
        }
    }

    pub fn join(
        mut self,
        f: impl Fn(&mut JoinBuilder, &Arguments, &Context) + Send + Sync + 'static,
    ) -> Self {
        self.join = Some(Arc::new(f));
        self
    }

    pub fn this_key(&self) -> &str {
        &self.this_key
    }

    pub fn parent_key(&self) -> &str {
        &self.parent_key
    }

    pub fn join_fn(&self) -> Option<&JoinFn> {
        self.join.as_ref()
    }
}

impl fmt::Debug for JunctionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JunctionConfig")
            .field("table", &self.table)
            .field("batch", &self.batch)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for JunctionBatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JunctionBatchConfig")
            .field("this_key", &self.this_key)
            .field("parent_key", &self.parent_key)
            .finish_non_exhaustive()
    }
}
