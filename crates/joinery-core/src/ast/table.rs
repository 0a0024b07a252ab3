use super::{Location, NodeId, TableName};
use crate::{
    clause::{Clause, OrderBy, SortKey},
    stmt::Arguments,
};

#[derive(Debug, Clone)]
pub struct Table {
    pub name: TableName,

    /// Alias unique within the request
    pub alias: String,

    /// Key under which results nest in the parent
    pub field_name: String,

    pub children: Vec<NodeId>,

    /// Arguments of the requested field
    pub args: Arguments,

    /// Condition joining the parent table to this one
    pub join: Option<Vec<Clause>>,

    pub junction: Option<Junction>,

    pub batch: Option<Batch>,

    pub where_: Vec<Clause>,

    pub order_by: Option<OrderBy>,

    pub sort_key: Option<SortKey>,

    pub paginate: bool,

    /// The field resolves to a list rather than a single object
    pub grab_many: bool,

    pub location: Location,
}

/// A many-to-many link through an intermediate table.
#[derive(Debug, Clone)]
pub struct Junction {
    pub table: TableName,
    pub alias: String,

    /// Joins the parent table to the junction table
    pub from_parent: Option<Vec<Clause>>,

    /// Joins the junction table to the child table
    pub to_child: Option<Vec<Clause>>,

    pub where_: Vec<Clause>,
    pub order_by: Option<OrderBy>,
    pub sort_key: Option<SortKey>,
    pub batch: Option<JunctionBatch>,
}

#[derive(Debug, Clone)]
pub struct JunctionBatch {
    /// Key on the junction table
    pub this_key: BatchKey,

    /// Key on the parent table
    pub parent_key: BatchKey,

    /// Joins the junction table to the child table
    pub join: Option<Vec<Clause>>,
}

/// Correlates a separately fetched table with the rows of its parent.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Key on this table
    pub this_key: BatchKey,

    /// Key on the parent table
    pub parent_key: BatchKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchKey {
    pub column: String,

    /// Field the key's value appears under in hydrated objects
    pub field_name: String,

    /// Column alias in the flat row
    pub alias: String,
}

impl Table {
    pub fn new(
        name: TableName,
        alias: impl Into<String>,
        field_name: impl Into<String>,
        location: Location,
    ) -> Table {
        Table {
            name,
            alias: alias.into(),
            field_name: field_name.into(),
            children: vec![],
            args: Arguments::new(),
            join: None,
            junction: None,
            batch: None,
            where_: vec![],
            order_by: None,
            sort_key: None,
            paginate: false,
            grab_many: false,
            location,
        }
    }

    /// Returns `true` if this table starts a new statement.
    pub fn is_batch(&self) -> bool {
        self.batch.is_some() || self.junction_batch().is_some()
    }

    pub fn junction_batch(&self) -> Option<&JunctionBatch> {
        self.junction.as_ref()?.batch.as_ref()
    }

    /// The `(this_key, parent_key)` pair correlating this batch with its
    /// parent.
    pub fn batch_keys(&self) -> Option<(&BatchKey, &BatchKey)> {
        if let Some(batch) = &self.batch {
            return Some((&batch.this_key, &batch.parent_key));
        }

        self.junction_batch()
            .map(|batch| (&batch.this_key, &batch.parent_key))
    }

    /// The sort key driving keyset pagination and the alias of the table it
    /// applies to.
    pub fn keyset(&self) -> Option<(&SortKey, &str)> {
        if let Some(sort_key) = &self.sort_key {
            return Some((sort_key, &self.alias));
        }

        let junction = self.junction.as_ref()?;
        junction
            .sort_key
            .as_ref()
            .map(|sort_key| (sort_key, junction.alias.as_str()))
    }

    /// The ordering driving offset pagination and the alias of the table it
    /// applies to.
    pub fn offset_order(&self) -> Option<(&OrderBy, &str)> {
        if let Some(order_by) = &self.order_by {
            return Some((order_by, &self.alias));
        }

        let junction = self.junction.as_ref()?;
        junction
            .order_by
            .as_ref()
            .map(|order_by| (order_by, junction.alias.as_str()))
    }

    /// Returns `true` if the table is paginated by offset, and so carries a
    /// total-count column.
    pub fn is_offset_paginated(&self) -> bool {
        self.paginate && self.keyset().is_none() && self.offset_order().is_some()
    }
}

impl BatchKey {
    pub fn new(column: impl Into<String>, alias: impl Into<String>) -> BatchKey {
        let column = column.into();
        BatchKey {
            field_name: column.clone(),
            column,
            alias: alias.into(),
        }
    }
}
