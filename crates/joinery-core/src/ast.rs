//! The SQL AST: a per-request query plan.
//!
//! Nodes live in a flat arena and refer to each other by [`NodeId`]. The
//! tree is built by the converter, then only read: by the compiler, by the
//! object shaper, and by the batch planner.

mod column;
pub use column::{Column, ColumnSource, Composite, Noop};

mod location;
pub use location::Location;

mod paging;
pub use paging::{KeysetPaging, OffsetPaging, Paging};

mod table;
pub use table::{Batch, BatchKey, Junction, JunctionBatch, Table};

pub use crate::schema::TableName;

use std::ops;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub enum Node {
    Table(Table),
    Column(Column),
    Composite(Composite),
    Noop(Noop),
}

#[derive(Debug, Clone)]
pub struct SqlAst {
    nodes: Vec<Node>,
    parents: Vec<Option<NodeId>>,
}

impl SqlAst {
    /// Creates a tree holding only its root.
    pub fn new(root: Node) -> SqlAst {
        SqlAst {
            nodes: vec![root],
            parents: vec![None],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Adds `node` as the last child of `parent`, which must be a table.
    pub fn push(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.parents.push(Some(parent));

        match &mut self.nodes[parent.0] {
            Node::Table(table) => table.children.push(id),
            other => panic!("cannot add a child to {other:?}"),
        }

        id
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id.0]
    }

    /// Returns the table at `id`, or `None` for other node kinds.
    pub fn table(&self, id: NodeId) -> Option<&Table> {
        match &self[id] {
            Node::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn table_mut(&mut self, id: NodeId) -> Option<&mut Table> {
        match &mut self.nodes[id.0] {
            Node::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self[id] {
            Node::Table(table) => &table.children,
            _ => &[],
        }
    }

    /// Child tables of `id`.
    pub fn child_tables(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Table)> + '_ {
        self.children(id)
            .iter()
            .filter_map(|child| self.table(*child).map(|table| (*child, table)))
    }

    /// Returns `true` if a batch boundary exists anywhere below `id`.
    pub fn has_batch_below(&self, id: NodeId) -> bool {
        self.child_tables(id)
            .any(|(child, table)| table.is_batch() || self.has_batch_below(child))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl ops::Index<NodeId> for SqlAst {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl Node {
    pub fn location(&self) -> &Location {
        match self {
            Node::Table(table) => &table.location,
            Node::Column(column) => &column.location,
            Node::Composite(composite) => &composite.location,
            Node::Noop(noop) => &noop.location,
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Node::Table(_))
    }
}

impl From<Table> for Node {
    fn from(value: Table) -> Self {
        Node::Table(value)
    }
}

impl From<Column> for Node {
    fn from(value: Column) -> Self {
        Node::Column(value)
    }
}

impl From<Composite> for Node {
    fn from(value: Composite) -> Self {
        Node::Composite(value)
    }
}

impl From<Noop> for Node {
    fn from(value: Noop) -> Self {
        Node::Noop(value)
    }
}
