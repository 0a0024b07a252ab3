//! Typed clause objects emitted by schema delegates.
//!
//! Clauses never contain table aliases. Columns name the table they belong
//! to by role ([`TableRef`]) and the compiler substitutes the quoted alias
//! when it lowers the clause to SQL.

mod builder;
pub use builder::{JoinBuilder, WhereBuilder};

mod order;
pub use order::{Direction, OrderBy, OrderByBuilder, OrderColumn};

mod sort_key;
pub use sort_key::{KeyType, SortKey, SortKeyBuilder, SortKeyColumn};

use crate::stmt::Value;

use indexmap::IndexMap;

/// How a clause combines with the clause before it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    #[default]
    And,
    Or,
}

/// The table a column reference resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRef {
    /// The table the clause is attached to
    This,
    /// The left-hand side of a join
    Parent,
    /// The right-hand side of a join
    Child,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    pub table: TableRef,
    pub column: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
}

/// One boolean condition plus how it joins the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub connective: Connective,
    pub negated: bool,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column <op> value`. A null value compiles to `IS NULL` / `IS NOT NULL`
    /// for `Eq` / `Ne`.
    Compare {
        column: ColumnRef,
        op: CompareOp,
        value: Value,
    },

    /// `lhs <op> rhs`
    CompareColumns {
        lhs: ColumnRef,
        op: CompareOp,
        rhs: ColumnRef,
    },

    /// `column IN (...)`. An empty list never matches.
    InList { column: ColumnRef, values: Vec<Value> },

    /// Raw SQL. `{table}`, `{parent}` and `{child}` expand to quoted aliases
    /// and `@name` to the placeholder bound to `params[name]`.
    Raw {
        sql: String,
        params: IndexMap<String, Value>,
    },

    /// A parenthesized group of clauses
    Group(Vec<Clause>),

    /// `EXISTS (<sql>)`, a correlated sub-query expanded like [`Condition::Raw`]
    Exists {
        sql: String,
        params: IndexMap<String, Value>,
    },
}

impl ColumnRef {
    pub fn this(column: impl Into<String>) -> ColumnRef {
        ColumnRef {
            table: TableRef::This,
            column: column.into(),
        }
    }

    pub fn parent(column: impl Into<String>) -> ColumnRef {
        ColumnRef {
            table: TableRef::Parent,
            column: column.into(),
        }
    }

    pub fn child(column: impl Into<String>) -> ColumnRef {
        ColumnRef {
            table: TableRef::Child,
            column: column.into(),
        }
    }
}

impl CompareOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Like => "LIKE",
        }
    }
}

impl Condition {
    /// Returns `true` if the condition contributes nothing, such as an
    /// empty group.
    pub fn is_empty(&self) -> bool {
        match self {
            Condition::Group(clauses) => clauses.iter().all(|c| c.condition.is_empty()),
            Condition::Raw { sql, .. } => sql.trim().is_empty(),
            _ => false,
        }
    }
}
