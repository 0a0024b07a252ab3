use super::{Clause, ColumnRef, CompareOp, Condition, Connective};
use crate::stmt::Value;

use indexmap::IndexMap;

/// Collects clauses, tracking the connective and negation that apply to the
/// next pushed clause.
#[derive(Debug, Default, Clone)]
struct Clauses {
    clauses: Vec<Clause>,
    connective: Connective,
    negated: bool,
}

impl Clauses {
    fn push(&mut self, condition: Condition) {
        let connective = std::mem::take(&mut self.connective);
        let negated = std::mem::take(&mut self.negated);

        if condition.is_empty() {
            return;
        }

        self.clauses.push(Clause {
            connective,
            negated,
            condition,
        });
    }
}

fn raw_params<K, V>(params: impl IntoIterator<Item = (K, V)>) -> IndexMap<String, Value>
where
    K: Into<String>,
    V: Into<Value>,
{
    params
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect()
}

/// Builds the filter attached to a table.
///
/// Clauses are joined with `AND` unless [`or`](Self::or) is called before
/// one; [`not`](Self::not) negates the next clause.
///
/// ```
/// # use joinery_core::clause::WhereBuilder;
/// let mut filter = WhereBuilder::new();
/// filter.eq("published", true).or().gt("price", 10);
/// assert_eq!(filter.into_clauses().len(), 2);
/// ```
#[derive(Debug, Default, Clone)]
pub struct WhereBuilder {
    inner: Clauses,
}

impl WhereBuilder {
    pub fn new() -> WhereBuilder {
        WhereBuilder::default()
    }

    pub fn compare(&mut self, column: &str, op: CompareOp, value: impl Into<Value>) -> &mut Self {
        self.inner.push(Condition::Compare {
            column: ColumnRef::this(column),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(column, CompareOp::Eq, value)
    }

    pub fn ne(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(column, CompareOp::Ne, value)
    }

    pub fn gt(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(column, CompareOp::Gt, value)
    }

    pub fn ge(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(column, CompareOp::Ge, value)
    }

    pub fn lt(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(column, CompareOp::Lt, value)
    }

    pub fn le(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(column, CompareOp::Le, value)
    }

    pub fn like(&mut self, column: &str, pattern: impl Into<Value>) -> &mut Self {
        self.compare(column, CompareOp::Like, pattern)
    }

    pub fn is_null(&mut self, column: &str) -> &mut Self {
        self.compare(column, CompareOp::Eq, Value::Null)
    }

    /// Compares two columns of this table.
    pub fn columns(&mut self, lhs: &str, op: CompareOp, rhs: &str) -> &mut Self {
        self.inner.push(Condition::CompareColumns {
            lhs: ColumnRef::this(lhs),
            op,
            rhs: ColumnRef::this(rhs),
        });
        self
    }

    pub fn in_list<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.inner.push(Condition::InList {
            column: ColumnRef::this(column),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn raw(&mut self, sql: impl Into<String>) -> &mut Self {
        self.raw_with(sql, Vec::<(String, Value)>::new())
    }

    /// Raw SQL with named parameters referenced as `@name`.
    pub fn raw_with<K, V>(
        &mut self,
        sql: impl Into<String>,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.inner.push(Condition::Raw {
            sql: sql.into(),
            params: raw_params(params),
        });
        self
    }

    /// A correlated sub-query; `{table}` refers to this table.
    pub fn exists<K, V>(
        &mut self,
        sql: impl Into<String>,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.inner.push(Condition::Exists {
            sql: sql.into(),
            params: raw_params(params),
        });
        self
    }

    /// A parenthesized group built by `f`.
    pub fn group(&mut self, f: impl FnOnce(&mut WhereBuilder)) -> &mut Self {
        let mut group = WhereBuilder::new();
        f(&mut group);
        self.inner.push(Condition::Group(group.into_clauses()));
        self
    }

    pub fn or(&mut self) -> &mut Self {
        self.inner.connective = Connective::Or;
        self
    }

    pub fn not(&mut self) -> &mut Self {
        self.inner.negated = !self.inner.negated;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.inner.clauses.is_empty()
    }

    pub fn into_clauses(self) -> Vec<Clause> {
        self.inner.clauses
    }
}

/// Builds a join condition between a parent and a child table.
#[derive(Debug, Default, Clone)]
pub struct JoinBuilder {
    inner: Clauses,
}

impl JoinBuilder {
    pub fn new() -> JoinBuilder {
        JoinBuilder::default()
    }

    /// `parent.parent_column = child.child_column`
    pub fn on(&mut self, parent_column: &str, child_column: &str) -> &mut Self {
        self.on_op(parent_column, CompareOp::Eq, child_column)
    }

    pub fn on_op(&mut self, parent_column: &str, op: CompareOp, child_column: &str) -> &mut Self {
        self.inner.push(Condition::CompareColumns {
            lhs: ColumnRef::parent(parent_column),
            op,
            rhs: ColumnRef::child(child_column),
        });
        self
    }

    /// Restricts the child side of the join to rows matching a value.
    pub fn child(&mut self, column: &str, op: CompareOp, value: impl Into<Value>) -> &mut Self {
        self.inner.push(Condition::Compare {
            column: ColumnRef::child(column),
            op,
            value: value.into(),
        });
        self
    }

    /// Raw SQL; `{parent}` and `{child}` refer to the two tables.
    pub fn raw(&mut self, sql: impl Into<String>) -> &mut Self {
        self.raw_with(sql, Vec::<(String, Value)>::new())
    }

    pub fn raw_with<K, V>(
        &mut self,
        sql: impl Into<String>,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.inner.push(Condition::Raw {
            sql: sql.into(),
            params: raw_params(params),
        });
        self
    }

    pub fn or(&mut self) -> &mut Self {
        self.inner.connective = Connective::Or;
        self
    }

    pub fn not(&mut self) -> &mut Self {
        self.inner.negated = !self.inner.negated;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.inner.clauses.is_empty()
    }

    pub fn into_clauses(self) -> Vec<Clause> {
        self.inner.clauses
    }
}
