#[macro_use]
mod fmt;
use fmt::ToSql;

mod condition;
use condition::Aliases;

mod delim;
use delim::{Comma, Delimited};

mod flavor;
pub use flavor::Flavor;
use flavor::{CompositeKey, Limit};

mod ident;
use ident::{Ident, Qualified};

mod paginate;
pub use paginate::TOTAL_COLUMN;

mod params;
use params::Placeholder;

mod table;

use joinery_core::{
    ast::{ColumnSource, Node, NodeId, SqlAst, Table},
    driver::Query,
    stmt::{Params, Value},
    Error, Result,
};

/// Compiles SQL AST subtrees into statements.
///
/// One call to [`compile`](Self::compile) lowers a subtree down to, but not
/// past, the next batch boundaries. Batch boundaries contribute only the
/// parent key their batch is later correlated on.
#[derive(Debug)]
pub struct Serializer<'a> {
    ast: &'a SqlAst,

    /// The database flavor handles the differences between SQL dialects and
    /// supported features.
    flavor: Flavor,
}

struct Formatter<'a> {
    flavor: Flavor,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut Params,
}

/// The clauses of the statement being compiled.
#[derive(Debug, Default)]
struct Statement {
    selections: Vec<String>,
    tables: Vec<String>,
    wheres: Vec<String>,
    orders: Vec<String>,
    params: Params,
}

impl<'a> Serializer<'a> {
    pub fn new(ast: &'a SqlAst, flavor: Flavor) -> Serializer<'a> {
        Serializer { ast, flavor }
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Compiles the statement rooted at `node`.
    ///
    /// `batch_scope` holds the distinct parent key values when `node` is a
    /// batch boundary.
    pub fn compile(&self, node: NodeId, batch_scope: Option<&[Value]>) -> Result<Query> {
        let ast = self.ast;
        let Some(table) = ast.table(node) else {
            return Err(Error::invalid_configuration(format!(
                "`{}` is not backed by a table",
                ast[node].location()
            )));
        };

        if batch_scope.is_some_and(|scope| scope.is_empty()) {
            return Err(Error::invalid_argument(format!(
                "batch scope for `{}` is empty",
                table.location
            )));
        }

        log::trace!(
            "compiling `{}` for {:?}; batch_scope={}",
            table.location,
            self.flavor,
            batch_scope.map(<[Value]>::len).unwrap_or(0)
        );

        let mut stmt = Statement::default();
        self.stringify(&mut stmt, None, node, &mut vec![], batch_scope)?;
        Ok(stmt.into_query())
    }

    fn stringify(
        &self,
        stmt: &mut Statement,
        parent: Option<&'a Table>,
        node: NodeId,
        prefix: &mut Vec<&'a str>,
        batch_scope: Option<&[Value]>,
    ) -> Result<()> {
        let ast = self.ast;

        match &ast[node] {
            Node::Table(table) => {
                self.table(stmt, parent, table, prefix, batch_scope)?;

                if continues_statement(table, parent) {
                    prefix.push(&table.alias);
                    for child in &table.children {
                        self.stringify(stmt, Some(table), *child, prefix, None)?;
                    }
                    prefix.pop();
                }
            }
            Node::Column(column) => {
                let parent = self.parent_table(parent, node)?;
                let table = column.from_table.as_deref().unwrap_or(&parent.alias);
                let alias = join_prefix(prefix) + &column.alias;

                let sql = stmt.fragment(self.flavor, |f| {
                    match &column.source {
                        ColumnSource::Name(name) => fmt!(f, Qualified(table, name)),
                        ColumnSource::Expression(sql) => fmt!(f, sql),
                    }
                    fmt!(f, " AS " Ident(&alias));
                    Ok(())
                })?;
                stmt.select(sql);
            }
            Node::Composite(composite) => {
                let parent = self.parent_table(parent, node)?;
                let alias = join_prefix(prefix) + &composite.alias;

                let sql = stmt.fragment(self.flavor, |f| {
                    let key = CompositeKey {
                        table: &parent.alias,
                        columns: &composite.columns,
                    };
                    fmt!(f, key " AS " Ident(&alias));
                    Ok(())
                })?;
                stmt.select(sql);
            }
            Node::Noop(_) => {}
        }

        Ok(())
    }

    fn parent_table(&self, parent: Option<&'a Table>, node: NodeId) -> Result<&'a Table> {
        parent.ok_or_else(|| {
            Error::invalid_configuration(format!(
                "`{}` is a column without a table",
                self.ast[node].location()
            ))
        })
    }
}

/// Returns `true` unless `table` is a batch boundary reached from its
/// parent's statement.
fn continues_statement(table: &Table, parent: Option<&Table>) -> bool {
    parent.is_none() || !table.is_batch()
}

/// Column alias prefix of a nested table: the aliases of the tables below
/// the statement root, each followed by `__`.
fn join_prefix(prefix: &[&str]) -> String {
    prefix.iter().skip(1).map(|alias| format!("{alias}__")).collect()
}

impl Statement {
    /// Serializes one fragment, binding its values into the statement's
    /// parameters.
    fn fragment(
        &mut self,
        flavor: Flavor,
        f: impl FnOnce(&mut Formatter<'_>) -> Result<()>,
    ) -> Result<String> {
        let mut dst = String::new();
        let mut fmt = Formatter {
            flavor,
            dst: &mut dst,
            params: &mut self.params,
        };
        f(&mut fmt)?;
        Ok(dst)
    }

    fn select(&mut self, selection: String) {
        if !self.selections.contains(&selection) {
            self.selections.push(selection);
        }
    }

    fn into_query(self) -> Query {
        let mut sql = String::from("SELECT\n  ");
        sql.push_str(&self.selections.join(",\n  "));

        for table in &self.tables {
            sql.push('\n');
            sql.push_str(table);
        }

        if !self.wheres.is_empty() {
            sql.push_str("\nWHERE ");
            sql.push_str(&self.wheres.join(" AND "));
        }

        if !self.orders.is_empty() {
            sql.push_str("\nORDER BY ");
            sql.push_str(&self.orders.join(", "));
        }

        Query {
            sql,
            params: self.params,
        }
    }
}
