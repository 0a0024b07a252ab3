mod builder;
pub use builder::Builder;

use crate::{convert::Converter, planner::Planner, shape::Shapes};

use joinery_core::{driver::Query, stmt::Value, Context, Driver, Result, Schema, Selection, SqlAst};
use joinery_sql::{Flavor, Serializer};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Plans and runs requests against one database.
///
/// Cloning is cheap; clones share the schema and driver.
#[derive(Debug, Clone)]
pub struct Executor {
    schema: Arc<Schema>,
    driver: Arc<dyn Driver>,
    flavor: Flavor,

    /// Generate short table and column aliases
    minify_aliases: bool,
}

impl Executor {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Plans `selection`, a field of the query type, into a SQL AST.
    pub fn plan(&self, selection: &Selection, cx: &Context) -> Result<SqlAst> {
        Converter::new(&self.schema, self.flavor, self.minify_aliases, cx).convert(selection)
    }

    /// Compiles the root statement of a planned request. Batch boundaries
    /// are compiled when their scope is known, during execution.
    pub fn compile(&self, ast: &SqlAst) -> Result<Query> {
        Serializer::new(ast, self.flavor).compile(ast.root(), None)
    }

    /// Resolves `selection`: an object, a list, a connection, or null.
    ///
    /// Stops with a cancellation error as soon as `cancel` fires; no partial
    /// result is returned.
    pub async fn execute(
        &self,
        selection: &Selection,
        cx: &Context,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let ast = self.plan(selection, cx)?;
        let shapes = Shapes::new(&ast)?;

        log::debug!(
            "executing `{}` ({} plan nodes)",
            ast[ast.root()].location(),
            ast.len()
        );

        let serializer = Serializer::new(&ast, self.flavor);
        Planner::new(&ast, &shapes, serializer, &*self.driver, cancel)
            .run()
            .await
    }
}
