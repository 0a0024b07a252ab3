//! Runs the statements of a request: the root statement, then every batch
//! boundary level by level.

use crate::{connection, hydrate::hydrate, shape::Shapes};

use joinery_core::{
    ast::{NodeId, Table},
    driver::Query,
    stmt::{Connection, Key, Row, Value},
    Driver, Error, Result, SqlAst,
};
use joinery_sql::Serializer;

use async_recursion::async_recursion;
use futures::future::try_join_all;
use indexmap::{IndexMap, IndexSet};
use tokio_util::sync::CancellationToken;

/// Results of one batch statement, by correlation key.
type Groups = IndexMap<Key, Value>;

pub(crate) struct Planner<'a> {
    ast: &'a SqlAst,
    shapes: &'a Shapes,
    serializer: Serializer<'a>,
    driver: &'a dyn Driver,
    cancel: &'a CancellationToken,
}

impl<'a> Planner<'a> {
    pub(crate) fn new(
        ast: &'a SqlAst,
        shapes: &'a Shapes,
        serializer: Serializer<'a>,
        driver: &'a dyn Driver,
        cancel: &'a CancellationToken,
    ) -> Planner<'a> {
        Planner {
            ast,
            shapes,
            serializer,
            driver,
            cancel,
        }
    }

    /// Fetches the root table and everything below it.
    pub(crate) async fn run(&self) -> Result<Value> {
        let ast = self.ast;
        let root = ast.root();

        let Some(table) = ast.table(root) else {
            return Ok(Value::Null);
        };

        let query = self.serializer.compile(root, None)?;
        let items = self.fetch(root, &query).await?;

        let value = if table.grab_many || table.paginate {
            Value::List(items)
        } else {
            items.into_iter().next().unwrap_or_default()
        };

        let mut value = connection::convert(ast, root, value)?;

        if ast.has_batch_below(root) {
            self.next_batch(root, vec![&mut value]).await?;
        }

        Ok(value)
    }

    /// Runs the batch boundaries directly below `node` for all of `parents`,
    /// the values `node` resolved to, then recurses into joined children
    /// that have batches of their own.
    #[async_recursion]
    async fn next_batch(&self, node: NodeId, parents: Vec<&mut Value>) -> Result<()> {
        let ast = self.ast;

        let mut objects = vec![];
        for parent in parents {
            objects_mut(parent, &mut objects);
        }

        let batches: Vec<(NodeId, &Table)> = ast
            .child_tables(node)
            .filter(|(_, table)| table.is_batch())
            .collect();

        // Scopes are computed up front so the statements can run while the
        // parents stay untouched.
        let scopes: Vec<Vec<Value>> = batches
            .iter()
            .map(|(_, table)| batch_scope(table, &objects))
            .collect();

        let fetches = batches
            .iter()
            .zip(scopes)
            .map(|(&(child, table), scope)| async move {
                if scope.is_empty() {
                    log::debug!("`{}` has an empty batch scope; skipping", table.location);
                    return Ok(None);
                }

                self.fetch_batch(child, table, scope).await.map(Some)
            });
        let results = try_join_all(fetches).await?;

        for ((_, table), groups) in batches.iter().zip(&results) {
            for object in objects.iter_mut() {
                let value = attach(table, groups.as_ref(), object);
                object.insert(table.field_name.clone(), value);
            }
        }

        // Joined children are nested in the parents' objects; each gets the
        // values under its own field.
        let joined: Vec<(NodeId, &Table)> = ast
            .child_tables(node)
            .filter(|(child, table)| !table.is_batch() && ast.has_batch_below(*child))
            .collect();

        if joined.is_empty() {
            return Ok(());
        }

        let mut values: Vec<Vec<&mut Value>> = joined.iter().map(|_| vec![]).collect();
        for object in objects {
            for (name, value) in object {
                if let Some(i) = joined.iter().position(|(_, table)| table.field_name == *name) {
                    values[i].push(value);
                }
            }
        }

        let recursions = joined
            .iter()
            .zip(values)
            .map(|((child, _), values)| self.next_batch(*child, values));
        try_join_all(recursions).await?;

        Ok(())
    }

    /// Runs one batch statement and groups its results by the batch key.
    async fn fetch_batch(&self, node: NodeId, table: &Table, scope: Vec<Value>) -> Result<Groups> {
        log::trace!("`{}` batch scope: {} keys", table.location, scope.len());

        let query = self.serializer.compile(node, Some(scope.as_slice()))?;
        let items = self.fetch(node, &query).await?;

        let Some((this_key, _)) = table.batch_keys() else {
            return Err(Error::invalid_configuration(format!(
                "`{}` is not a batch",
                table.location
            )));
        };

        let mut grouped: IndexMap<Key, Vec<Value>> = IndexMap::new();
        for item in items {
            let item = connection::convert_object(self.ast, node, item)?;
            let key = item
                .get(&this_key.field_name)
                .and_then(|value| value.clone().normalize().key());

            match key {
                Some(key) => grouped.entry(key).or_default().push(item),
                None => log::trace!(
                    "`{}` row has no `{}`; dropped",
                    table.location,
                    this_key.field_name
                ),
            }
        }

        let mut groups = Groups::with_capacity(grouped.len());
        for (key, items) in grouped {
            let value = if table.paginate {
                connection::connect(table, items)?
            } else {
                Value::List(items)
            };
            groups.insert(key, value);
        }

        if self.ast.has_batch_below(node) {
            self.next_batch(node, groups.values_mut().collect()).await?;
        }

        Ok(groups)
    }

    /// Runs `query` and hydrates its rows with the shape of `node`.
    async fn fetch(&self, node: NodeId, query: &Query) -> Result<Vec<Value>> {
        let shape = self.shapes.get(node).ok_or_else(|| {
            Error::invalid_result(format!(
                "`{}` was not shaped before execution",
                self.ast[node].location()
            ))
        })?;

        let rows = self.query(query).await?;
        hydrate(shape, &rows)
    }

    async fn query(&self, query: &Query) -> Result<Vec<Row>> {
        log::debug!("{}; params={}", query.sql, query.params.len());

        let mut stream = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(Error::cancelled()),
            stream = self.driver.query(query) => stream?,
        };

        let mut rows = Vec::with_capacity(stream.min_len());
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(Error::cancelled()),
                row = stream.next() => match row {
                    Some(row) => rows.push(row?),
                    None => break,
                },
            }
        }

        log::trace!("fetched {} rows", rows.len());
        Ok(rows)
    }
}

/// Collects the objects held by `value`, looking through lists and
/// connections.
fn objects_mut<'v>(value: &'v mut Value, out: &mut Vec<&'v mut IndexMap<String, Value>>) {
    match value {
        Value::Object(fields) => out.push(fields),
        Value::List(items) => {
            for item in items {
                objects_mut(item, out);
            }
        }
        Value::Connection(connection) => {
            for node in connection.nodes_mut() {
                objects_mut(node, out);
            }
        }
        _ => {}
    }
}

/// Distinct non-null parent key values, in order of first appearance.
fn batch_scope(table: &Table, objects: &[&mut IndexMap<String, Value>]) -> Vec<Value> {
    let Some((_, parent_key)) = table.batch_keys() else {
        return vec![];
    };

    let keys: IndexSet<Key> = objects
        .iter()
        .filter_map(|object| object.get(&parent_key.field_name))
        .flat_map(Value::keys)
        .collect();

    keys.into_iter().map(Key::into_value).collect()
}

/// The value `table` resolves to for one parent object.
fn attach(table: &Table, groups: Option<&Groups>, object: &IndexMap<String, Value>) -> Value {
    let matches: Vec<&Value> = match (groups, table.batch_keys()) {
        (Some(groups), Some((_, parent_key))) => object
            .get(&parent_key.field_name)
            .map(Value::keys)
            .unwrap_or_default()
            .iter()
            .filter_map(|key| groups.get(key))
            .collect(),
        _ => vec![],
    };

    if !table.grab_many {
        return matches
            .first()
            .and_then(|group| group.as_list())
            .and_then(|items| items.first())
            .cloned()
            .unwrap_or_default();
    }

    match matches.as_slice() {
        [] if table.paginate => Connection::empty().into(),
        [] => Value::Null,
        [group] => (*group).clone(),
        groups if table.paginate => {
            log::trace!(
                "`{}` parent matched {} pages; using the first",
                table.location,
                groups.len()
            );
            groups[0].clone()
        }
        groups => Value::List(
            groups
                .iter()
                .filter_map(|group| group.as_list())
                .flatten()
                .cloned()
                .collect(),
        ),
    }
}
