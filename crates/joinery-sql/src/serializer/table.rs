use super::{join_prefix, Aliases, Comma, Ident, Qualified, Serializer, Statement, ToSql};

use joinery_core::{
    ast::{BatchKey, Paging, Table},
    clause::{Clause, Direction},
    stmt::Value,
    Error, Result,
};

impl<'a> Serializer<'a> {
    /// Emits the contributions of one table: its filter and ordering, and how
    /// it is reached from its parent.
    pub(super) fn table(
        &self,
        stmt: &mut Statement,
        parent: Option<&'a Table>,
        node: &'a Table,
        prefix: &[&'a str],
        batch_scope: Option<&[Value]>,
    ) -> Result<()> {
        // Paginated tables filter inside their sub-select, and batch
        // boundaries filter in their own statement.
        if !node.paginate && (!node.is_batch() || parent.is_none()) {
            if let Some(junction) = &node.junction {
                self.filter(stmt, &junction.where_, Aliases::table(&junction.alias))?;
            }
            self.filter(stmt, &node.where_, Aliases::table(&node.alias))?;
        }

        if super::continues_statement(node, parent) {
            self.order(stmt, node)?;
        }

        if let Some(join) = &node.join {
            let Some(parent) = parent else {
                return Err(Error::invalid_configuration(format!(
                    "`{}` is a root field and cannot declare a join",
                    node.location
                )));
            };

            if node.paginate {
                return self.joined_one_to_many_paginated(stmt, parent, node, join);
            }

            let sql = stmt.fragment(self.flavor, |f| {
                let table = &node.name;
                fmt!(f, "LEFT JOIN " table " " Ident(&node.alias) " ON ");
                f.predicate(join, Aliases::join(&parent.alias, &node.alias))
            })?;
            stmt.tables.push(sql);
        } else if let Some((junction, batch)) = node
            .junction
            .as_ref()
            .and_then(|junction| junction.batch.as_ref().map(|batch| (junction, batch)))
        {
            if let Some(parent) = parent {
                return self.select_parent_key(stmt, parent, &batch.parent_key, prefix);
            }

            let join = batch.join.as_ref().ok_or_else(|| {
                Error::invalid_configuration(format!(
                    "junction batch of `{}` has no join to the child table",
                    node.location
                ))
            })?;
            let scope = self.require_scope(node, batch_scope)?;

            if node.paginate {
                return self
                    .batched_many_to_many_paginated(stmt, node, junction, batch, scope, join);
            }

            let from = stmt.fragment(self.flavor, |f| {
                let table = &junction.table;
                fmt!(f, "FROM " table " AS " Ident(&junction.alias));
                Ok(())
            })?;
            let join = stmt.fragment(self.flavor, |f| {
                let table = &node.name;
                fmt!(f, "LEFT JOIN " table " AS " Ident(&node.alias) " ON ");
                f.predicate(join, Aliases::join(&junction.alias, &node.alias))
            })?;
            let filter = stmt.fragment(self.flavor, |f| {
                let this_key = Qualified(&junction.alias, &batch.this_key.column);
                fmt!(f, this_key " IN (" Comma(scope) ")");
                Ok(())
            })?;

            stmt.tables.push(from);
            stmt.tables.push(join);
            stmt.wheres.push(filter);
        } else if let Some(junction) = &node.junction {
            let Some(parent) = parent else {
                return Err(Error::invalid_configuration(format!(
                    "`{}` is a root field and cannot use a junction table",
                    node.location
                )));
            };

            let missing = |side: &str| {
                Error::invalid_configuration(format!(
                    "junction of `{}` has no join {side}",
                    node.location
                ))
            };
            let from_parent = junction
                .from_parent
                .as_ref()
                .ok_or_else(|| missing("from the parent table"))?;
            let to_child = junction
                .to_child
                .as_ref()
                .ok_or_else(|| missing("to the child table"))?;

            if node.paginate {
                self.joined_many_to_many_paginated(
                    stmt,
                    parent,
                    node,
                    junction,
                    from_parent,
                    to_child,
                )?;
            } else {
                let sql = stmt.fragment(self.flavor, |f| {
                    let table = &junction.table;
                    fmt!(f, "LEFT JOIN " table " " Ident(&junction.alias) " ON ");
                    f.predicate(from_parent, Aliases::join(&parent.alias, &junction.alias))
                })?;
                stmt.tables.push(sql);
            }

            let sql = stmt.fragment(self.flavor, |f| {
                let table = &node.name;
                fmt!(f, "LEFT JOIN " table " " Ident(&node.alias) " ON ");
                f.predicate(to_child, Aliases::join(&junction.alias, &node.alias))
            })?;
            stmt.tables.push(sql);
        } else if let Some(batch) = &node.batch {
            if let Some(parent) = parent {
                return self.select_parent_key(stmt, parent, &batch.parent_key, prefix);
            }

            let scope = self.require_scope(node, batch_scope)?;

            if node.paginate {
                return self.batched_one_to_many_paginated(stmt, node, batch, scope);
            }

            let from = stmt.fragment(self.flavor, |f| {
                let table = &node.name;
                fmt!(f, "FROM " table " AS " Ident(&node.alias));
                Ok(())
            })?;
            let filter = stmt.fragment(self.flavor, |f| {
                fmt!(f, Qualified(&node.alias, &batch.this_key.column) " IN (" Comma(scope) ")");
                Ok(())
            })?;

            stmt.tables.push(from);
            stmt.wheres.push(filter);
        } else if parent.is_some() {
            return Err(Error::invalid_configuration(format!(
                "`{}` must declare a join, a batch or a junction to be nested",
                node.location
            )));
        } else if node.paginate {
            self.root_paginated(stmt, node)?;
        } else {
            let sql = stmt.fragment(self.flavor, |f| {
                let table = &node.name;
                fmt!(f, "FROM " table " AS " Ident(&node.alias));
                Ok(())
            })?;
            stmt.tables.push(sql);
        }

        Ok(())
    }

    fn filter(&self, stmt: &mut Statement, clauses: &[Clause], aliases: Aliases<'_>) -> Result<()> {
        if clauses.is_empty() {
            return Ok(());
        }

        let sql = stmt.fragment(self.flavor, |f| f.predicate(clauses, aliases))?;
        stmt.wheres.push(sql);
        Ok(())
    }

    /// Orders the flat rows by the table's ordering, junction first.
    fn order(&self, stmt: &mut Statement, node: &Table) -> Result<()> {
        let mut columns: Vec<(&str, &str, Direction)> = vec![];

        let backward = node.paginate
            && matches!(node.paging()?, Paging::Keyset(paging) if paging.backward);
        let sort_direction = |direction: Direction| {
            if backward {
                direction.flip()
            } else {
                direction
            }
        };

        let junction = node.junction.as_ref();
        let orderings = [
            junction.and_then(|j| j.order_by.as_ref().map(|o| (o, j.alias.as_str()))),
            node.order_by.as_ref().map(|o| (o, node.alias.as_str())),
        ];
        for (order_by, alias) in orderings.into_iter().flatten() {
            for column in &order_by.columns {
                columns.push((alias, column.column.as_str(), column.direction));
            }
        }

        let sort_keys = [
            junction.and_then(|j| j.sort_key.as_ref().map(|s| (s, j.alias.as_str()))),
            node.sort_key.as_ref().map(|s| (s, node.alias.as_str())),
        ];
        for (sort_key, alias) in sort_keys.into_iter().flatten() {
            for column in &sort_key.columns {
                columns.push((
                    alias,
                    column.column.as_str(),
                    sort_direction(column.direction),
                ));
            }
        }

        for (alias, column, direction) in columns {
            let sql = stmt.fragment(self.flavor, |f| {
                fmt!(f, Qualified(alias, column) " " direction.as_sql());
                Ok(())
            })?;
            stmt.orders.push(sql);
        }

        Ok(())
    }

    /// Selects the parent key a batch boundary is correlated on.
    fn select_parent_key(
        &self,
        stmt: &mut Statement,
        parent: &Table,
        key: &BatchKey,
        prefix: &[&str],
    ) -> Result<()> {
        let alias = join_prefix(prefix) + &key.alias;
        let sql = stmt.fragment(self.flavor, |f| {
            fmt!(f, Qualified(&parent.alias, &key.column) " AS " Ident(&alias));
            Ok(())
        })?;
        stmt.select(sql);
        Ok(())
    }

    fn require_scope<'s>(
        &self,
        node: &Table,
        batch_scope: Option<&'s [Value]>,
    ) -> Result<&'s [Value]> {
        batch_scope.ok_or_else(|| {
            Error::invalid_configuration(format!(
                "`{}` is a batch and must be compiled with a batch scope",
                node.location
            ))
        })
    }
}
