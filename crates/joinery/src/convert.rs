//! Lowers a request selection onto the SQL AST.

mod alias;
use alias::Namespace;

use joinery_core::{
    ast::{
        Batch, BatchKey, Column, Composite, Junction, JunctionBatch, Location, NodeId, Noop,
        Table,
    },
    clause::{Clause, JoinBuilder, OrderBy, OrderByBuilder, SortKey, SortKeyBuilder, WhereBuilder},
    schema::{Field, JoinFn, ObjectType, OrderByFn, SortKeyFn, TableName, WhereFn},
    stmt::Arguments,
    Context, Error, Result, Schema, Selection, SqlAst,
};
use joinery_sql::{Flavor, TOTAL_COLUMN};

pub(crate) struct Converter<'a> {
    schema: &'a Schema,
    flavor: Flavor,
    cx: &'a Context,
    aliases: Namespace,
}

impl<'a> Converter<'a> {
    pub(crate) fn new(
        schema: &'a Schema,
        flavor: Flavor,
        minify: bool,
        cx: &'a Context,
    ) -> Converter<'a> {
        Converter {
            schema,
            flavor,
            cx,
            aliases: Namespace::new(minify),
        }
    }

    /// Plans `selection`, a field of the query type.
    pub(crate) fn convert(mut self, selection: &Selection) -> Result<SqlAst> {
        let query_type = self.schema.query_type();
        let location = Location::from_path([query_type.name()]);
        let field = self.field(query_type, selection, &location)?;
        let location = location.join(selection.response_key());

        let Some((target, list)) = self.target(field, &location)? else {
            return Err(Error::invalid_configuration(format!(
                "`{location}` is a scalar and cannot be a root field"
            )));
        };

        let Some(table) = self.table(field, selection, target, list, location.clone())? else {
            log::debug!("`{location}` has no table; nothing to plan");
            return Ok(SqlAst::new(
                Noop {
                    field_name: selection.response_key().to_string(),
                    location,
                }
                .into(),
            ));
        };

        let mut ast = SqlAst::new(table.into());
        let root = ast.root();
        self.populate(&mut ast, root, target, selection)?;
        Ok(ast)
    }

    /// Adds the columns and child tables of the table at `node`.
    fn populate(
        &mut self,
        ast: &mut SqlAst,
        node: NodeId,
        ty: &'a ObjectType,
        selection: &Selection,
    ) -> Result<()> {
        let table = ast
            .table(node)
            .cloned()
            .ok_or_else(|| Error::invalid_configuration("only tables have columns"))?;
        let location = &table.location;

        let config = ty.table_config().ok_or_else(|| {
            Error::invalid_configuration(format!("type `{}` has no table", ty.name()))
        })?;

        // Identity
        match config.unique_key_columns() {
            [] => {
                return Err(Error::invalid_configuration(format!(
                    "type `{}` has no unique key",
                    ty.name()
                )))
            }
            [column] => {
                let column = self.column(ty, &table, column, column, location).identity();
                ast.push(node, column.into());
            }
            columns => {
                let field_name = columns.join("#");
                let alias = self.aliases.column(&field_name);
                let key = Composite::new(columns.to_vec(), alias, location.clone());
                ast.push(node, key.into());
            }
        }

        for column in config.always_fetch_columns() {
            let column = self.column(ty, &table, column, column, location);
            ast.push(node, column.into());
        }

        self.paging_columns(ast, node, &table);

        // The correlation key of a batch is part of the identity: a junction
        // batch may return the same child once per parent.
        if let Some((this_key, _)) = table.batch_keys() {
            let column = Column::new(
                &this_key.column,
                &this_key.field_name,
                &this_key.alias,
                location.clone(),
            )
            .identity();
            let column = match &table.junction {
                Some(junction) if table.junction_batch().is_some() => {
                    column.from_table(&junction.alias)
                }
                _ => column,
            };
            ast.push(node, column.into());
        }

        let selections = if table.paginate {
            node_selections(selection)
        } else {
            selection.selections.iter().collect()
        };

        for child in selections {
            if child.name.starts_with("__") {
                continue;
            }

            let field = self.field(ty, child, location)?;
            let location = location.join(child.response_key());

            if field.is_ignored() {
                for column in field.dependency_columns() {
                    let column = self.column(ty, &table, column, column, &location);
                    ast.push(node, column.into());
                }
                continue;
            }

            match self.target(field, &location)? {
                None => {
                    let column = match field.expression_fn() {
                        Some(f) => {
                            let quoted = self.flavor.quote(&table.alias);
                            let sql = f(&quoted, &child.arguments, self.cx);
                            let alias = self.aliases.column(child.response_key());
                            Column::expression(sql, child.response_key(), alias, location)
                        }
                        None => self.column(
                            ty,
                            &table,
                            field.column_name(),
                            child.response_key(),
                            &location,
                        ),
                    };
                    ast.push(node, column.into());
                }
                Some((target, list)) => {
                    match self.table(field, child, target, list, location.clone())? {
                        Some(child_table) => {
                            if field.join_fn().is_none()
                                && field.batch_config().is_none()
                                && field.junction_config().is_none()
                            {
                                let target = target.name();
                                return Err(Error::invalid_configuration(format!(
                                    "`{location}` needs a join, a batch or a junction \
                                     to reach `{target}`"
                                )));
                            }

                            let child_node = ast.push(node, child_table.into());
                            self.populate(ast, child_node, target, child)?;
                        }
                        None => {
                            ast.push(
                                node,
                                Noop {
                                    field_name: child.response_key().to_string(),
                                    location,
                                }
                                .into(),
                            );
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Builds the table a relation field resolves to, or `None` when the
    /// target type has no table.
    fn table(
        &mut self,
        field: &Field,
        selection: &Selection,
        target: &ObjectType,
        list: bool,
        location: Location,
    ) -> Result<Option<Table>> {
        let Some(config) = target.table_config() else {
            return Ok(None);
        };

        let args = &selection.arguments;
        let name = config.source().resolve(args, self.cx);
        let alias = self.aliases.table(selection.response_key());

        let mut table = Table::new(name, alias, selection.response_key(), location);
        table.args = args.clone();
        table.grab_many = list;
        table.paginate = field.is_paginated();
        table.join = field.join_fn().map(|f| self.join(f, args));
        table.where_ = self.filter(field.where_fn(), args);
        table.order_by = self.order_by(field.order_by_fn(), args);
        table.sort_key = self.sort_key(field.sort_key_fn(), args);

        if let Some(batch) = field.batch_config() {
            table.batch = Some(Batch {
                this_key: self.batch_key(&batch.this_key),
                parent_key: self.batch_key(&batch.parent_key),
            });
        }

        if let Some(config) = field.junction_config() {
            let junction_alias = self.aliases.table(&junction_alias(config.table()));

            let batch = config.batch_config().map(|batch| JunctionBatch {
                this_key: self.batch_key(batch.this_key()),
                parent_key: self.batch_key(batch.parent_key()),
                join: batch.join_fn().map(|f| self.join(f, args)),
            });

            table.junction = Some(Junction {
                table: config.table().clone(),
                alias: junction_alias,
                from_parent: config.from_parent_fn().map(|f| self.join(f, args)),
                to_child: config.to_child_fn().map(|f| self.join(f, args)),
                where_: self.filter(config.where_fn(), args),
                order_by: self.order_by(config.order_by_fn(), args),
                sort_key: self.sort_key(config.sort_key_fn(), args),
                batch,
            });
        }

        Ok(Some(table))
    }

    /// Columns the connection converter reads: sort key values for cursors
    /// and the total row count of offset pages.
    fn paging_columns(&mut self, ast: &mut SqlAst, node: NodeId, table: &Table) {
        if !table.paginate {
            return;
        }

        let junction_alias = table.junction.as_ref().map(|junction| junction.alias.as_str());

        if let Some((sort_key, sort_alias)) = table.keyset() {
            for column in &sort_key.columns {
                let alias = self.aliases.column(&column.name);
                let mut node_column =
                    Column::new(&column.column, &column.name, alias, table.location.clone());
                if sort_alias != table.alias {
                    node_column = node_column.from_table(sort_alias);
                }
                ast.push(node, node_column.into());
            }
        } else if table.offset_order().is_some() {
            let from = junction_alias.unwrap_or(&table.alias);
            let sql = format!("{}.{}", self.flavor.quote(from), self.flavor.quote(TOTAL_COLUMN));
            let alias = self.aliases.column(TOTAL_COLUMN);
            let column = Column::expression(sql, TOTAL_COLUMN, alias, table.location.clone());
            ast.push(node, column.into());
        }
    }

    /// A plain column of `table`, passed through the table's column
    /// expression when it has one.
    fn column(
        &mut self,
        ty: &ObjectType,
        table: &Table,
        column: &str,
        field_name: &str,
        location: &Location,
    ) -> Column {
        let alias = self.aliases.column(field_name);

        let expression = ty
            .table_config()
            .and_then(|config| config.table_column_expression());

        match expression {
            Some(f) => {
                let sql = f(&self.flavor.quote(&table.alias), column, &table.args, self.cx);
                Column::expression(sql, field_name, alias, location.clone())
            }
            None => Column::new(column, field_name, alias, location.clone()),
        }
    }

    fn field(
        &self,
        ty: &'a ObjectType,
        selection: &Selection,
        location: &Location,
    ) -> Result<&'a Field> {
        ty.get_field(&selection.name).ok_or_else(|| {
            Error::invalid_configuration(format!(
                "`{location}` has no field `{}` on type `{}`",
                selection.name,
                ty.name()
            ))
        })
    }

    fn target(&self, field: &Field, location: &Location) -> Result<Option<(&'a ObjectType, bool)>> {
        let Some((type_name, list)) = field.object_type() else {
            return Ok(None);
        };

        let target = self.schema.object_type(type_name).ok_or_else(|| {
            Error::invalid_configuration(format!(
                "`{location}` refers to unknown type `{type_name}`"
            ))
        })?;

        Ok(Some((target, list)))
    }

    fn batch_key(&mut self, column: &str) -> BatchKey {
        BatchKey::new(column, self.aliases.column(column))
    }

    fn join(&self, f: &JoinFn, args: &Arguments) -> Vec<Clause> {
        let mut builder = JoinBuilder::new();
        f(&mut builder, args, self.cx);
        builder.into_clauses()
    }

    fn filter(&self, f: Option<&WhereFn>, args: &Arguments) -> Vec<Clause> {
        let Some(f) = f else {
            return vec![];
        };

        let mut builder = WhereBuilder::new();
        f(&mut builder, args, self.cx);
        builder.into_clauses()
    }

    fn order_by(&self, f: Option<&OrderByFn>, args: &Arguments) -> Option<OrderBy> {
        let mut builder = OrderByBuilder::new();
        f?(&mut builder, args, self.cx);
        Some(builder.build()).filter(|order_by| !order_by.is_empty())
    }

    fn sort_key(&self, f: Option<&SortKeyFn>, args: &Arguments) -> Option<SortKey> {
        let mut builder = SortKeyBuilder::new();
        f?(&mut builder, args, self.cx);
        Some(builder.build()).filter(|sort_key| !sort_key.is_empty())
    }
}

/// Node selections of a connection: `edges { node { .. } }`. The other
/// connection fields are read from the connection value.
fn node_selections(selection: &Selection) -> Vec<&Selection> {
    selection
        .selections
        .iter()
        .filter(|edges| edges.name == "edges")
        .flat_map(|edges| &edges.selections)
        .filter(|node| node.name == "node")
        .flat_map(|node| &node.selections)
        .collect()
}

fn junction_alias(table: &TableName) -> String {
    match table {
        TableName::Ident(name) => name.rsplit('.').next().unwrap_or(name).to_string(),
        TableName::Expr(_) => "junction".to_string(),
    }
}
