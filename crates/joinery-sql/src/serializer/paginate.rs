use super::{
    Aliases, Delimited, Formatter, Ident, Limit, Qualified, Serializer, Statement, ToSql,
};

use joinery_core::{
    ast::{Batch, Junction, JunctionBatch, KeysetPaging, Paging, Table},
    clause::{Clause, Direction},
    schema::TableName,
    stmt::Value,
    Result,
};

/// Alias of the derived table holding a batch scope.
const SCOPE_TABLE: &str = "temp";

/// Column holding the total row count in offset-paginated sub-selects.
pub const TOTAL_COLUMN: &str = "$total";

/// A sub-select fetching one page of a table, either as the statement's
/// `FROM` or as a lateral join.
struct PagedSelect<'a> {
    table: &'a TableName,
    alias: &'a str,
    conditions: Vec<String>,
    extra_join: Option<String>,

    /// `(left, on)` when the select is joined laterally
    lateral: Option<(bool, String)>,
}

impl<'a> PagedSelect<'a> {
    fn new(table: &'a TableName, alias: &'a str) -> PagedSelect<'a> {
        PagedSelect {
            table,
            alias,
            conditions: vec![],
            extra_join: None,
            lateral: None,
        }
    }

    fn filter(
        &mut self,
        stmt: &mut Statement,
        serializer: &Serializer<'_>,
        clauses: &[Clause],
        aliases: Aliases<'_>,
    ) -> Result<()> {
        if clauses.is_empty() {
            return Ok(());
        }

        let sql = stmt.fragment(serializer.flavor, |f| f.predicate(clauses, aliases))?;
        self.conditions.push(sql);
        Ok(())
    }

    /// Restricts the page to rows strictly past the cursor.
    fn keyset_predicate(
        &mut self,
        stmt: &mut Statement,
        serializer: &Serializer<'_>,
        paging: &Paging<'_>,
    ) -> Result<()> {
        let Paging::Keyset(keyset) = paging else {
            return Ok(());
        };
        let Some(values) = &keyset.cursor else {
            return Ok(());
        };

        let sql = stmt.fragment(serializer.flavor, |f| {
            f.keyset_predicate(keyset, values);
            Ok(())
        })?;
        self.conditions.push(sql);
        Ok(())
    }

    fn render(
        self,
        stmt: &mut Statement,
        serializer: &Serializer<'_>,
        paging: &Paging<'_>,
    ) -> Result<String> {
        stmt.fragment(serializer.flavor, |f| {
            let alias = Ident(self.alias);

            match &self.lateral {
                Some((true, _)) => fmt!(f, "LEFT JOIN LATERAL (\n"),
                Some((false, _)) => fmt!(f, "JOIN LATERAL (\n"),
                None => fmt!(f, "FROM (\n"),
            }

            fmt!(f, "  SELECT " Ident(self.alias) ".*");
            if paging.is_offset() {
                fmt!(f, ", count(*) OVER () AS " Ident(TOTAL_COLUMN));
            }
            fmt!(f, "\n  FROM " self.table " " Ident(self.alias));

            if let Some(join) = &self.extra_join {
                fmt!(f, "\n  " join);
            }

            if !self.conditions.is_empty() {
                fmt!(f, "\n  WHERE " Delimited(&self.conditions, " AND "));
            }

            fmt!(f, "\n  ORDER BY ");
            f.paging_order(paging);
            fmt!(f, "\n  " Limit(paging.limit()));

            if let Paging::Offset(offset) = paging {
                fmt!(f, " OFFSET " offset.offset);
            }

            fmt!(f, "\n) " alias);

            if let Some((_, on)) = &self.lateral {
                fmt!(f, " ON " on);
            }

            Ok(())
        })
    }
}

impl<'a> Serializer<'a> {
    /// A paginated table at the root of the request.
    pub(super) fn root_paginated(&self, stmt: &mut Statement, node: &Table) -> Result<()> {
        let paging = node.paging()?;
        self.flavor
            .check_paging(&node.location, false, paging.is_offset())?;

        let mut select = PagedSelect::new(&node.name, &node.alias);
        select.filter(stmt, self, &node.where_, Aliases::table(&node.alias))?;
        select.keyset_predicate(stmt, self, &paging)?;

        let sql = select.render(stmt, self, &paging)?;
        stmt.tables.push(sql);
        Ok(())
    }

    /// A paginated one-to-many relation reached by a join: one page per
    /// parent row, via a lateral sub-select.
    pub(super) fn joined_one_to_many_paginated(
        &self,
        stmt: &mut Statement,
        parent: &Table,
        node: &Table,
        join: &[Clause],
    ) -> Result<()> {
        let paging = node.paging()?;
        self.flavor
            .check_paging(&node.location, true, paging.is_offset())?;

        let aliases = Aliases::join(&parent.alias, &node.alias);

        let mut select = PagedSelect::new(&node.name, &node.alias);
        select.filter(stmt, self, join, aliases)?;
        select.filter(stmt, self, &node.where_, Aliases::table(&node.alias))?;
        select.keyset_predicate(stmt, self, &paging)?;

        let on = stmt.fragment(self.flavor, |f| f.predicate(join, aliases))?;
        select.lateral = Some((true, on));

        let sql = select.render(stmt, self, &paging)?;
        stmt.tables.push(sql);
        Ok(())
    }

    /// A paginated batch: one page per batch scope value.
    pub(super) fn batched_one_to_many_paginated(
        &self,
        stmt: &mut Statement,
        node: &Table,
        batch: &Batch,
        scope: &[Value],
    ) -> Result<()> {
        let paging = node.paging()?;
        self.flavor
            .check_paging(&node.location, true, paging.is_offset())?;

        let scope_table = self.scope_table(stmt, &batch.parent_key.column, scope)?;
        stmt.tables.push(scope_table);

        let correlate = stmt.fragment(self.flavor, |f| {
            let this_key = Qualified(&node.alias, &batch.this_key.column);
            let parent_key = Qualified(SCOPE_TABLE, &batch.parent_key.column);
            fmt!(f, this_key " = " parent_key);
            Ok(())
        })?;

        let mut select = PagedSelect::new(&node.name, &node.alias);
        select.conditions.push(correlate.clone());
        select.filter(stmt, self, &node.where_, Aliases::table(&node.alias))?;
        select.keyset_predicate(stmt, self, &paging)?;
        select.lateral = Some((false, correlate));

        let sql = select.render(stmt, self, &paging)?;
        stmt.tables.push(sql);
        Ok(())
    }

    /// A paginated many-to-many relation joined through its junction table.
    /// The page is taken over the junction rows.
    pub(super) fn joined_many_to_many_paginated(
        &self,
        stmt: &mut Statement,
        parent: &Table,
        node: &Table,
        junction: &Junction,
        from_parent: &[Clause],
        to_child: &[Clause],
    ) -> Result<()> {
        let paging = node.paging()?;
        self.flavor
            .check_paging(&node.location, true, paging.is_offset())?;

        let aliases = Aliases::join(&parent.alias, &junction.alias);

        let mut select = PagedSelect::new(&junction.table, &junction.alias);
        select.filter(stmt, self, from_parent, aliases)?;
        select.filter(stmt, self, &junction.where_, Aliases::table(&junction.alias))?;
        select.filter(stmt, self, &node.where_, Aliases::table(&node.alias))?;
        select.keyset_predicate(stmt, self, &paging)?;
        select.extra_join = self.child_join(stmt, node, junction, to_child)?;

        let on = stmt.fragment(self.flavor, |f| f.predicate(from_parent, aliases))?;
        select.lateral = Some((true, on));

        let sql = select.render(stmt, self, &paging)?;
        stmt.tables.push(sql);
        Ok(())
    }

    /// A paginated many-to-many batch: one page of junction rows per batch
    /// scope value, joined to the child table.
    pub(super) fn batched_many_to_many_paginated(
        &self,
        stmt: &mut Statement,
        node: &Table,
        junction: &Junction,
        batch: &JunctionBatch,
        scope: &[Value],
        join: &[Clause],
    ) -> Result<()> {
        let paging = node.paging()?;
        self.flavor
            .check_paging(&node.location, true, paging.is_offset())?;

        let scope_table = self.scope_table(stmt, &batch.parent_key.column, scope)?;
        stmt.tables.push(scope_table);

        let correlate = stmt.fragment(self.flavor, |f| {
            let this_key = Qualified(&junction.alias, &batch.this_key.column);
            let parent_key = Qualified(SCOPE_TABLE, &batch.parent_key.column);
            fmt!(f, this_key " = " parent_key);
            Ok(())
        })?;

        let mut select = PagedSelect::new(&junction.table, &junction.alias);
        select.conditions.push(correlate.clone());
        select.filter(stmt, self, &junction.where_, Aliases::table(&junction.alias))?;
        select.filter(stmt, self, &node.where_, Aliases::table(&node.alias))?;
        select.keyset_predicate(stmt, self, &paging)?;
        select.extra_join = self.child_join(stmt, node, junction, join)?;
        select.lateral = Some((true, correlate));

        let sql = select.render(stmt, self, &paging)?;
        stmt.tables.push(sql);

        let sql = stmt.fragment(self.flavor, |f| {
            let table = &node.name;
            fmt!(f, "LEFT JOIN " table " AS " Ident(&node.alias) " ON ");
            f.predicate(join, Aliases::join(&junction.alias, &node.alias))
        })?;
        stmt.tables.push(sql);
        Ok(())
    }

    /// `FROM (VALUES ($1), ($2)) "temp"("key")`
    fn scope_table(&self, stmt: &mut Statement, column: &str, scope: &[Value]) -> Result<String> {
        stmt.fragment(self.flavor, |f| {
            fmt!(f, "FROM (VALUES ");
            for (i, value) in scope.iter().enumerate() {
                if i > 0 {
                    fmt!(f, ", ");
                }
                fmt!(f, "(" value ")");
            }
            fmt!(f, ") " Ident(SCOPE_TABLE) "(" Ident(column) ")");
            Ok(())
        })
    }

    /// Joins the child table inside a junction page when the page is filtered
    /// or ordered by child columns.
    fn child_join(
        &self,
        stmt: &mut Statement,
        node: &Table,
        junction: &Junction,
        to_child: &[Clause],
    ) -> Result<Option<String>> {
        if node.where_.is_empty() && node.order_by.is_none() && node.sort_key.is_none() {
            return Ok(None);
        }

        stmt.fragment(self.flavor, |f| {
            let table = &node.name;
            fmt!(f, "LEFT JOIN " table " " Ident(&node.alias) "\n    ON ");
            f.predicate(to_child, Aliases::join(&junction.alias, &node.alias))
        })
        .map(Some)
    }
}

impl Formatter<'_> {
    fn paging_order(&mut self, paging: &Paging<'_>) {
        let columns: Vec<(&str, &str, Direction)> = match paging {
            Paging::Offset(offset) => offset
                .order_by
                .columns
                .iter()
                .map(|column| (offset.table, column.column.as_str(), column.direction))
                .collect(),
            Paging::Keyset(keyset) => keyset
                .sort_key
                .columns
                .iter()
                .map(|column| (keyset.table, column.column.as_str(), keyset.direction(column)))
                .collect(),
        };

        for (i, (table, column, direction)) in columns.into_iter().enumerate() {
            if i > 0 {
                fmt!(self, ", ");
            }
            fmt!(self, Qualified(table, column) " " direction.as_sql());
        }
    }

    /// Lexicographic "strictly past the cursor" over the sort key, folded
    /// from the last column:
    ///
    /// `(a > ($1) OR (a = ($1) AND b > ($2)))`
    fn keyset_predicate(&mut self, paging: &KeysetPaging<'_>, values: &[Value]) {
        let mut operands = vec![];

        for (column, value) in paging.sort_key.columns.iter().zip(values) {
            let op = match paging.direction(column) {
                Direction::Asc => ">",
                Direction::Desc => "<",
            };
            let column = self.render(Qualified(paging.table, &column.column));
            let value = self.render(value);
            operands.push((column, op, value));
        }

        let mut operands = operands.into_iter().rev();
        let Some((column, op, value)) = operands.next() else {
            fmt!(self, "TRUE");
            return;
        };

        let mut condition = format!("{column} {op} ({value})");
        for (column, op, value) in operands {
            condition =
                format!("({column} {op} ({value}) OR ({column} = ({value}) AND {condition}))");
        }

        fmt!(self, &condition);
    }

    /// Serializes a fragment on its own, binding values into the shared
    /// parameters.
    fn render(&mut self, fragment: impl ToSql) -> String {
        let mut dst = String::new();
        {
            let mut f = Formatter {
                flavor: self.flavor,
                dst: &mut dst,
                params: &mut *self.params,
            };
            fragment.to_sql(&mut f);
        }
        dst
    }
}
