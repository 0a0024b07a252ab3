use super::{Comma, Formatter, Ident, Qualified, ToSql};

use joinery_core::{
    clause::{Clause, ColumnRef, CompareOp, Condition, Connective, TableRef},
    stmt::Value,
    Error, Result,
};

use indexmap::IndexMap;

/// Table aliases that column references and raw SQL resolve against.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct Aliases<'a> {
    this: Option<&'a str>,
    parent: Option<&'a str>,
    child: Option<&'a str>,
}

impl<'a> Aliases<'a> {
    /// A clause attached to a single table.
    pub(super) fn table(alias: &'a str) -> Aliases<'a> {
        Aliases {
            this: Some(alias),
            ..Aliases::default()
        }
    }

    /// A clause joining `parent` to `child`.
    pub(super) fn join(parent: &'a str, child: &'a str) -> Aliases<'a> {
        Aliases {
            this: Some(child),
            parent: Some(parent),
            child: Some(child),
        }
    }

    fn resolve(&self, table: TableRef) -> Result<&'a str> {
        let (alias, name) = match table {
            TableRef::This => (self.this, "table"),
            TableRef::Parent => (self.parent, "parent"),
            TableRef::Child => (self.child, "child"),
        };

        alias.ok_or_else(|| {
            Error::invalid_configuration(format!(
                "clause refers to the {name} table, which is not in scope"
            ))
        })
    }
}

impl Formatter<'_> {
    /// Writes clauses as one boolean expression that can be `AND`ed with
    /// others.
    pub(super) fn predicate(&mut self, clauses: &[Clause], aliases: Aliases<'_>) -> Result<()> {
        let wrap = clauses
            .iter()
            .skip(1)
            .any(|clause| clause.connective == Connective::Or);

        if wrap {
            fmt!(self, "(");
        }
        self.clauses(clauses, aliases)?;
        if wrap {
            fmt!(self, ")");
        }

        Ok(())
    }

    fn clauses(&mut self, clauses: &[Clause], aliases: Aliases<'_>) -> Result<()> {
        if clauses.is_empty() {
            fmt!(self, "TRUE");
            return Ok(());
        }

        for (i, clause) in clauses.iter().enumerate() {
            if i > 0 {
                match clause.connective {
                    Connective::And => fmt!(self, " AND "),
                    Connective::Or => fmt!(self, " OR "),
                }
            }

            if clause.negated {
                fmt!(self, "NOT (");
                self.condition(&clause.condition, aliases)?;
                fmt!(self, ")");
            } else {
                self.condition(&clause.condition, aliases)?;
            }
        }

        Ok(())
    }

    fn condition(&mut self, condition: &Condition, aliases: Aliases<'_>) -> Result<()> {
        match condition {
            Condition::Compare { column, op, value } => {
                self.column_ref(column, aliases)?;

                match (op, value) {
                    (CompareOp::Eq, Value::Null) => fmt!(self, " IS NULL"),
                    (CompareOp::Ne, Value::Null) => fmt!(self, " IS NOT NULL"),
                    _ => fmt!(self, " " op.as_sql() " " value),
                }
            }
            Condition::CompareColumns { lhs, op, rhs } => {
                self.column_ref(lhs, aliases)?;
                fmt!(self, " " op.as_sql() " ");
                self.column_ref(rhs, aliases)?;
            }
            Condition::InList { column, values } => {
                if values.is_empty() {
                    fmt!(self, "1 = 0");
                } else {
                    self.column_ref(column, aliases)?;
                    fmt!(self, " IN (" Comma(values) ")");
                }
            }
            Condition::Raw { sql, params } => {
                self.raw(sql, params, aliases)?;
            }
            Condition::Group(clauses) => {
                fmt!(self, "(");
                self.clauses(clauses, aliases)?;
                fmt!(self, ")");
            }
            Condition::Exists { sql, params } => {
                fmt!(self, "EXISTS (");
                self.raw(sql, params, aliases)?;
                fmt!(self, ")");
            }
        }

        Ok(())
    }

    fn column_ref(&mut self, column: &ColumnRef, aliases: Aliases<'_>) -> Result<()> {
        let table = aliases.resolve(column.table)?;
        fmt!(self, Qualified(table, &column.column));
        Ok(())
    }

    /// Expands `{table}`/`{parent}`/`{child}` to quoted aliases and `@name`
    /// to the placeholder of a bound parameter. Unknown `@` names are left
    /// as written.
    fn raw(
        &mut self,
        sql: &str,
        params: &IndexMap<String, Value>,
        aliases: Aliases<'_>,
    ) -> Result<()> {
        const ROLES: [(&str, TableRef); 3] = [
            ("{table}", TableRef::This),
            ("{parent}", TableRef::Parent),
            ("{child}", TableRef::Child),
        ];

        let mut rest = sql;

        while let Some(pos) = rest.find(['{', '@']) {
            fmt!(self, &rest[..pos]);
            rest = &rest[pos..];

            if rest.starts_with('{') {
                match ROLES.iter().find(|(token, _)| rest.starts_with(token)) {
                    Some((token, table)) => {
                        fmt!(self, Ident(aliases.resolve(*table)?));
                        rest = &rest[token.len()..];
                    }
                    None => {
                        fmt!(self, "{");
                        rest = &rest[1..];
                    }
                }
                continue;
            }

            let name_len = rest[1..]
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len() - 1);
            let name = &rest[1..1 + name_len];

            match params.get(name) {
                Some(value) if !name.is_empty() => {
                    fmt!(self, value);
                    rest = &rest[1 + name_len..];
                }
                _ => {
                    fmt!(self, "@");
                    rest = &rest[1..];
                }
            }
        }

        fmt!(self, rest);
        Ok(())
    }
}
