use super::{Comma, Delimited, Formatter, Qualified, Serializer, ToSql};

use joinery_core::{ast::SqlAst, Error, Result};

/// The SQL dialect statements are compiled for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Full featured: lateral joins and window functions.
    #[default]
    Postgresql,

    /// No lateral joins, so only root-level keyset pagination is available.
    Sqlite,
}

impl<'a> Serializer<'a> {
    pub fn postgresql(ast: &'a SqlAst) -> Serializer<'a> {
        Serializer::new(ast, Flavor::Postgresql)
    }

    pub fn sqlite(ast: &'a SqlAst) -> Serializer<'a> {
        Serializer::new(ast, Flavor::Sqlite)
    }
}

impl Flavor {
    /// Quotes an identifier the way compiled statements do.
    pub fn quote(self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    pub(super) fn supports_lateral(self) -> bool {
        matches!(self, Flavor::Postgresql)
    }

    pub(super) fn supports_window_functions(self) -> bool {
        matches!(self, Flavor::Postgresql)
    }

    /// Fails unless paginating `location` is possible in this flavor.
    pub(super) fn check_paging(
        self,
        location: &dyn std::fmt::Display,
        lateral: bool,
        offset: bool,
    ) -> Result<()> {
        if lateral && !self.supports_lateral() {
            return Err(Error::unsupported_feature(format!(
                "paginating `{location}` requires a LATERAL join, which {self:?} does not support"
            )));
        }

        if offset && !self.supports_window_functions() {
            return Err(Error::unsupported_feature(format!(
                "offset pagination of `{location}` requires window functions, \
                 which {self:?} does not support"
            )));
        }

        Ok(())
    }
}

/// A multi-column key folded into one string; empty collapses to NULL.
pub(super) struct CompositeKey<'a> {
    pub(super) table: &'a str,
    pub(super) columns: &'a [String],
}

impl ToSql for CompositeKey<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let columns = self
            .columns
            .iter()
            .map(|column| Qualified(self.table, column));

        match f.flavor {
            Flavor::Postgresql => fmt!(f, "NULLIF(CONCAT(" Comma(columns) "), '')"),
            Flavor::Sqlite => fmt!(f, "NULLIF(" Delimited(columns, " || ") ", '')"),
        }
    }
}

/// A row limit, or the flavor's spelling of "no limit".
pub(super) struct Limit(pub(super) Option<u64>);

impl ToSql for Limit {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match (self.0, f.flavor) {
            (Some(limit), _) => fmt!(f, "LIMIT " limit),
            (None, Flavor::Postgresql) => fmt!(f, "LIMIT ALL"),
            (None, Flavor::Sqlite) => fmt!(f, "LIMIT -1"),
        }
    }
}
