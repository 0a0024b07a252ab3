use super::{Delimited, Formatter, ToSql};

use joinery_core::schema::TableName;

/// A quoted identifier
pub(super) struct Ident<S>(pub(super) S);

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dst.push('"');
        for c in self.0.as_ref().chars() {
            if c == '"' {
                f.dst.push('"');
            }
            f.dst.push(c);
        }
        f.dst.push('"');
    }
}

/// `"table"."column"`
pub(super) struct Qualified<'a>(pub(super) &'a str, pub(super) &'a str);

impl ToSql for Qualified<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, Ident(self.0) "." Ident(self.1));
    }
}

impl ToSql for &TableName {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            TableName::Ident(name) => {
                fmt!(f, Delimited(name.split('.').map(Ident), "."));
            }
            TableName::Expr(sql) => {
                fmt!(f, sql);
            }
        }
    }
}
