use super::{Flavor, Formatter, ToSql};

use joinery_core::stmt::Value;

/// Reference to a bound parameter by its 1-based position.
pub(super) struct Placeholder(pub(super) usize);

impl ToSql for Placeholder {
    fn to_sql(self, f: &mut Formatter<'_>) {
        use std::fmt::Write;

        let _ = match f.flavor {
            Flavor::Postgresql => write!(f.dst, "${}", self.0),
            Flavor::Sqlite => write!(f.dst, "?{}", self.0),
        };
    }
}

/// Values are always bound, never inlined.
impl ToSql for &Value {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let placeholder = f.params.push(self.clone());
        fmt!(f, Placeholder(placeholder));
    }
}
