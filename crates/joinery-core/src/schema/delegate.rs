use super::TableName;
use crate::{
    clause::{JoinBuilder, OrderByBuilder, SortKeyBuilder, WhereBuilder},
    request::Context,
    stmt::Arguments,
};

use std::sync::Arc;

/// Emits filter clauses for a table.
pub type WhereFn = Arc<dyn Fn(&mut WhereBuilder, &Arguments, &Context) + Send + Sync>;

/// Emits the condition joining a parent table to a child table.
pub type JoinFn = Arc<dyn Fn(&mut JoinBuilder, &Arguments, &Context) + Send + Sync>;

pub type OrderByFn = Arc<dyn Fn(&mut OrderByBuilder, &Arguments, &Context) + Send + Sync>;

pub type SortKeyFn = Arc<dyn Fn(&mut SortKeyBuilder, &Arguments, &Context) + Send + Sync>;

/// Produces a SQL expression for one field. Receives the quoted alias of
/// the field's table.
pub type ColumnExprFn = Arc<dyn Fn(&str, &Arguments, &Context) -> String + Send + Sync>;

/// Produces the SQL expression for every plain column of a table. Receives
/// the quoted table alias and the column name.
pub type TableColumnExprFn =
    Arc<dyn Fn(&str, &str, &Arguments, &Context) -> String + Send + Sync>;

/// Resolves a table name from the request.
pub type TableNameFn = Arc<dyn Fn(&Arguments, &Context) -> TableName + Send + Sync>;
