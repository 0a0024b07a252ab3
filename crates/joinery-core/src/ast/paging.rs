use super::Table;
use crate::{
    clause::{Direction, OrderBy, SortKey, SortKeyColumn},
    cursor,
    stmt::Value,
    Error, Result,
};

/// How a paginated table pages, read from its arguments.
#[derive(Debug)]
pub enum Paging<'a> {
    Offset(OffsetPaging<'a>),
    Keyset(KeysetPaging<'a>),
}

#[derive(Debug)]
pub struct OffsetPaging<'a> {
    pub order_by: &'a OrderBy,

    /// Alias of the table the ordering applies to
    pub table: &'a str,

    pub first: Option<u64>,

    /// Position of the first row of the page
    pub offset: u64,
}

#[derive(Debug)]
pub struct KeysetPaging<'a> {
    pub sort_key: &'a SortKey,

    /// Alias of the table the sort key applies to
    pub table: &'a str,

    /// `first` or `last`
    pub count: Option<u64>,

    /// Paging toward the start with `last`/`before`
    pub backward: bool,

    /// Sort key values decoded from `after`/`before`, in sort key order
    pub cursor: Option<Vec<Value>>,
}

impl Table {
    /// Interprets the paging arguments of a paginated table.
    pub fn paging(&self) -> Result<Paging<'_>> {
        if let Some((sort_key, table)) = self.keyset() {
            return self.keyset_paging(sort_key, table).map(Paging::Keyset);
        }

        if let Some((order_by, table)) = self.offset_order() {
            return self.offset_paging(order_by, table).map(Paging::Offset);
        }

        Err(Error::invalid_configuration(format!(
            "`{}` is paginated but has neither an order nor a sort key",
            self.location
        )))
    }

    fn keyset_paging<'a>(
        &'a self,
        sort_key: &'a SortKey,
        table: &'a str,
    ) -> Result<KeysetPaging<'a>> {
        let first = self.args.get_count("first")?;
        let last = self.args.get_count("last")?;
        let after = self.cursor_argument("after")?;
        let before = self.cursor_argument("before")?;

        let (count, backward, cursor) = match (first, last) {
            (Some(_), Some(_)) => {
                return Err(self.paging_error("using `first` with `last` is not supported"))
            }
            (Some(_), None) if before.is_some() => {
                return Err(self.paging_error("using `before` with `first` is not supported"))
            }
            (None, Some(_)) if after.is_some() => {
                return Err(self.paging_error("using `after` with `last` is not supported"))
            }
            (Some(first), None) => (Some(first), false, after),
            (None, Some(last)) => (Some(last), true, before),
            (None, None) => match (after, before) {
                (Some(_), Some(_)) => {
                    return Err(self.paging_error("using `after` with `before` is not supported"))
                }
                (None, Some(before)) => (None, true, Some(before)),
                (after, None) => (None, false, after),
            },
        };

        let cursor = cursor
            .map(|cursor| cursor::decode_keyset(cursor, sort_key))
            .transpose()
            .map_err(|err| err.context(crate::err!("cannot page `{}`", self.location)))?;

        Ok(KeysetPaging {
            sort_key,
            table,
            count,
            backward,
            cursor,
        })
    }

    fn offset_paging<'a>(
        &'a self,
        order_by: &'a OrderBy,
        table: &'a str,
    ) -> Result<OffsetPaging<'a>> {
        if self.args.contains("last") || self.args.contains("before") {
            return Err(self.paging_error(
                "backward pagination is not supported with offsets; declare a sort key instead",
            ));
        }

        let first = self.args.get_count("first")?;
        let offset = match self.cursor_argument("after")? {
            Some(after) => {
                let offset = cursor::cursor_to_offset(after)
                    .map_err(|err| err.context(crate::err!("cannot page `{}`", self.location)))?;
                offset
                    .checked_add(1)
                    .filter(|offset| i64::try_from(*offset).is_ok())
                    .ok_or_else(|| Error::invalid_cursor(format!("`{after}` is out of range")))?
            }
            None => 0,
        };

        Ok(OffsetPaging {
            order_by,
            table,
            first,
            offset,
        })
    }

    fn cursor_argument(&self, name: &str) -> Result<Option<&str>> {
        match self.args.get(name) {
            None => Ok(None),
            Some(Value::String(cursor)) => Ok(Some(cursor)),
            Some(other) => Err(Error::invalid_cursor(format!(
                "`{name}` must be a string; got {}",
                other.kind_name()
            ))),
        }
    }

    fn paging_error(&self, message: &str) -> Error {
        Error::invalid_configuration(format!("`{}`: {message}", self.location))
    }
}

impl Paging<'_> {
    /// Rows to fetch: one more than requested, to detect a further page.
    pub fn limit(&self) -> Option<u64> {
        match self {
            Paging::Offset(paging) => paging.first.map(|first| first + 1),
            Paging::Keyset(paging) => paging.count.map(|count| count + 1),
        }
    }

    pub fn is_offset(&self) -> bool {
        matches!(self, Paging::Offset(_))
    }
}

impl KeysetPaging<'_> {
    /// Direction a sort key column is fetched in.
    pub fn direction(&self, column: &SortKeyColumn) -> Direction {
        if self.backward {
            column.direction.flip()
        } else {
            column.direction
        }
    }
}
