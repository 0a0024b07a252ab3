//! Turns hydrated lists of paginated tables into connections.

use joinery_core::{
    ast::{KeysetPaging, NodeId, OffsetPaging, Paging, Table},
    cursor,
    stmt::{Connection, Edge, PageInfo, Value},
    Error, Result, SqlAst,
};
use joinery_sql::TOTAL_COLUMN;

use indexmap::IndexMap;

/// Converts the hydrated value of `node`, and of the joined tables below it.
///
/// A paginated table's list becomes a connection, and an absent one an
/// empty connection. Other values keep their shape.
pub(crate) fn convert(ast: &SqlAst, node: NodeId, value: Value) -> Result<Value> {
    let Some(table) = ast.table(node) else {
        return Ok(value);
    };

    match value {
        Value::Null if table.paginate => Ok(Connection::empty().into()),
        Value::List(items) => {
            let items = items
                .into_iter()
                .map(|item| convert_object(ast, node, item))
                .collect::<Result<Vec<_>>>()?;

            if table.paginate {
                connect(table, items)
            } else {
                Ok(Value::List(items))
            }
        }
        Value::Object(_) => convert_object(ast, node, value),
        other if table.paginate => Err(Error::invalid_result(format!(
            "`{}` is paginated and expects a list; got {}",
            table.location,
            other.kind_name()
        ))),
        other => Ok(other),
    }
}

/// Converts the joined children of one object of `node`. Batch children
/// are attached later and converted by the batch planner.
pub(crate) fn convert_object(ast: &SqlAst, node: NodeId, mut value: Value) -> Result<Value> {
    if let Value::Object(fields) = &mut value {
        for (child, table) in ast.child_tables(node) {
            if table.is_batch() {
                continue;
            }

            if let Some(field) = fields.get_mut(&table.field_name) {
                *field = convert(ast, child, std::mem::take(field))?;
            }
        }
    }

    Ok(value)
}

/// Builds the connection for the rows fetched for one page of `table`.
pub(crate) fn connect(table: &Table, items: Vec<Value>) -> Result<Value> {
    let connection = match table.paging()? {
        Paging::Offset(paging) => offset_connection(&paging, items),
        Paging::Keyset(paging) => keyset_connection(&paging, items)?,
    };

    Ok(connection.into())
}

fn offset_connection(paging: &OffsetPaging<'_>, mut items: Vec<Value>) -> Connection {
    let total = items
        .first()
        .and_then(|item| item.get(TOTAL_COLUMN))
        .and_then(Value::as_i64)
        .unwrap_or(0);

    for item in &mut items {
        if let Some(fields) = item.as_object_mut() {
            fields.shift_remove(TOTAL_COLUMN);
        }
    }

    if let Some(first) = paging.first {
        items.truncate(first as usize);
    }

    let offset = paging.offset;
    let seen = offset.saturating_add(items.len() as u64);
    let has_next_page = u64::try_from(total).is_ok_and(|total| seen < total);

    let edges = items
        .into_iter()
        .enumerate()
        .map(|(i, node)| Edge {
            cursor: cursor::offset_to_cursor(offset.saturating_add(i as u64)),
            node,
        })
        .collect();

    with_edges(edges, has_next_page, offset > 0, Some(total))
}

fn keyset_connection(paging: &KeysetPaging<'_>, mut items: Vec<Value>) -> Result<Connection> {
    let has_more = paging
        .count
        .is_some_and(|count| items.len() as u64 > count);

    if let Some(count) = paging.count {
        items.truncate(count as usize);
    }

    if paging.backward {
        items.reverse();
    }

    let edges = items
        .into_iter()
        .map(|node| {
            let values: IndexMap<String, Value> = paging
                .sort_key
                .columns
                .iter()
                .map(|column| {
                    let value = node.get(&column.name).cloned().unwrap_or_default();
                    (column.name.clone(), value)
                })
                .collect();

            Ok(Edge {
                cursor: cursor::object_to_cursor(&values)?,
                node,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let (has_next_page, has_previous_page) = if paging.backward {
        (false, has_more)
    } else {
        (has_more, false)
    };

    Ok(with_edges(edges, has_next_page, has_previous_page, None))
}

fn with_edges(
    edges: Vec<Edge>,
    has_next_page: bool,
    has_previous_page: bool,
    total_count: Option<i64>,
) -> Connection {
    let page_info = PageInfo {
        has_next_page,
        has_previous_page,
        start_cursor: edges.first().map(|edge| edge.cursor.clone()),
        end_cursor: edges.last().map(|edge| edge.cursor.clone()),
    };

    Connection {
        edges,
        page_info,
        total_count,
    }
}
