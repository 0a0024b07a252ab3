use crate::shape::{Shape, ShapeField};

use joinery_core::{
    stmt::{Key, Row, Value},
    Error, Result,
};

use indexmap::IndexMap;

/// Folds flat rows into objects following `shape`.
///
/// Rows with equal identity columns become one object, in order of first
/// appearance. Nested shapes are folded from the rows of their parent
/// object; a nested object whose identity columns are all null was not
/// matched by its join and is dropped.
pub(crate) fn hydrate(shape: &Shape, rows: &[Row]) -> Result<Vec<Value>> {
    let rows: Vec<&Row> = rows.iter().collect();
    fold(shape, &rows)
}

fn fold(shape: &Shape, rows: &[&Row]) -> Result<Vec<Value>> {
    let identity: Vec<&str> = shape.identity().collect();
    let mut objects: IndexMap<Vec<Option<Key>>, Vec<&Row>> = IndexMap::new();

    for &row in rows {
        let key = identity
            .iter()
            .map(|alias| column(row, alias).map(Value::key))
            .collect::<Result<Vec<_>>>()?;

        if key.iter().all(Option::is_none) {
            continue;
        }

        objects.entry(key).or_default().push(row);
    }

    objects
        .values()
        .map(|rows| object(shape, rows))
        .collect()
}

fn object(shape: &Shape, rows: &[&Row]) -> Result<Value> {
    let Some(first) = rows.first() else {
        return Ok(Value::Null);
    };

    let mut fields = IndexMap::with_capacity(shape.fields.len());

    for (name, field) in &shape.fields {
        let value = match field {
            ShapeField::Column { alias, .. } => column(first, alias)?.clone(),
            ShapeField::Nested { shape, many: true } => Value::List(fold(shape, rows)?),
            ShapeField::Nested { shape, many: false } => {
                fold(shape, rows)?.into_iter().next().unwrap_or_default()
            }
        };
        fields.insert(name.clone(), value);
    }

    Ok(Value::Object(fields))
}

fn column<'a>(row: &'a Row, alias: &str) -> Result<&'a Value> {
    row.get(alias).ok_or_else(|| {
        Error::invalid_result(format!("row has no column `{alias}`; got {:?}", row.columns()))
    })
}
