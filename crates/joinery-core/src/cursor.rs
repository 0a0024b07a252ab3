//! Opaque pagination cursors.
//!
//! Offset cursors encode a row position, keyset cursors encode the sort key
//! values of a row as a JSON object. Both are base64 so clients treat them as
//! opaque tokens.

use crate::{clause::SortKey, stmt::Value, Error, Result};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use indexmap::IndexMap;

const OFFSET_PREFIX: &str = "arrayconnection:";

pub fn offset_to_cursor(offset: u64) -> String {
    STANDARD.encode(format!("{OFFSET_PREFIX}{offset}"))
}

/// Decodes an offset cursor. Offsets past `i64::MAX` cannot be bound as a
/// SQL `OFFSET` and are rejected.
pub fn cursor_to_offset(cursor: &str) -> Result<u64> {
    let decoded = decode(cursor)?;

    let offset: u64 = decoded
        .strip_prefix(OFFSET_PREFIX)
        .and_then(|offset| offset.parse().ok())
        .ok_or_else(|| Error::invalid_cursor(format!("`{cursor}` is not an offset cursor")))?;

    if i64::try_from(offset).is_err() {
        return Err(Error::invalid_cursor(format!("`{cursor}` is out of range")));
    }

    Ok(offset)
}

/// Encodes sort key values, keeping the order of `values`.
pub fn object_to_cursor(values: &IndexMap<String, Value>) -> Result<String> {
    let json = serde_json::to_string(values)?;
    Ok(STANDARD.encode(json))
}

pub fn cursor_to_object(cursor: &str) -> Result<IndexMap<String, Value>> {
    let decoded = decode(cursor)?;

    let object: IndexMap<String, serde_json::Value> = serde_json::from_str(&decoded)
        .map_err(|_| Error::invalid_cursor(format!("`{cursor}` is not a keyset cursor")))?;

    Ok(object
        .into_iter()
        .map(|(name, value)| (name, Value::from(value)))
        .collect())
}

/// Checks that a decoded cursor names exactly the columns of `sort_key`.
pub fn validate_cursor(cursor: &IndexMap<String, Value>, sort_key: &SortKey) -> Result<()> {
    for name in cursor.keys() {
        if !sort_key.names().any(|expected| expected == name) {
            return Err(Error::invalid_cursor(format!(
                "column `{name}` is not in the sort key"
            )));
        }
    }

    for name in sort_key.names() {
        if !cursor.contains_key(name) {
            return Err(Error::invalid_cursor(format!(
                "column `{name}` is not in the cursor"
            )));
        }
    }

    Ok(())
}

/// Decodes and validates a keyset cursor, returning one value per sort key
/// column in sort key order.
pub fn decode_keyset(cursor: &str, sort_key: &SortKey) -> Result<Vec<Value>> {
    let mut object = cursor_to_object(cursor)?;
    validate_cursor(&object, sort_key)?;

    sort_key
        .columns
        .iter()
        .map(|column| {
            let value = object.swap_remove(&column.name).unwrap_or_default();
            column.ty.convert(&column.name, value)
        })
        .collect()
}

fn decode(cursor: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(cursor)
        .map_err(|_| Error::invalid_cursor(format!("`{cursor}` is not valid base64")))?;

    String::from_utf8(bytes)
        .map_err(|_| Error::invalid_cursor(format!("`{cursor}` is not valid UTF-8")))
}
