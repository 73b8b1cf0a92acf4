//! JSON row documents
//!
//! Reads a JSON array of row objects into [`RawRow`]s. Scalars are
//! stringified so the normalizer sees the same text a CSV cell would hold;
//! `null` becomes an empty cell.

use crate::columns::RawRow;
use crate::error::{RecordError, RecordResult};
use serde_json::Value;

/// Parse a JSON document holding an array of row objects
///
/// # Errors
/// Returns [`RecordError::InvalidJson`] for malformed JSON and
/// [`RecordError::InvalidRow`] for anything that is not a flat object.
pub fn rows_from_json(text: &str) -> RecordResult<Vec<RawRow>> {
    let value: Value = serde_json::from_str(text)?;
    rows_from_value(value)
}

/// Convert a parsed JSON value into rows
///
/// # Errors
/// Same as [`rows_from_json`], minus syntax errors.
pub fn rows_from_value(value: Value) -> RecordResult<Vec<RawRow>> {
    let Value::Array(items) = value else {
        return Err(RecordError::invalid_row(0, "document is not an array"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| row_from_value(index, item))
        .collect()
}

fn row_from_value(index: usize, item: Value) -> RecordResult<RawRow> {
    let Value::Object(fields) = item else {
        return Err(RecordError::invalid_row(index, "expected an object"));
    };

    let mut row = RawRow::with_capacity(fields.len());
    for (key, value) in fields {
        let text = match value {
            Value::Null => String::new(),
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(RecordError::invalid_row(
                    index,
                    format!("column '{key}' holds a nested value"),
                ));
            }
        };
        row.insert(key, text);
    }
    Ok(row)
}
