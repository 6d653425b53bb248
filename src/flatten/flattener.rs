//! The explode-then-normalize operation the entity extractors drive.

use serde_json::Value;

use crate::error::Error;
use crate::flatten::normalize::normalize;
use crate::flatten::table::{is_missing, Table};

/// Explode one nested field of a table and normalize its contents into a
/// new flat table.
///
/// A field that is absent, null, or empty in every row yields an empty
/// table rather than an error; the caller's join then leaves the main
/// table untouched.
///
/// With a `record_path` and `meta` list, normalization descends the path
/// inside each nested record and attaches the meta fields to every row,
/// prefixing record-derived columns with the field name plus the path
/// segments. Without them, the records are flattened directly and the
/// caller prefixes or renames columns afterwards.
///
/// A field whose value is a non-list scalar in some row cannot be
/// exploded; that is a [`Error::MalformedNestedField`], which callers map
/// to a logged warning and an empty partial table.
pub fn flatten(
    table: &Table,
    field: &str,
    record_path: &[&str],
    meta: &[&[&str]],
) -> Result<Table, Error> {
    if let Some(bad) = table.column_values(field).find(|v| !explodable(v)) {
        return Err(malformed(field, bad));
    }
    if !table.column_values(field).any(|v| !is_missing(v)) {
        return Ok(Table::new());
    }

    let exploded = table.explode(field);
    let records: Vec<Value> = exploded
        .column_values(field)
        .filter(|v| !is_missing(v))
        .cloned()
        .collect();

    if record_path.is_empty() && meta.is_empty() {
        Ok(normalize(&records, &[], "", &[]))
    } else {
        let prefix = format!("{}_{}_", field, record_path.join("_"));
        Ok(normalize(&records, record_path, &prefix, meta))
    }
}

/// Lists explode; null and empty are tolerated; a lone record object is
/// treated as a single-element list. Anything else is malformed.
fn explodable(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_)) || is_missing(value)
}

fn malformed(field: &str, value: &Value) -> Error {
    Error::MalformedNestedField {
        field: field.to_string(),
        reason: format!("expected a list of records, found {value}"),
    }
}
