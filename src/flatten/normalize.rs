//! Record-path normalization - nested records to flat rows
//!
//! Walks a declared traversal path down each record to the repeated
//! sub-structure, emits one row per repeated element, and carries selected
//! ancestor ("meta") fields onto every row. Column names are deterministic
//! functions of the traversal path, so tables flattened from different
//! documents always agree on spelling.

use serde_json::{Map, Value};

use crate::flatten::table::{Row, Table};

/// Prefix applied to columns that originate at the traversal root:
/// the path segments joined with `_`, with a trailing separator.
pub fn record_prefix(path: &[&str]) -> String {
    let mut prefix = path.join("_");
    prefix.push('_');
    prefix
}

/// Column name for a carried meta field: its path joined with `.`.
pub fn meta_column_name(path: &[&str]) -> String {
    path.join(".")
}

/// Normalize one whole document along a record path.
///
/// Convenience wrapper over [`normalize`] that derives the column prefix
/// from the path itself.
pub fn normalize_document(document: &Value, record_path: &[&str], meta: &[&[&str]]) -> Table {
    let records = [document.clone()];
    normalize(&records, record_path, &record_prefix(record_path), meta)
}

/// Flatten records into a table, one row per repeated element.
///
/// For each record, descends `record_path` (objects are entered by key,
/// intermediate lists are iterated) until the repeated structure is
/// reached, then flattens each element into prefixed columns. Nested
/// scalar objects inside an element flatten to `.`-joined names under the
/// prefix; lists are kept as cell values for a later explosion.
///
/// `meta` paths are captured during the descent: a path `[a, b, leaf]`
/// reads `leaf` from the object reached after entering `a` then `b`, and a
/// bare `[leaf]` reads from the record root. Meta columns are unprefixed
/// and named by their `.`-joined path. A missing meta key yields null
/// rather than an error.
///
/// With an empty `record_path` the records themselves are the repeated
/// elements. Records that do not contain the path contribute no rows.
pub fn normalize(records: &[Value], record_path: &[&str], prefix: &str, meta: &[&[&str]]) -> Table {
    let mut out = Table::new();
    for record in records {
        descend(record, record_path, record_path, prefix, meta, &Row::new(), &mut out);
    }
    out
}

fn descend(
    value: &Value,
    full_path: &[&str],
    remaining: &[&str],
    prefix: &str,
    meta: &[&[&str]],
    captured: &Row,
    out: &mut Table,
) {
    // Path segments already consumed; meta paths anchor to these.
    let consumed = &full_path[..full_path.len() - remaining.len()];

    let mut captured = captured.clone();
    if let Value::Object(obj) = value {
        for meta_path in meta {
            let (parents, leaf) = meta_path.split_at(meta_path.len() - 1);
            if parents == consumed {
                let found = obj.get(leaf[0]).cloned().unwrap_or(Value::Null);
                captured.insert(meta_column_name(meta_path), found);
            }
        }
    }

    let Some((head, rest)) = remaining.split_first() else {
        emit(value, prefix, &captured, out);
        return;
    };

    match value {
        Value::Object(obj) => {
            // A record without the path key contributes nothing.
            if let Some(child) = obj.get(*head) {
                descend(child, full_path, rest, prefix, meta, &captured, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                descend(item, full_path, remaining, prefix, meta, &captured, out);
            }
        }
        _ => {}
    }
}

/// Emit rows for the repeated structure found at the end of the path.
fn emit(value: &Value, prefix: &str, captured: &Row, out: &mut Table) {
    match value {
        Value::Array(items) => {
            for item in items {
                emit_one(item, prefix, captured, out);
            }
        }
        other => emit_one(other, prefix, captured, out),
    }
}

fn emit_one(element: &Value, prefix: &str, captured: &Row, out: &mut Table) {
    let mut row = Row::new();
    if let Value::Object(obj) = element {
        flatten_object(obj, prefix, "", &mut row);
    }
    // A non-object element still yields its row of meta columns.
    for (name, value) in captured {
        row.insert(name.clone(), value.clone());
    }
    out.push_row(row);
}

/// Dot-flatten nested objects; lists and scalars become cell values.
fn flatten_object(obj: &Map<String, Value>, prefix: &str, parent: &str, row: &mut Row) {
    for (key, value) in obj {
        let name = if parent.is_empty() {
            key.clone()
        } else {
            format!("{parent}.{key}")
        };
        match value {
            Value::Object(nested) => flatten_object(nested, prefix, &name, row),
            other => {
                row.insert(format!("{prefix}{name}"), other.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_prefix_is_path_derived() {
        assert_eq!(
            record_prefix(&["siteModel", "buildings", "mountingPlanes"]),
            "siteModel_buildings_mountingPlanes_"
        );
        assert_eq!(meta_column_name(&["siteModel", "buildings", "totalRoofArea"]),
            "siteModel.buildings.totalRoofArea");
    }

    #[test]
    fn test_normalize_document_with_nested_meta() {
        let doc = json!({
            "id": "sm-1",
            "version": "v1",
            "siteModel": {
                "buildings": [{
                    "isPrimaryBuilding": true,
                    "mountingPlanes": [
                        {"id": "mp-1", "pitchAngle": 35},
                        {"id": "mp-2", "pitchAngle": 40}
                    ]
                }]
            }
        });

        let table = normalize_document(
            &doc,
            &["siteModel", "buildings", "mountingPlanes"],
            &[&["id"], &["version"], &["siteModel", "buildings", "isPrimaryBuilding"]],
        );

        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "siteModel_buildings_mountingPlanes_id"), "mp-1");
        assert_eq!(table.value(1, "siteModel_buildings_mountingPlanes_pitchAngle"), 40);
        assert_eq!(table.value(0, "id"), "sm-1");
        assert_eq!(table.value(1, "siteModel.buildings.isPrimaryBuilding"), true);
    }

    #[test]
    fn test_nested_objects_flatten_with_dots() {
        let doc = json!({
            "siteModel": {
                "buildings": [{
                    "mountingPlanes": [{
                        "id": "mp-1",
                        "polygon": {
                            "exteriorRing": {"edges": [{"id": "e-1"}]},
                            "interiorRings": []
                        }
                    }]
                }]
            }
        });

        let table = normalize_document(&doc, &["siteModel", "buildings", "mountingPlanes"], &[]);

        assert_eq!(
            table.value(0, "siteModel_buildings_mountingPlanes_polygon.exteriorRing.edges"),
            &json!([{"id": "e-1"}])
        );
        assert!(table.has_column("siteModel_buildings_mountingPlanes_polygon.interiorRings"));
    }

    #[test]
    fn test_meta_captured_at_record_root() {
        let penetrations = vec![
            json!({
                "id": "pen-1",
                "obstructionId": "obs-1",
                "ring": {"edges": [{"id": "pe-1", "length": 2.0}, {"id": "pe-2", "length": 3.0}]}
            }),
        ];

        let table = normalize(
            &penetrations,
            &["ring", "edges"],
            "pens_ring_edges_",
            &[&["id"], &["obstructionId"]],
        );

        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "pens_ring_edges_id"), "pe-1");
        assert_eq!(table.value(1, "pens_ring_edges_length"), 3.0);
        assert_eq!(table.value(0, "id"), "pen-1");
        assert_eq!(table.value(1, "obstructionId"), "obs-1");
    }

    #[test]
    fn test_missing_meta_key_reads_null() {
        let records = vec![json!({"ring": {"edges": [{"id": "e-1"}]}})];
        let table = normalize(&records, &["ring", "edges"], "p_", &[&["obstructionId"]]);

        assert_eq!(table.len(), 1);
        assert!(table.value(0, "obstructionId").is_null());
    }

    #[test]
    fn test_record_without_path_contributes_no_rows() {
        let records = vec![
            json!({"ring": {"edges": [{"id": "e-1"}]}}),
            json!({"noRing": true}),
        ];
        let table = normalize(&records, &["ring", "edges"], "p_", &[]);

        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_column_names_agree_across_documents() {
        let path = &["siteModel", "obstructions"];
        let first = normalize_document(
            &json!({"siteModel": {"obstructions": [{"id": "o-1", "height": 2}]}}),
            path,
            &[&["id"]],
        );
        let second = normalize_document(
            &json!({"siteModel": {"obstructions": [{"id": "o-2", "height": 5}]}}),
            path,
            &[&["id"]],
        );

        assert_eq!(first.columns(), second.columns());
    }
}
