//! Obstruction extraction: ring-edge geometry per obstruction.

use serde_json::Value;
use tracing::warn;

use crate::error::Error;
use crate::extract::ensure_supported_version;
use crate::flatten::{flatten, normalize_document, Table};

/// Grouping key: one value per obstruction.
pub const GROUP_KEY: &str = "siteModel_obstructions_id";

/// Nested-list column of the main table, dropped again after reassembly.
pub const RING_EDGES_COL: &str = "siteModel_obstructions_ring.edges";

const RECORD_PATH: [&str; 2] = ["siteModel", "obstructions"];
const META: [&[&str]; 5] = [
    &["id"],
    &["installationId"],
    &["dateCreated"],
    &["version"],
    &["externalSiteModelSourceId"],
];
const EDGES_PREFIX: &str = "siteModel_obstructions_edges_";

/// Output of the obstruction extractor, ready for reassembly.
#[derive(Debug, Default)]
pub struct ObstructionTables {
    pub ring_edges: Table,
    pub main: Table,
}

/// Extract the obstruction main table and its ring-edge partial table.
pub fn extract_obstructions(document: &Value) -> Result<ObstructionTables, Error> {
    ensure_supported_version(document)?;

    let mut main = normalize_document(document, &RECORD_PATH, &META);
    main.normalize_missing();

    let mut tables = ObstructionTables {
        main,
        ..Default::default()
    };
    if tables.main.is_empty() {
        return Ok(tables);
    }

    for (obstruction_id, group) in tables.main.group_by(GROUP_KEY) {
        if !group.column_all_present(RING_EDGES_COL) {
            continue;
        }
        match flatten(&group, RING_EDGES_COL, &[], &[]) {
            Ok(partial) if partial.is_empty() => {}
            Ok(mut partial) => {
                partial.add_prefix(EDGES_PREFIX);
                partial.insert_key_column(GROUP_KEY, &obstruction_id);
                tables.ring_edges.append(partial);
            }
            Err(error) => {
                warn!(%error, field = RING_EDGES_COL, "skipping malformed nested field");
            }
        }
    }

    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_document() -> Value {
        json!({
            "id": "sm-3",
            "installationId": "inst-3",
            "dateCreated": "2023-06-11T08:30:00Z",
            "version": "v1",
            "externalSiteModelSourceId": "ext-3",
            "siteModel": {
                "obstructions": [
                    {
                        "id": "obs-1",
                        "height": 2.5,
                        "ring": {"edges": [
                            {"id": "oe-1", "length": 1.0},
                            {"id": "oe-2", "length": 1.5}
                        ]}
                    },
                    {
                        "id": "obs-2",
                        "height": 1.0,
                        "ring": {"edges": []}
                    }
                ]
            }
        })
    }

    #[test]
    fn test_main_table_one_row_per_obstruction() {
        let tables = extract_obstructions(&sample_document()).unwrap();

        assert_eq!(tables.main.len(), 2);
        assert_eq!(tables.main.value(0, GROUP_KEY), "obs-1");
        assert_eq!(tables.main.value(1, "siteModel_obstructions_height"), 1.0);
        assert_eq!(tables.main.value(0, "installationId"), "inst-3");
    }

    #[test]
    fn test_ring_edges_flattened_per_group() {
        let tables = extract_obstructions(&sample_document()).unwrap();
        let edges = &tables.ring_edges;

        // obs-2 has an empty ring and contributes nothing
        assert_eq!(edges.len(), 2);
        assert_eq!(edges.columns()[0], GROUP_KEY);
        assert!(edges.column_values(GROUP_KEY).all(|v| v == "obs-1"));
        assert_eq!(edges.value(0, "siteModel_obstructions_edges_id"), "oe-1");
        assert_eq!(edges.value(1, "siteModel_obstructions_edges_length"), 1.5);
    }

    #[test]
    fn test_document_without_obstructions() {
        let doc = json!({
            "id": "sm-4",
            "version": "v3",
            "siteModel": {"obstructions": []}
        });

        let tables = extract_obstructions(&doc).unwrap();
        assert!(tables.main.is_empty());
        assert!(tables.ring_edges.is_empty());
    }

    #[test]
    fn test_unsupported_version_is_fatal() {
        let mut doc = sample_document();
        doc["version"] = json!("2.0");

        assert!(matches!(
            extract_obstructions(&doc),
            Err(Error::UnsupportedVersion { .. })
        ));
    }
}
