//! Per-document orchestration and cross-document accumulation.
//!
//! Failures are isolated twice over: per document, and per entity type
//! within a document. A mounting-plane extraction that fails still lets
//! the same document's obstructions and building polygons through, and
//! never touches rows accumulated from other documents.

use serde_json::Value;
use tracing::{debug, error};

use crate::angles::normalize_angles;
use crate::error::Error;
use crate::extract::{extract_building_polygon, extract_mounting_planes, extract_obstructions};
use crate::flatten::Table;
use crate::reassemble::{reassemble_mounting_planes, reassemble_obstructions};

/// The three flat tables one document contributes.
#[derive(Debug, Default)]
pub struct DocumentTables {
    pub mounting_planes: Table,
    pub obstructions: Table,
    pub building_polygon: Table,
}

/// Run extraction, reassembly, and angle normalization for one document.
///
/// A failed entity type logs the failure and contributes an empty table;
/// the others still produce output.
pub fn process_document(document: &Value) -> DocumentTables {
    DocumentTables {
        mounting_planes: entity_or_empty("mountingPlanes", mounting_planes_table(document)),
        obstructions: entity_or_empty("obstructions", obstructions_table(document)),
        building_polygon: entity_or_empty("buildingPolygon", extract_building_polygon(document)),
    }
}

fn mounting_planes_table(document: &Value) -> Result<Table, Error> {
    let tables = extract_mounting_planes(document)?;
    let joined = reassemble_mounting_planes(tables)?;
    normalize_angles(&joined)
}

fn obstructions_table(document: &Value) -> Result<Table, Error> {
    let tables = extract_obstructions(document)?;
    reassemble_obstructions(tables)
}

fn entity_or_empty(entity: &str, result: Result<Table, Error>) -> Table {
    match result {
        Ok(table) => {
            debug!(entity, rows = table.len(), "extracted");
            table
        }
        Err(err) => {
            error!(entity, error = %err, "extraction failed, document contributes no rows");
            Table::new()
        }
    }
}

/// Accumulated output of a whole run, one table per entity type.
#[derive(Debug, Default)]
pub struct OutputTables {
    pub mounting_planes: Table,
    pub obstructions: Table,
    pub building_polygon: Table,
}

impl OutputTables {
    pub fn new() -> Self {
        OutputTables::default()
    }

    /// Append one document's tables. Accumulators are only ever appended
    /// to between documents, never rewritten.
    pub fn absorb(&mut self, document: DocumentTables) {
        self.mounting_planes.append(document.mounting_planes);
        self.obstructions.append(document.obstructions);
        self.building_polygon.append(document.building_polygon);
    }

    /// (rows, columns) per table, for the run summary.
    pub fn shapes(&self) -> [(&'static str, usize, usize); 3] {
        [
            (
                "mountingPlanes",
                self.mounting_planes.len(),
                self.mounting_planes.columns().len(),
            ),
            (
                "obstructions",
                self.obstructions.len(),
                self.obstructions.columns().len(),
            ),
            (
                "buildingPolygon",
                self.building_polygon.len(),
                self.building_polygon.columns().len(),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::{AZIMUTH_COL, PITCH_COL};
    use crate::extract::mounting_planes::{
        EXTERIOR_EDGES_COL, GROUP_KEY, INTERIOR_RINGS_COL, PENETRATIONS_COL,
    };
    use serde_json::json;

    fn document(version: &str, plane_id: &str) -> Value {
        json!({
            "id": format!("sm-{plane_id}"),
            "installationId": "inst-1",
            "dateCreated": "2023-04-02T10:00:00Z",
            "version": version,
            "externalSiteModelSourceId": "ext-1",
            "siteModel": {
                "buildings": [{
                    "isPrimaryBuilding": true,
                    "totalRoofArea": 100.0,
                    "mountingPlanes": [{
                        "id": plane_id,
                        "pitchAngle": 50,
                        "azimuthAngle": 10,
                        "penetrations": [],
                        "polygon": {
                            "exteriorRing": {"edges": [{"id": "ee-1", "bearing": 45.0}]},
                            "interiorRings": []
                        }
                    }],
                    "polygon": {
                        "exteriorRing": {"edges": [{"id": "be-1", "bearing": 0.0}]}
                    }
                }],
                "obstructions": [{
                    "id": "obs-1",
                    "ring": {"edges": [{"id": "oe-1", "length": 2.0}]}
                }]
            }
        })
    }

    #[test]
    fn test_single_plane_document_end_to_end() {
        let tables = process_document(&document("v1", "mp-1"));
        let planes = &tables.mounting_planes;

        assert_eq!(planes.len(), 1);
        assert_eq!(planes.value(0, PITCH_COL), 45.0);
        assert_eq!(planes.value(0, AZIMUTH_COL), 90.0);
        assert_eq!(
            planes.value(0, "siteModel_buildings_mountingPlanes_polygon_exteriorRing_edges_id"),
            "ee-1"
        );
        // no penetrations, no interior ring: their columns read null
        assert!(planes
            .value(0, "siteModel_buildings_mountingPlanes_penetrations_ring_edges_id")
            .is_null());
        assert!(planes
            .value(0, "siteModel_buildings_mountingPlanes_polygon.interiorRings_edges_bearing")
            .is_null());
        // nested-list columns do not leak into the output
        assert!(!planes.has_column(PENETRATIONS_COL));
        assert!(!planes.has_column(EXTERIOR_EDGES_COL));
        assert!(!planes.has_column(INTERIOR_RINGS_COL));

        assert_eq!(tables.obstructions.len(), 1);
        assert_eq!(
            tables.obstructions.value(0, "siteModel_obstructions_edges_id"),
            "oe-1"
        );
        assert_eq!(tables.building_polygon.len(), 1);
    }

    #[test]
    fn test_empty_penetrations_leave_main_row_intact() {
        let tables = process_document(&document("v2", "mp-7"));
        let planes = &tables.mounting_planes;

        assert_eq!(planes.len(), 1);
        assert_eq!(planes.value(0, GROUP_KEY), "mp-7");
    }

    #[test]
    fn test_unsupported_version_contributes_nothing() {
        let tables = process_document(&document("v4", "mp-1"));

        assert!(tables.mounting_planes.is_empty());
        assert!(tables.obstructions.is_empty());
        assert!(tables.building_polygon.is_empty());
    }

    #[test]
    fn test_bad_document_does_not_poison_accumulators() {
        let mut output = OutputTables::new();
        output.absorb(process_document(&document("v1", "mp-1")));
        output.absorb(process_document(&document("v4", "mp-2")));
        output.absorb(process_document(&document("v3", "mp-3")));

        assert_eq!(output.mounting_planes.len(), 2);
        let ids: Vec<_> = output.mounting_planes.column_values(GROUP_KEY).collect();
        assert_eq!(ids, [&json!("mp-1"), &json!("mp-3")]);
        assert_eq!(output.obstructions.len(), 2);
        assert_eq!(output.building_polygon.len(), 2);
    }

    #[test]
    fn test_shapes_summary() {
        let mut output = OutputTables::new();
        output.absorb(process_document(&document("v1", "mp-1")));

        let [planes, obstructions, polygon] = output.shapes();
        assert_eq!(planes.0, "mountingPlanes");
        assert_eq!(planes.1, 1);
        assert!(planes.2 > 0);
        assert_eq!(obstructions.1, 1);
        assert_eq!(polygon.1, 1);
    }
}
