//! Mounting-plane extraction: one main table plus up to three partial
//! tables of ring-edge geometry per document.

use serde_json::Value;
use tracing::warn;

use crate::error::Error;
use crate::extract::ensure_supported_version;
use crate::flatten::{flatten, normalize_document, Table};

/// Grouping key: one value per mounting plane.
pub const GROUP_KEY: &str = "siteModel_buildings_mountingPlanes_id";

/// Nested-list columns of the main table, dropped again after reassembly.
pub const PENETRATIONS_COL: &str = "siteModel_buildings_mountingPlanes_penetrations";
pub const EXTERIOR_EDGES_COL: &str = "siteModel_buildings_mountingPlanes_polygon.exteriorRing.edges";
pub const INTERIOR_RINGS_COL: &str = "siteModel_buildings_mountingPlanes_polygon.interiorRings";

const RECORD_PATH: [&str; 3] = ["siteModel", "buildings", "mountingPlanes"];
const META: [&[&str]; 7] = [
    &["id"],
    &["installationId"],
    &["dateCreated"],
    &["version"],
    &["externalSiteModelSourceId"],
    &["siteModel", "buildings", "isPrimaryBuilding"],
    &["siteModel", "buildings", "totalRoofArea"],
];

// Canonical, fully qualified names for the generic fields the nested
// structures expose. The prefixed edge-level id is ambiguous with the
// penetration id carried as meta and is dropped in its favor.
const PEN_EDGE_ID: &str = "siteModel_buildings_mountingPlanes_penetrations_ring_edges_id";
const PEN_EDGE_OBSTRUCTION_ID: &str =
    "siteModel_buildings_mountingPlanes_penetrations_ring_edges_obstructionId";
const EXTERIOR_PREFIX: &str = "siteModel_buildings_mountingPlanes_polygon_exteriorRing_edges_";
const INTERIOR_WINDING: &str =
    "siteModel_buildings_mountingPlanes_polygon_interiorRing_edges_windingDirection";

/// Output of the mounting-plane extractor, ready for reassembly.
#[derive(Debug, Default)]
pub struct MountingPlaneTables {
    pub penetration_edges: Table,
    pub interior_ring_edges: Table,
    pub exterior_ring_edges: Table,
    pub main: Table,
}

/// Extract the mounting-plane main table and its partial tables.
///
/// The main table has one row per mounting plane with the identifying
/// document fields and building ancestors attached. Each plane group then
/// contributes a partial table per nested field, but only when the field
/// is present for every row in the group.
pub fn extract_mounting_planes(document: &Value) -> Result<MountingPlaneTables, Error> {
    ensure_supported_version(document)?;

    let mut main = normalize_document(document, &RECORD_PATH, &META);
    main.normalize_missing();

    let mut tables = MountingPlaneTables {
        main,
        ..Default::default()
    };

    for (plane_id, group) in tables.main.group_by(GROUP_KEY) {
        if group.column_all_present(PENETRATIONS_COL) {
            if let Some(mut partial) = flatten_or_warn(
                &group,
                PENETRATIONS_COL,
                &["ring", "edges"],
                &[&["id"], &["obstructionId"]],
            ) {
                partial.drop_columns(&[PEN_EDGE_ID]);
                partial.rename_column("id", PEN_EDGE_ID);
                partial.rename_column("obstructionId", PEN_EDGE_OBSTRUCTION_ID);
                partial.insert_key_column(GROUP_KEY, &plane_id);
                tables.penetration_edges.append(partial);
            }
        }

        if group.column_all_present(EXTERIOR_EDGES_COL) {
            if let Some(mut partial) = flatten_or_warn(&group, EXTERIOR_EDGES_COL, &[], &[]) {
                partial.add_prefix(EXTERIOR_PREFIX);
                partial.insert_key_column(GROUP_KEY, &plane_id);
                tables.exterior_ring_edges.append(partial);
            }
        }

        if group.column_all_present(INTERIOR_RINGS_COL) {
            if let Some(mut partial) =
                flatten_or_warn(&group, INTERIOR_RINGS_COL, &["edges"], &[&["windingDirection"]])
            {
                partial.rename_column("windingDirection", INTERIOR_WINDING);
                partial.insert_key_column(GROUP_KEY, &plane_id);
                tables.interior_ring_edges.append(partial);
            }
        }
    }

    Ok(tables)
}

/// Best-effort flattening: a malformed nested field costs its own partial
/// table, never the document.
fn flatten_or_warn(
    group: &Table,
    field: &str,
    record_path: &[&str],
    meta: &[&[&str]],
) -> Option<Table> {
    match flatten(group, field, record_path, meta) {
        Ok(partial) if partial.is_empty() => None,
        Ok(partial) => Some(partial),
        Err(error) => {
            warn!(%error, field, "skipping malformed nested field");
            None
        }
    }
}
