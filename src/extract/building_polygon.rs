//! Building-polygon extraction: exterior-ring edges per building.
//!
//! The innermost repeated entity here is already the edge, so there is no
//! grouping or reassembly step; the normalizer's output is the final table.

use serde_json::Value;

use crate::error::Error;
use crate::extract::ensure_supported_version;
use crate::flatten::{normalize_document, Table};

const RECORD_PATH: [&str; 5] = ["siteModel", "buildings", "polygon", "exteriorRing", "edges"];
const META: [&[&str]; 2] = [&["id"], &["installationId"]];

/// Extract one row per building exterior-ring edge.
pub fn extract_building_polygon(document: &Value) -> Result<Table, Error> {
    ensure_supported_version(document)?;
    Ok(normalize_document(document, &RECORD_PATH, &META))
}
