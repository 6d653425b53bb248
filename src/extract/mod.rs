//! Entity extractors - fixed traversals from a site-model document to
//! partial and main tables
//!
//! Each extractor declares its traversal path, carried meta fields,
//! grouping key, and column rename map as constants, validates the
//! document's version tag, and drives the generic flattener over its
//! nested fields.

pub mod building_polygon;
pub mod mounting_planes;
pub mod obstructions;

pub use building_polygon::extract_building_polygon;
pub use mounting_planes::{extract_mounting_planes, MountingPlaneTables};
pub use obstructions::{extract_obstructions, ObstructionTables};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::Error;

// Downstream column semantics are version-dependent.
static SUPPORTED_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^v[1-3]$").unwrap());

/// Reject documents whose version tag is not v1, v2 or v3.
pub fn ensure_supported_version(document: &Value) -> Result<(), Error> {
    let found = document
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if SUPPORTED_VERSION.is_match(found) {
        return Ok(());
    }
    Err(Error::UnsupportedVersion {
        found: found.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_supported_versions_pass() {
        for tag in ["v1", "v2", "v3"] {
            assert!(ensure_supported_version(&json!({"version": tag})).is_ok());
        }
    }

    #[test]
    fn test_unsupported_versions_fail() {
        for doc in [
            json!({"version": "v4"}),
            json!({"version": "V1"}),
            json!({"version": 1}),
            json!({}),
        ] {
            let err = ensure_supported_version(&doc).unwrap_err();
            assert!(matches!(err, Error::UnsupportedVersion { .. }));
        }
    }
}
