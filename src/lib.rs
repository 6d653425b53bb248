//! # Siteflat - Site-Model Flattening Toolkit
//!
//! A library for denormalizing hierarchical site-model documents
//! (buildings, mounting planes, polygons, penetrations, obstructions)
//! into flat, joinable tables suitable for analytics.
//!
//! ## Modules
//!
//! - **flatten**: the generic table representation and the
//!   explode-then-normalize engine
//! - **extract**: per-entity traversals producing main and partial tables
//! - **reassemble**: left joins of partial tables back onto main tables
//! - **angles**: pitch/azimuth clamping for the mounting-plane table
//! - **pipeline**: per-document orchestration and run accumulators
//! - **writer**: CSV persistence
//!
//! ## Quick Start
//!
//! ```rust
//! use siteflat::{process_document, OutputTables};
//! use serde_json::json;
//!
//! let document = json!({
//!     "id": "sm-1",
//!     "installationId": "inst-1",
//!     "version": "v1",
//!     "siteModel": {
//!         "buildings": [{
//!             "isPrimaryBuilding": true,
//!             "mountingPlanes": [{
//!                 "id": "mp-1",
//!                 "pitchAngle": 52,
//!                 "azimuthAngle": 175,
//!                 "penetrations": [],
//!                 "polygon": {
//!                     "exteriorRing": {"edges": [{"id": "e-1", "bearing": 45.0}]},
//!                     "interiorRings": []
//!                 }
//!             }]
//!         }]
//!     }
//! });
//!
//! let mut output = OutputTables::new();
//! output.absorb(process_document(&document));
//!
//! assert_eq!(output.mounting_planes.len(), 1);
//! // pitch clamped into the allowed [30, 45] range
//! assert_eq!(
//!     output.mounting_planes.value(0, "siteModel_buildings_mountingPlanes_pitchAngle"),
//!     45.0
//! );
//! ```

pub mod angles;
pub mod error;
pub mod extract;
pub mod flatten;
pub mod pipeline;
pub mod reassemble;
pub mod writer;

// Re-export commonly used types for convenience
pub use angles::normalize_angles;
pub use error::Error;
pub use extract::{
    extract_building_polygon, extract_mounting_planes, extract_obstructions, MountingPlaneTables,
    ObstructionTables,
};
pub use flatten::{flatten, Row, Table};
pub use pipeline::{process_document, DocumentTables, OutputTables};
pub use reassemble::{reassemble_mounting_planes, reassemble_obstructions};
