//! Reassembly - join partial tables back onto their entity's main table.
//!
//! Joins are natural left joins on explicitly declared keys. The shared
//! column set of each join is validated against the declared key first; a
//! surprise shared column would silently corrupt the join and is treated
//! as a contract violation, not recovered.

use crate::error::Error;
use crate::extract::mounting_planes::{
    EXTERIOR_EDGES_COL, INTERIOR_RINGS_COL, PENETRATIONS_COL,
};
use crate::extract::{mounting_planes, obstructions, MountingPlaneTables, ObstructionTables};
use crate::flatten::Table;

/// Join the mounting-plane partial tables onto the main table.
///
/// Exterior and interior ring edges never coexist for the same plane, so
/// they are combined by concatenation before the join. The penetration
/// partial joins last. The nested-list columns the partials were derived
/// from are dropped from the result.
pub fn reassemble_mounting_planes(tables: MountingPlaneTables) -> Result<Table, Error> {
    let MountingPlaneTables {
        penetration_edges,
        interior_ring_edges,
        mut exterior_ring_edges,
        main,
    } = tables;

    exterior_ring_edges.append(interior_ring_edges);
    let with_rings = checked_left_join(&main, &exterior_ring_edges, mounting_planes::GROUP_KEY)?;
    let mut joined = checked_left_join(&with_rings, &penetration_edges, mounting_planes::GROUP_KEY)?;

    joined.drop_columns(&[PENETRATIONS_COL, EXTERIOR_EDGES_COL, INTERIOR_RINGS_COL]);
    Ok(joined)
}

/// Join the obstruction ring-edge partial onto the main table.
pub fn reassemble_obstructions(tables: ObstructionTables) -> Result<Table, Error> {
    let mut joined = checked_left_join(&tables.main, &tables.ring_edges, obstructions::GROUP_KEY)?;
    joined.drop_columns(&[obstructions::RING_EDGES_COL]);
    Ok(joined)
}

/// Left join after validating that the tables share exactly the declared
/// key. An empty partial skips the join; the main table passes through
/// with no row lost or gained.
fn checked_left_join(main: &Table, partial: &Table, key: &str) -> Result<Table, Error> {
    if partial.is_empty() {
        return Ok(main.clone());
    }
    let shared = main.shared_columns(partial);
    if shared != [key] {
        return Err(Error::JoinKeyMismatch {
            expected: vec![key.to_string()],
            found: shared,
        });
    }
    Ok(main.left_join(partial, &[key]))
}
