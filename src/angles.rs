//! Angle normalization for the mounting-plane table.
//!
//! Pitch and azimuth values arrive from upstream modelling tools outside
//! their physically sensible ranges; both columns are coerced to floating
//! point and clamped. The transform is pure and row-independent: row
//! count, order, and every other column pass through untouched, and
//! re-applying it is a no-op.

use serde_json::Value;

use crate::error::Error;
use crate::flatten::Table;

pub const PITCH_COL: &str = "siteModel_buildings_mountingPlanes_pitchAngle";
pub const AZIMUTH_COL: &str = "siteModel_buildings_mountingPlanes_azimuthAngle";

const PITCH_RANGE: (f64, f64) = (30.0, 45.0);
const AZIMUTH_RANGE: (f64, f64) = (90.0, 270.0);

/// Clamp pitch angles into [30, 45] and azimuth angles into [90, 270].
///
/// Values are coerced to floating point first; a value that cannot be
/// read as a number is a fatal [`Error::NumericCoercion`] for the
/// document, since silently dropping it would desynchronize the joined
/// rows. Null cells stay null.
pub fn normalize_angles(table: &Table) -> Result<Table, Error> {
    let mut out = table.clone();
    clamp_column(&mut out, PITCH_COL, PITCH_RANGE)?;
    clamp_column(&mut out, AZIMUTH_COL, AZIMUTH_RANGE)?;
    Ok(out)
}

fn clamp_column(table: &mut Table, column: &str, (low, high): (f64, f64)) -> Result<(), Error> {
    if !table.has_column(column) {
        return Ok(());
    }
    table.try_map_column(column, |value| {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let angle = coerce_f64(value).ok_or_else(|| Error::NumericCoercion {
            column: column.to_string(),
            value: value.to_string(),
        })?;
        Ok(Value::from(angle.clamp(low, high)))
    })
}

fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|x| x.is_finite())
}
