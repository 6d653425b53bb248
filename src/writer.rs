//! CSV persistence of accumulated output tables.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::flatten::Table;
use crate::pipeline::OutputTables;

/// Write one table as CSV: header row in column order, null cells empty,
/// any remaining nested value JSON-encoded.
pub fn write_table<W: Write>(table: &Table, writer: W) -> Result<()> {
    if table.columns().is_empty() {
        // nothing to describe, not even a header
        return Ok(());
    }
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(table.columns())
        .context("Failed to write CSV header")?;
    for index in 0..table.len() {
        let record: Vec<String> = table
            .columns()
            .iter()
            .map(|column| cell_text(table.value(index, column)))
            .collect();
        csv.write_record(&record)
            .context("Failed to write CSV row")?;
    }
    csv.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

/// Persist the run's three tables into a directory.
pub fn write_output_dir<P: AsRef<Path>>(tables: &OutputTables, dir: P) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).context("Failed to create output directory")?;

    let artifacts = [
        ("mountingPlanes.csv", &tables.mounting_planes),
        ("obstructions.csv", &tables.obstructions),
        ("buildingPolygon.csv", &tables.building_polygon),
    ];
    for (filename, table) in artifacts {
        let path = dir.join(filename);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_table(table, file).with_context(|| format!("Failed to write {filename}"))?;
    }
    Ok(())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        nested => serde_json::to_string(nested).unwrap_or_default(),
    }
}
