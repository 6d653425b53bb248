//! siteflat: flatten site-model JSON documents into joinable CSV tables
//!
//! Usage:
//!   # Process a directory of site-model documents
//!   siteflat roof_models/
//!
//!   # Choose where the CSV tables land
//!   siteflat roof_models/ --output-dir outputfiles
//!
//!   # Turn on per-entity debug logging
//!   siteflat roof_models/ --log siteflat=debug

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use siteflat::writer::write_output_dir;
use siteflat::{process_document, OutputTables};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "siteflat")]
#[command(about = "Flatten site-model JSON documents into joinable CSV tables", long_about = None)]
struct Args {
    /// Directory containing site-model JSON documents
    #[arg(value_name = "DIR")]
    input_dir: PathBuf,

    /// Output directory for the CSV tables
    #[arg(long, short = 'o', default_value = "outputfiles")]
    output_dir: PathBuf,

    /// Log filter, e.g. "info" or "siteflat=debug"
    #[arg(long, default_value = "info")]
    log: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log))
        .init();

    let mut documents: Vec<PathBuf> = std::fs::read_dir(&args.input_dir)
        .with_context(|| format!("Failed to read input directory {}", args.input_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    documents.sort();

    let mut output = OutputTables::new();
    for path in &documents {
        match read_document(path) {
            Ok(document) => {
                info!(path = %path.display(), "processing document");
                output.absorb(process_document(&document));
            }
            Err(err) => {
                // one unreadable document must not stop the run
                error!(path = %path.display(), error = %err, "skipping unreadable document");
            }
        }
    }

    write_output_dir(&output, &args.output_dir)?;

    for (table, rows, columns) in output.shapes() {
        info!(table, rows, columns, "wrote table");
    }
    info!(
        documents = documents.len(),
        output_dir = %args.output_dir.display(),
        "run complete"
    );
    Ok(())
}

/// Parse one document, trying SIMD-accelerated parsing first and falling
/// back to serde_json on pathological input.
fn read_document(path: &Path) -> Result<Value> {
    let content = std::fs::read(path).context("Failed to read file")?;

    let mut simd_buffer = content.clone();
    match simd_json::to_owned_value(&mut simd_buffer) {
        Ok(parsed) => {
            let json_str = simd_json::to_string(&parsed)?;
            let value: Value = serde_json::from_str(&json_str)?;
            Ok(value)
        }
        Err(_) => {
            let value: Value =
                serde_json::from_slice(&content).context("Failed to parse JSON")?;
            Ok(value)
        }
    }
}
