//! JSON serialization of reconstructed rows

use crate::export::{reconstruct, ExportResult};
use crate::store::ColumnSnapshot;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Exports a snapshot as a JSON array of flat string-to-string objects
///
/// Keys appear in sorted order in every object, matching the CSV header
/// order. Nothing is written when reconstruction fails.
pub fn export_json(data: &ColumnSnapshot, path: &Path) -> ExportResult<()> {
    let rows = reconstruct(data)?;

    let objects: Vec<BTreeMap<&str, &str>> = rows
        .records
        .iter()
        .map(|record| {
            rows.keys
                .iter()
                .map(String::as_str)
                .zip(record.iter().map(String::as_str))
                .collect()
        })
        .collect();

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &objects)?;
    writer.flush()?;

    tracing::info!("Exported JSON: {}", path.display());
    Ok(())
}
