//! CSV serialization of reconstructed rows

use crate::export::{reconstruct, ExportResult};
use crate::store::ColumnSnapshot;
use std::path::Path;

/// Exports a snapshot as CSV: a header row of column names, then one row
/// per record in the same column order
///
/// Quoting and escaping are the csv crate's RFC-4180 defaults. Nothing is
/// written when reconstruction fails.
pub fn export_csv(data: &ColumnSnapshot, path: &Path) -> ExportResult<()> {
    let rows = reconstruct(data)?;

    let mut writer = ::csv::Writer::from_path(path)?;
    writer.write_record(&rows.keys)?;
    for record in &rows.records {
        writer.write_record(record)?;
    }
    writer.flush()?;

    tracing::info!("Exported CSV: {}", path.display());
    Ok(())
}
