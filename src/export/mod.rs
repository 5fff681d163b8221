//! Export module: row reconstruction and serialization
//!
//! Collected data is stored column-oriented; consumers want rows. This
//! module transposes a loaded snapshot into aligned records and writes
//! them as CSV or JSON. Column order is decided exactly once, from the
//! snapshot's sorted keys, so identical data always serializes to
//! identical bytes.

mod csv;
mod json;

pub use self::csv::export_csv;
pub use self::json::export_json;

use crate::store::ColumnSnapshot;
use thiserror::Error;

/// Errors that can occur while exporting
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data collected")]
    EmptyDataset,

    #[error("Column {column:?} has {actual} values where {expected} were expected; collect rules fired unevenly across pages")]
    RaggedColumns {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("CSV write error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Column-oriented data transposed into aligned rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSet {
    /// Column names, sorted; also the CSV header
    pub keys: Vec<String>,
    /// One entry per record, values in `keys` order
    pub records: Vec<Vec<String>>,
}

/// Transposes a snapshot into rows
///
/// Every column must hold the same number of values: a pipeline whose
/// collect rules fired unevenly across pages produced data that cannot be
/// aligned, and that is an error rather than a silent truncation. An empty
/// snapshot means there is nothing to export at all.
pub fn reconstruct(data: &ColumnSnapshot) -> ExportResult<RowSet> {
    let mut columns = data.iter();

    let (_, first_values) = match columns.next() {
        Some(entry) => entry,
        None => return Err(ExportError::EmptyDataset),
    };

    // The first column sets the expectation; which column is the "wrong"
    // one cannot be known from here
    let row_count = first_values.len();
    for (key, values) in columns {
        if values.len() != row_count {
            return Err(ExportError::RaggedColumns {
                column: key.clone(),
                expected: row_count,
                actual: values.len(),
            });
        }
    }

    let keys: Vec<String> = data.keys().cloned().collect();
    let mut records = Vec::with_capacity(row_count);
    for i in 0..row_count {
        let record: Vec<String> = keys.iter().map(|k| data[k][i].clone()).collect();
        records.push(record);
    }

    Ok(RowSet { keys, records })
}
