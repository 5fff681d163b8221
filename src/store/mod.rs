//! Column store: the in-memory accumulator for extracted values
//!
//! Every `collect` rule appends into a named column. Columns only ever
//! grow; values keep the exact order the collect events occurred in. One
//! store is owned by exactly one engine run and is handed off to the
//! persistence layer when the run finishes.

use std::collections::{BTreeMap, HashMap};

/// A point-in-time copy of the store, sorted by column name
///
/// The sorted keys are what make persistence order, export headers, and
/// JSON key order deterministic across runs.
pub type ColumnSnapshot = BTreeMap<String, Vec<String>>;

/// Append-only, column-oriented accumulator of extracted strings
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ColumnStore {
    columns: HashMap<String, Vec<String>>,
}

impl ColumnStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value to the named column, creating the column on first use
    pub fn append(&mut self, column: &str, value: String) {
        self.columns.entry(column.to_string()).or_default().push(value);
    }

    /// Returns a sorted, owned copy of the store for persistence
    pub fn snapshot(&self) -> ColumnSnapshot {
        self.columns
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Total number of collected values across all columns
    pub fn value_count(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    /// True when nothing has been collected
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
