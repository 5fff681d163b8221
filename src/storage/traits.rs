//! Storage trait and error types

use crate::store::ColumnSnapshot;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("No entries namespace in {path}: run `collect` against this database first")]
    NamespaceMissing { path: String },

    #[error("Serialization error for column {column:?}: {message}")]
    Serialization { column: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for persisting and reloading a column store snapshot
///
/// A store is written once per run (repeated saves overwrite column by
/// column) and read back wholesale by the exporter, possibly in a separate
/// process invocation.
pub trait Storage {
    /// Persists the originating script next to the data, for auditability
    ///
    /// Write-only: nothing in this crate reads it back.
    fn save_script(&mut self, body: &str, hash: &str) -> StorageResult<()>;

    /// Persists every column of the snapshot
    ///
    /// Each column is written in its own transaction: a crash mid-save can
    /// lose whole columns, but never leaves a half-written value behind.
    fn save(&mut self, snapshot: &ColumnSnapshot) -> StorageResult<()>;

    /// Reads every persisted column back into a snapshot
    ///
    /// Fails with [`StorageError::NamespaceMissing`] when `save` was never
    /// run against this database.
    fn load_all(&self) -> StorageResult<ColumnSnapshot>;
}
