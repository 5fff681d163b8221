//! SQLite storage implementation
//!
//! Columns live in the `entries` table as one row each, the value sequence
//! serialized as a JSON array of strings. SQLite gives us the per-key
//! atomicity the adapter promises: every upsert is its own transaction.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::store::ColumnSnapshot;
use chrono::Utc;
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
    path: String,
}

impl SqliteStorage {
    /// Creates (or reopens) a collect database at the given path
    ///
    /// Used by the collect stage: the file is created if needed and the
    /// schema initialized.
    pub fn create(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Pragmas tuned the same way for every database we own
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            path: path.display().to_string(),
        })
    }

    /// Opens an existing database read-only
    ///
    /// Used by the export stage: no schema is created, and a database that
    /// `collect` never touched fails with [`StorageError::NamespaceMissing`].
    pub fn open(path: &Path) -> StorageResult<Self> {
        if !path.exists() {
            return Err(StorageError::Database(format!(
                "database {} does not exist",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let storage = Self {
            conn,
            path: path.display().to_string(),
        };

        if !storage.has_entries_table()? {
            return Err(StorageError::NamespaceMissing {
                path: storage.path,
            });
        }

        Ok(storage)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            path: ":memory:".to_string(),
        })
    }

    fn has_entries_table(&self) -> StorageResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'entries'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

impl Storage for SqliteStorage {
    fn save_script(&mut self, body: &str, hash: &str) -> StorageResult<()> {
        let saved_at = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO script (id, body, hash, saved_at) VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                body = excluded.body,
                hash = excluded.hash,
                saved_at = excluded.saved_at",
            params![body, hash, saved_at],
        )?;
        Ok(())
    }

    fn save(&mut self, snapshot: &ColumnSnapshot) -> StorageResult<()> {
        for (column, values) in snapshot {
            let values_json =
                serde_json::to_string(values).map_err(|e| StorageError::Serialization {
                    column: column.clone(),
                    message: e.to_string(),
                })?;

            self.conn.execute(
                "INSERT INTO entries (column_name, values_json) VALUES (?1, ?2)
                 ON CONFLICT(column_name) DO UPDATE SET values_json = excluded.values_json",
                params![column, values_json],
            )?;
        }
        Ok(())
    }

    fn load_all(&self) -> StorageResult<ColumnSnapshot> {
        if !self.has_entries_table()? {
            return Err(StorageError::NamespaceMissing {
                path: self.path.clone(),
            });
        }

        let mut stmt = self
            .conn
            .prepare("SELECT column_name, values_json FROM entries")?;

        let mut snapshot = ColumnSnapshot::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (column, values_json) = row?;
            let values: Vec<String> =
                serde_json::from_str(&values_json).map_err(|e| StorageError::Serialization {
                    column: column.clone(),
                    message: e.to_string(),
                })?;
            snapshot.insert(column, values);
        }

        Ok(snapshot)
    }
}
