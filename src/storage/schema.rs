//! Database schema definitions
//!
//! Two namespaces, mirroring the collect/export split: `entries` holds one
//! row per column (the JSON-serialized value sequence), `script` holds the
//! script that produced the data. Keeping the script in its own table means
//! it can never collide with a column name.

/// SQL schema for a collect database
pub const SCHEMA_SQL: &str = r#"
-- One row per collected column
CREATE TABLE IF NOT EXISTS entries (
    column_name TEXT PRIMARY KEY,
    values_json TEXT NOT NULL
);

-- The script that produced this database, for auditing only.
-- Never read back by the engine or the exporter.
CREATE TABLE IF NOT EXISTS script (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    body TEXT NOT NULL,
    hash TEXT NOT NULL,
    saved_at TEXT NOT NULL
);
"#;

/// Initializes the schema on a fresh or existing database
pub fn initialize_schema(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
