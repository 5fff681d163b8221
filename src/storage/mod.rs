//! Storage module: durable persistence for collected columns
//!
//! The collect stage writes a [`crate::store::ColumnStore`] snapshot plus
//! the originating script into an SQLite database; the export stage reads
//! the snapshot back, usually from a separate process invocation.

mod schema;
mod sqlite;
mod traits;

pub use schema::initialize_schema;
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};
