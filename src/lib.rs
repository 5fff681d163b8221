//! Skrapa: a declarative web-extraction engine
//!
//! This crate runs small TOML scripts that describe a start URL and an
//! ordered pipeline of selector rules. The engine crawls pages, extracts
//! matched values into named columns, persists the columns to an embedded
//! database, and a later invocation exports them as row-aligned CSV or JSON.

pub mod engine;
pub mod export;
pub mod script;
pub mod storage;
pub mod store;

use thiserror::Error;

/// Main error type for Skrapa operations
#[derive(Debug, Error)]
pub enum SkrapaError {
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] engine::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Export error: {0}")]
    Export(#[from] export::ExportError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Script-specific errors
///
/// All of these surface before any fetch occurs: a script that fails to
/// load or validate aborts the run with nothing executed.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to read script file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in script: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Result type alias for Skrapa operations
pub type Result<T> = std::result::Result<T, SkrapaError>;

/// Result type alias for script operations
pub type ScriptResult<T> = std::result::Result<T, ScriptError>;

// Re-export commonly used types
pub use engine::Engine;
pub use export::{export_csv, export_json, reconstruct};
pub use script::{Action, OutputFormat, Rule, Script};
pub use storage::{SqliteStorage, Storage};
pub use store::{ColumnSnapshot, ColumnStore};
