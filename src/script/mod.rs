//! Script module for Skrapa
//!
//! This module handles loading, parsing, and validating TOML scripts.
//!
//! # Example
//!
//! ```no_run
//! use skrapa::script::load_script;
//! use std::path::Path;
//!
//! let script = load_script(Path::new("script.toml")).unwrap();
//! println!("Crawl starts at: {}", script.main.url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Action, MainConfig, OutputFormat, Rule, Script, TEXT_ATTRIBUTE};

// Re-export parser functions
pub use parser::{compute_script_hash, load_script, load_script_with_hash};

// Re-export validation
pub use validation::validate;

/// User agent sent when the script does not specify one
pub const DEFAULT_USER_AGENT: &str = "Skrapa";
