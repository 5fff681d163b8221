use crate::script::types::Script;
use crate::script::validation::validate;
use crate::ScriptError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads, parses, and validates a script file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML script file
///
/// # Returns
///
/// * `Ok(Script)` - Successfully loaded and validated script
/// * `Err(ScriptError)` - Failed to load, parse, or validate the script
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use skrapa::script::load_script;
///
/// let script = load_script(Path::new("script.toml")).unwrap();
/// println!("Entry point: {}", script.main.url);
/// ```
pub fn load_script(path: &Path) -> Result<Script, ScriptError> {
    // Read the script file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let script: Script = toml::from_str(&content)?;

    // Validate the script
    validate(&script)?;

    Ok(script)
}

/// Computes a SHA-256 hash of the script file content
///
/// The hash is stored alongside the collected data so a database can be
/// traced back to the exact script text that produced it.
pub fn compute_script_hash(path: &Path) -> Result<String, ScriptError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a script and returns it together with its raw text and hash
///
/// The raw text and hash are what the persistence layer writes into the
/// database's script namespace for auditability.
pub fn load_script_with_hash(path: &Path) -> Result<(Script, String, String), ScriptError> {
    let content = std::fs::read_to_string(path)?;
    let script: Script = toml::from_str(&content)?;
    validate(&script)?;

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let hash = hex::encode(hasher.finalize());

    Ok((script, content, hash))
}
