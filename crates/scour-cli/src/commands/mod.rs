//! CLI command implementations.

pub mod clean;
pub mod detect;
pub mod histogram;

use std::path::Path;

use scour::SessionConfig;

/// Load the session configuration, or the defaults.
pub fn load_config(config: Option<&Path>) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    match config {
        Some(path) => Ok(SessionConfig::from_file(path)?),
        None => Ok(SessionConfig::default()),
    }
}

/// Fail early with a readable message if the input is missing.
pub fn require_file(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    Ok(())
}
