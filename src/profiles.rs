//! Configuration profile persistence
//!
//! Save/load/list/delete configuration profiles as JSON files in a profile
//! directory (one `<name>.json` per profile).

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{Configuration, OokError, OokResult};

/// Name of the profile that always exists implicitly and cannot be deleted
pub const DEFAULT_PROFILE: &str = "Default";

/// Sanitize a configuration name to prevent path traversal.
/// Rejects anything with path separators, "..", or empty strings.
fn sanitize_name(name: &str) -> OokResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(OokError::Config("Configuration name cannot be empty".into()));
    }
    if trimmed.contains("..") || trimmed.contains('/') || trimmed.contains('\\') {
        return Err(OokError::Config("Invalid configuration name".into()));
    }
    // Only allow alphanumeric, spaces, hyphens, underscores
    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_')
    {
        return Err(OokError::Config(
            "Configuration name contains invalid characters".into(),
        ));
    }
    Ok(trimmed.to_string())
}

fn profile_path(dir: &Path, name: &str) -> OokResult<PathBuf> {
    let name = sanitize_name(name)?;
    Ok(dir.join(format!("{name}.json")))
}

pub fn save_configuration(dir: &Path, config: &Configuration) -> OokResult<PathBuf> {
    config.timing.validate()?;
    config.tx.validate()?;
    let path = profile_path(dir, &config.name)?;
    fs::create_dir_all(dir)?;
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| OokError::Config(format!("Serialization error: {e}")))?;
    fs::write(&path, json)?;
    log::info!("Saved profile '{}' to {}", config.name, path.display());
    Ok(path)
}

/// Load a profile. A missing "Default" profile falls back to built-in defaults.
pub fn load_configuration(dir: &Path, name: &str) -> OokResult<Configuration> {
    let path = profile_path(dir, name)?;
    if !path.exists() && sanitize_name(name)? == DEFAULT_PROFILE {
        return Ok(Configuration::default());
    }
    let json = fs::read_to_string(&path)?;
    serde_json::from_str(&json)
        .map_err(|e| OokError::Config(format!("Failed to parse profile '{name}': {e}")))
}

/// Saved profile names, sorted. A missing directory holds no profiles.
pub fn list_configurations(dir: &Path) -> OokResult<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            if path.extension()?.to_str()? == "json" {
                path.file_stem()?.to_str().map(String::from)
            } else {
                None
            }
        })
        .collect();
    names.sort();
    Ok(names)
}

pub fn delete_configuration(dir: &Path, name: &str) -> OokResult<()> {
    let name = sanitize_name(name)?;
    if name == DEFAULT_PROFILE {
        return Err(OokError::Config(
            "Cannot delete the Default configuration".into(),
        ));
    }
    let path = profile_path(dir, &name)?;
    if !path.exists() {
        return Err(OokError::Config(format!("Configuration '{name}' not found")));
    }
    fs::remove_file(&path)?;
    Ok(())
}
