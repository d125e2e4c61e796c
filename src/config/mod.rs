//! Configuration module for Tanker
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

/// Load settings from the first file found, falling back to defaults.
///
/// `TANKER_SETTINGS_PATH` is checked first, then `tanker.yml`,
/// `config/tanker.yml` and the user config directory.
pub fn load() -> Result<Settings> {
    if let Ok(path) = std::env::var("TANKER_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return load_from(&path);
        }
    }

    for path in search_paths() {
        if path.exists() {
            return load_from(&path);
        }
    }

    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}

/// Load settings from a specific file and apply environment overrides
pub fn load_from(path: &std::path::Path) -> Result<Settings> {
    info!("Loading settings from: {}", path.display());
    let mut settings = Settings::from_file(path)?;
    settings.merge_env();
    Ok(settings)
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("tanker.yml"),
        PathBuf::from("config/tanker.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("tanker/tanker.yml"));
    }
    paths
}
