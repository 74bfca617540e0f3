//! Configuration loading and parsing

use anyhow::{Context, Result};
use can_catalog::SearchConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// JSON file holding the signal records
    pub records: Option<PathBuf>,
}

/// Load configuration from a TOML file
///
/// A relative `records` path is resolved against the directory holding the
/// configuration file.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    if let (Some(records), Some(dir)) = (&config.catalog.records, path.parent()) {
        if records.is_relative() {
            config.catalog.records = Some(dir.join(records));
        }
    }

    Ok(config)
}
