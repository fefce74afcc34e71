pub mod schema;

pub use schema::{
    AuthConfig, CatalogConfig, FilterConfig, HttpConfig, HubConfig, HubLimits, OpenApiSource,
};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default toolhub home directory (~/.toolhub).
pub fn default_home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".toolhub"))
        .unwrap_or_else(|| PathBuf::from(".toolhub"))
}

/// Default config file location (~/.toolhub/toolhub.toml).
pub fn default_config_path() -> PathBuf {
    default_home_dir().join("toolhub.toml")
}

/// Load config from the given path, or return defaults when it does not
/// exist.
pub fn load_config(path: &Path) -> Result<HubConfig> {
    if !path.exists() {
        return Ok(HubConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("Invalid TOML in config {}", path.display()))
}

/// Write config as TOML, creating parent directories as needed.
pub fn save_config(config: &HubConfig, path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config {}", path.display()))
}
