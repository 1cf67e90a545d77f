use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{client::DEFAULT_PROXY_URL, history::DEFAULT_MAX_HISTORY, model::Coordinates};

fn default_proxy_url() -> String {
    DEFAULT_PROXY_URL.to_string()
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

/// Dashboard configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// proxy_url = "http://127.0.0.1:8888"
/// max_history = 5
///
/// [home_location]
/// lat = 51.5072
/// lon = -0.1276
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the proxy serving `/weather` and `/forecast`.
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,

    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Position reported when the user asks for local weather.
    #[serde(default)]
    pub home_location: Option<Coordinates>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy_url: default_proxy_url(),
            max_history: default_max_history(),
            home_location: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.proxy_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow!(
                "Invalid proxy_url '{}': expected an http:// or https:// URL.\n\
                 Hint: run `skyview configure` to fix it.",
                self.proxy_url
            ));
        }

        if self.max_history == 0 {
            return Err(anyhow!("max_history must be at least 1"));
        }

        if let Some(at) = self.home_location {
            if !(-90.0..=90.0).contains(&at.lat) || !(-180.0..=180.0).contains(&at.lon) {
                return Err(anyhow!(
                    "home_location ({}, {}) is out of range",
                    at.lat,
                    at.lon
                ));
            }
        }

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "skyview", "skyview")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding persisted client state (search history).
    pub fn data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }
}
