use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::AnidexError;
use crate::playlist::RenamePolicy;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
///
/// A user file only needs the keys it changes; anything it leaves out comes
/// from the built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub playlists: PlaylistsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout; 0 leaves it to the transport.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistsConfig {
    pub rename_policy: RenamePolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides the default database location.
    pub path: Option<PathBuf>,
}

impl AppConfig {
    /// Load config: user file if it exists, otherwise built-in defaults.
    pub fn load() -> Result<Self, AnidexError> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path, falling back to defaults when absent.
    pub fn load_from(path: &Path) -> Result<Self, AnidexError> {
        if path.exists() {
            let user_str = std::fs::read_to_string(path)?;
            tracing::debug!(path = %path.display(), "loading user config");
            Self::parse(&user_str)
        } else {
            Self::parse(DEFAULT_CONFIG)
        }
    }

    pub fn parse(s: &str) -> Result<Self, AnidexError> {
        toml::from_str(s).map_err(|e| AnidexError::Config(e.to_string()))
    }

    /// Save current config to the given file.
    pub fn save_to(&self, path: &Path) -> Result<(), AnidexError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AnidexError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the storage database, honouring `[storage] path`.
    pub fn db_path(&self) -> PathBuf {
        if let Some(ref path) = self.storage.path {
            return path.clone();
        }
        Self::project_dirs()
            .map(|d| d.data_dir().join("anidex.db"))
            .unwrap_or_else(|| PathBuf::from("anidex.db"))
    }

    /// Ensure the data directory exists and return the DB path.
    pub fn ensure_db_path(&self) -> Result<PathBuf, AnidexError> {
        let path = self.db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "anidex")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        AppConfig::default().api
    }
}

impl Default for PlaylistsConfig {
    fn default() -> Self {
        AppConfig::default().playlists
    }
}
