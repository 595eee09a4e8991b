//! Client configuration storage

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

/// Persistent client settings; the session itself lives in a separate
/// file owned by the session store.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the EMS API, including the `/api` prefix.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
        }
    }
}

fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "ems-cli", "ems-cli").map(|p| p.config_dir().to_path_buf())
}

/// Where the session store persists credentials, when the platform
/// offers a config directory at all.
pub fn session_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("session.toml"))
}

impl ClientConfig {
    /// Load configuration, falling back to defaults when no config
    /// directory or file exists.
    pub fn load() -> Result<Self> {
        let Some(dir) = config_dir() else {
            return Ok(Self::default());
        };
        let path = dir.join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<()> {
        let dir = config_dir().context("Could not determine config directory")?;
        fs::create_dir_all(&dir).context("Failed to create config directory")?;

        let path = dir.join("config.toml");
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content).context("Failed to write config file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, perms).context("Failed to set config permissions")?;
        }

        Ok(())
    }
}
