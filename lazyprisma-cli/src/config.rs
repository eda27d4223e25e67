//! Application configuration
//!
//! Defaults live in code; `~/.config/lazyprisma/config.toml` overrides them.
//! A missing file is not an error; a commented default file is written on
//! first run.

use crate::error::CliError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const CONFIG_DIR_NAME: &str = "lazyprisma";
const CONFIG_FILE: &str = "config.toml";

fn default_spinner_interval_ms() -> u64 {
    50
}

fn default_studio_warmup_ms() -> u64 {
    2000
}

fn default_studio_url() -> String {
    "http://localhost:5555".to_string()
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Spinner frame advance interval in milliseconds
    #[serde(default = "default_spinner_interval_ms")]
    pub spinner_interval_ms: u64,

    /// How long to wait after launching Studio before reporting it running
    #[serde(default = "default_studio_warmup_ms")]
    pub studio_warmup_ms: u64,

    /// The URL Studio listens on
    #[serde(default = "default_studio_url")]
    pub studio_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            spinner_interval_ms: default_spinner_interval_ms(),
            studio_warmup_ms: default_studio_warmup_ms(),
            studio_url: default_studio_url(),
        }
    }
}

impl AppConfig {
    /// Config directory (`~/.config/lazyprisma`)
    pub fn config_dir() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config").join(CONFIG_DIR_NAME))
    }

    /// Full path of the config file
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    /// Load the config file, falling back to defaults when it is absent
    pub fn load() -> Result<Self, CliError> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| CliError::Config(e.to_string()))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(CliError::Config(err.to_string())),
        }
    }

    /// Write the config file
    pub fn save(&self) -> Result<(), CliError> {
        let Some(dir) = Self::config_dir() else {
            return Err(CliError::Config("home directory not set".to_string()));
        };
        std::fs::create_dir_all(&dir)?;
        let content = toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))?;
        std::fs::write(dir.join(CONFIG_FILE), content)?;
        Ok(())
    }

    /// Create the config file with commented defaults when it does not exist
    pub fn ensure_config_file() -> Result<(), CliError> {
        let Some(dir) = Self::config_dir() else {
            return Ok(());
        };
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            return Ok(());
        }

        let default_config = "\
# lazyprisma configuration

# Spinner frame advance interval in milliseconds
spinner_interval_ms = 50

# How long to wait after launching Studio before reporting it running
studio_warmup_ms = 2000

# The URL Studio listens on
studio_url = \"http://localhost:5555\"
";
        std::fs::write(path, default_config)?;
        Ok(())
    }

    pub fn spinner_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.spinner_interval_ms)
    }

    pub fn studio_warmup(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.studio_warmup_ms)
    }
}
