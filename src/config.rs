//! User settings read from `config.toml`.
//!
//! Every key is optional; a missing file means defaults throughout.

use crate::host::router::GroupDeletePolicy;
use crate::models::{DEFAULT_COMMAND_SEPARATOR, StorageManager};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an alternate config file
pub const CONFIG_ENV: &str = "TERMSNIP_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding `snippets.json` and `groups.json`
    pub data_dir: Option<PathBuf>,
    pub command_separator: String,
    /// Shell used for the terminal session; `$SHELL` when unset
    pub shell: Option<String>,
    pub group_delete_policy: GroupDeletePolicy,
    /// Send a trailing newline so the command runs immediately
    pub auto_run: bool,
    /// Editor for confirming `isEdit` snippets; `$EDITOR` when unset
    pub editor: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            command_separator: DEFAULT_COMMAND_SEPARATOR.to_string(),
            shell: None,
            group_delete_policy: GroupDeletePolicy::default(),
            auto_run: true,
            editor: None,
        }
    }
}

impl Settings {
    /// Load from `$TERMSNIP_CONFIG`, else `<config_dir>/termsnip/config.toml`
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs::config_dir().map(|dir| dir.join("termsnip").join("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn storage(&self) -> Result<StorageManager> {
        match &self.data_dir {
            Some(dir) => Ok(StorageManager::with_data_dir(dir)),
            None => StorageManager::new(),
        }
    }

    pub fn shell_program(&self) -> String {
        self.shell
            .clone()
            .or_else(|| std::env::var("SHELL").ok())
            .filter(|shell| !shell.trim().is_empty())
            .unwrap_or_else(|| "sh".to_string())
    }
}
