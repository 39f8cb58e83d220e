//! User configuration read from `config.toml`.

use crate::error::{Result, TodoError};
use crate::task::Category;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "todos";
pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the to-do blob and the log file live.
    pub data_dir: Option<PathBuf>,
    /// `tracing` filter directive, e.g. `info` or `todos=debug`.
    pub log_level: String,
    /// List shown on startup.
    pub default_category: Category,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            default_category: Category::Work,
        }
    }
}

impl Config {
    /// `~/.config/todos/config.toml` or the platform equivalent.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Loads `explicit` when given (it must exist), otherwise the default
    /// location if present, otherwise built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| TodoError::io(path, err))?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|err| TodoError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Configured data directory, falling back to the platform data dir.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|p| p.join(APP_DIR))
                .ok_or(TodoError::NoDataDir),
        }
    }
}
