//! File logging. The terminal belongs to the UI, so events go to
//! `<data_dir>/todos.log`.

use crate::error::{Result, TodoError};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "todos.log";

/// Installs the global subscriber. Returns the log file path.
pub fn init(level: &str, data_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(data_dir).map_err(|err| TodoError::io(data_dir, err))?;
    let path = data_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|err| TodoError::io(&path, err))?;

    let filter = EnvFilter::try_new(level)
        .map_err(|err| TodoError::Logging(format!("invalid log level `{level}`: {err}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| TodoError::Logging(err.to_string()))?;

    Ok(path)
}
