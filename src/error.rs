//! Error types shared by the store, the manager and the binary.

use crate::task::TaskId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TodoError {
    /// Reading or writing the backing store failed.
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored blob is not a valid to-do collection.
    #[error("stored value under `{key}` is not a valid to-do collection: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize to-do collection: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("configuration error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("no task with id {0}")]
    UnknownTask(TaskId),

    #[error("no free task id left")]
    IdsExhausted,

    #[error("could not determine a data directory; pass --data-dir")]
    NoDataDir,

    #[error("failed to set up logging: {0}")]
    Logging(String),
}

impl TodoError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TodoError>;
