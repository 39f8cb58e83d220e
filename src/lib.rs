//! Work/Travel to-do lists persisted to a local key-value store, with a
//! terminal front end.

pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod task;
pub mod todo_list;
pub mod ui;

pub use config::Config;
pub use error::{Result, TodoError};
pub use storage::{FileStore, KeyValueStore, MemoryStore, TodoStorage, STORAGE_KEY};
pub use task::{Category, Collection, Task, TaskId};
pub use todo_list::{Confirmation, EditState, TodoList};
