#![forbid(unsafe_code)]

pub mod kv;
pub mod progress;
pub mod sqlite;

pub use kv::{InMemoryStore, KeyValueStore, StorageError};
pub use progress::{ProgressStore, SLIDE_PROGRESS_KEY, VIDEO_PROGRESS_KEY};
pub use sqlite::{SqliteInitError, SqliteStore};
