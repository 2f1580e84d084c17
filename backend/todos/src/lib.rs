//! `simpledo-todos`: persistent to-do collection.
//!
//! The whole task list lives in a single key-value slot as one JSON array.
//! Every mutation is a read-modify-write of that array; there is no partial
//! update path.

pub mod storage;
pub mod store;

pub use storage::{InMemoryStorage, JsonFileStorage, KeyValueStorage, StorageError};
pub use store::{TodoError, TodoStore, TODOS_KEY};
