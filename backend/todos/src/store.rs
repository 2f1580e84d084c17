use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};

use simpledo_core::{Task, TaskDraft, TaskView, ValidationError};

use crate::storage::{KeyValueStorage, StorageError};

/// Slot holding the serialized task collection.
pub const TODOS_KEY: &str = "simpleDo.todos";

#[derive(Debug, Error)]
pub enum TodoError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("a task with id '{0}' already exists")]
    DuplicateId(String),
}

/// Owned handle to the persisted task collection.
///
/// Reads and writes always go through the storage slot. Consumers that only
/// need to display tasks use [`TodoStore::snapshot`], a cached immutable copy
/// that is updated only when someone calls [`TodoStore::refresh`].
pub struct TodoStore {
    storage: Box<dyn KeyValueStorage>,
    key: String,
    cache: RwLock<Arc<[Task]>>,
}

impl TodoStore {
    /// Open the store on the default slot and load the first snapshot.
    pub fn open(storage: impl KeyValueStorage + 'static) -> Result<Self, TodoError> {
        Self::open_with_key(storage, TODOS_KEY)
    }

    pub fn open_with_key(
        storage: impl KeyValueStorage + 'static,
        key: impl Into<String>,
    ) -> Result<Self, TodoError> {
        let store = Self {
            storage: Box::new(storage),
            key: key.into(),
            cache: RwLock::new(Arc::from(Vec::new())),
        };
        store.refresh()?;
        Ok(store)
    }

    /// Every task in insertion order, read fresh from storage.
    pub fn list_all(&self) -> Result<Vec<Task>, TodoError> {
        let Some(raw) = self.storage.read(&self.key)? else {
            return Ok(Vec::new());
        };
        let tasks = serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            key: self.key.clone(),
            source,
        })?;
        Ok(tasks)
    }

    /// Replace the whole collection.
    pub fn save_all(&self, tasks: &[Task]) -> Result<(), TodoError> {
        let raw = serde_json::to_string(tasks).map_err(|source| StorageError::Corrupt {
            key: self.key.clone(),
            source,
        })?;
        self.storage.write(&self.key, &raw)?;
        debug!(count = tasks.len(), "Saved task collection");
        Ok(())
    }

    /// Append a task. Ids must stay unique within the collection.
    pub fn add(&self, task: Task) -> Result<(), TodoError> {
        let mut tasks = self.list_all()?;
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(TodoError::DuplicateId(task.id));
        }
        info!(id = %task.id, title = %task.title, "Adding task");
        tasks.push(task);
        self.save_all(&tasks)
    }

    /// Validate a draft, give it a fresh id and append it.
    pub fn create(
        &self,
        draft: TaskDraft,
        today: NaiveDate,
        max_due_days: u32,
    ) -> Result<Task, TodoError> {
        let task = draft.into_task(today, max_due_days)?;
        self.add(task.clone())?;
        Ok(task)
    }

    /// Replace the task with the same id in place.
    ///
    /// Returns `false` (and writes nothing) when no task has that id.
    pub fn update(&self, task: Task) -> Result<bool, TodoError> {
        let mut tasks = self.list_all()?;
        let Some(slot) = tasks.iter_mut().find(|t| t.id == task.id) else {
            debug!(id = %task.id, "Update skipped: no such task");
            return Ok(false);
        };
        *slot = task;
        self.save_all(&tasks)?;
        Ok(true)
    }

    /// Drop the task with this id. Removing an absent id is a no-op.
    pub fn remove(&self, id: &str) -> Result<bool, TodoError> {
        let mut tasks = self.list_all()?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Ok(false);
        }
        self.save_all(&tasks)?;
        info!(id = %id, "Removed task");
        Ok(true)
    }

    pub fn find(&self, id: &str) -> Result<Option<Task>, TodoError> {
        Ok(self.list_all()?.into_iter().find(|t| t.id == id))
    }

    /// Flip `completed` on one task, returning the updated record.
    pub fn toggle(&self, id: &str) -> Result<Option<Task>, TodoError> {
        let Some(mut task) = self.find(id)? else {
            return Ok(None);
        };
        task.completed = !task.completed;
        self.update(task.clone())?;
        Ok(Some(task))
    }

    /// Reload the cached snapshot from storage and return it.
    pub fn refresh(&self) -> Result<Arc<[Task]>, TodoError> {
        let fresh: Arc<[Task]> = Arc::from(self.list_all()?);
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        *cache = Arc::clone(&fresh);
        Ok(fresh)
    }

    /// The last refreshed collection. May be stale after a mutation.
    pub fn snapshot(&self) -> Arc<[Task]> {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*cache)
    }

    /// Tasks from the cached snapshot that belong in `view`.
    pub fn view(&self, view: TaskView) -> Vec<Task> {
        let snapshot = self.snapshot();
        view.apply(&snapshot).into_iter().cloned().collect()
    }
}
