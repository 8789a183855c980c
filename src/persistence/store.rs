//! Storage adapters for the task list.
//!
//! The engine only sees the [`TodoStore`] trait; whether tasks live in a JSON
//! file or in memory is decided by whoever constructs the engine.

use crate::domain::{CompletedTask, Task, TaskKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// Errors raised by a storage adapter
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed task store {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode task store: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Everything that survives a restart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TodosState {
    #[serde(default)]
    pub recurring_tasks: Vec<Task>,
    #[serde(default)]
    pub one_time_tasks: Vec<Task>,
    #[serde(default)]
    pub completed_tasks: Vec<CompletedTask>,
    /// Local date the `time_today` values belong to
    #[serde(default)]
    pub day: Option<NaiveDate>,
}

impl TodosState {
    /// Starter list for a fresh install
    pub fn seeded() -> Self {
        Self {
            recurring_tasks: vec![
                Task::new(1, "Cleaning", TaskKind::recurring()),
                Task::new(2, "Practicing Guitar", TaskKind::recurring()),
            ],
            one_time_tasks: vec![
                Task::new(3, "Finish Project", TaskKind::one_time()),
                Task::new(4, "Read Book", TaskKind::one_time()),
            ],
            completed_tasks: Vec::new(),
            day: None,
        }
    }

    /// Split a flat task list into the persisted buckets
    pub fn from_parts(
        tasks: &[Task],
        completed: &[CompletedTask],
        day: Option<NaiveDate>,
    ) -> Self {
        let (recurring_tasks, one_time_tasks) =
            tasks.iter().cloned().partition(|t| t.is_recurring());
        Self {
            recurring_tasks,
            one_time_tasks,
            completed_tasks: completed.to_vec(),
            day,
        }
    }

    /// All live tasks, recurring first
    pub fn into_tasks(self) -> (Vec<Task>, Vec<CompletedTask>, Option<NaiveDate>) {
        let mut tasks = self.recurring_tasks;
        tasks.extend(self.one_time_tasks);
        (tasks, self.completed_tasks, self.day)
    }
}

/// Storage adapter used by the engine
pub trait TodoStore {
    /// Short label for logs ("json", "memory")
    fn adapter_name(&self) -> &'static str;

    /// Load the persisted state; a store with nothing saved yet returns the seed list
    fn load_todos(&self) -> Result<TodosState, StoreError>;

    fn save_todos(&mut self, state: &TodosState) -> Result<(), StoreError>;
}

/// JSON file store with atomic writes
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Keep a copy of an unreadable file before it gets overwritten
    fn backup_unreadable(&self) {
        let backup = self.path.with_extension(format!(
            "bak.{}.json",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ));
        if let Err(err) = std::fs::copy(&self.path, &backup) {
            tracing::warn!(error = %err, path = %self.path.display(), "Failed to back up task store");
        } else {
            tracing::warn!(backup = %backup.display(), "Backed up unreadable task store");
        }
    }
}

impl TodoStore for JsonStore {
    fn adapter_name(&self) -> &'static str {
        "json"
    }

    fn load_todos(&self) -> Result<TodosState, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(source) => {
                self.backup_unreadable();
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(TodosState::seeded());
        }

        serde_json::from_str(&content).map_err(|source| {
            self.backup_unreadable();
            StoreError::Decode {
                path: self.path.clone(),
                source,
            }
        })
    }

    fn save_todos(&mut self, state: &TodosState) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(state)?;
        super::atomic_write(&self.path, &json).map_err(|err| StoreError::Write {
            path: self.path.clone(),
            message: format!("{:#}", err),
        })
    }
}

/// In-memory store. Clones share the same slot, so a caller can keep a
/// handle to inspect what the engine saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    state: Option<TodosState>,
    saves: usize,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `state`
    pub fn with_state(state: TodosState) -> Self {
        let store = Self::default();
        store.inner.borrow_mut().state = Some(state);
        store
    }

    /// Last saved (or pre-populated) state
    pub fn state(&self) -> Option<TodosState> {
        self.inner.borrow().state.clone()
    }

    pub fn save_count(&self) -> usize {
        self.inner.borrow().saves
    }

    /// Make every subsequent save fail
    pub fn set_fail_saves(&self, fail: bool) {
        self.inner.borrow_mut().fail_saves = fail;
    }
}

impl TodoStore for MemoryStore {
    fn adapter_name(&self) -> &'static str {
        "memory"
    }

    fn load_todos(&self) -> Result<TodosState, StoreError> {
        Ok(self
            .inner
            .borrow()
            .state
            .clone()
            .unwrap_or_else(TodosState::seeded))
    }

    fn save_todos(&mut self, state: &TodosState) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_saves {
            return Err(StoreError::Unavailable("saves disabled".to_string()));
        }
        inner.state = Some(state.clone());
        inner.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_seed_list() {
        let temp_dir = tempdir().unwrap();
        let store = JsonStore::new(temp_dir.path().join("todos.v1.json"));

        let state = store.load_todos().unwrap();
        assert_eq!(state, TodosState::seeded());
        assert_eq!(state.recurring_tasks.len(), 2);
        assert_eq!(state.one_time_tasks[0].name, "Finish Project");
    }

    #[test]
    fn test_json_store_round_trip() {
        let temp_dir = tempdir().unwrap();
        let mut store = JsonStore::new(temp_dir.path().join("todos.v1.json"));

        let mut state = TodosState::seeded();
        state.one_time_tasks[0].start(1_000);
        state.one_time_tasks[0].stop(61_000);
        let done = state.recurring_tasks.remove(0);
        state.completed_tasks.push(CompletedTask::new(done, chrono::Local::now()));
        state.day = NaiveDate::from_ymd_opt(2024, 3, 1);

        store.save_todos(&state).unwrap();
        assert_eq!(store.load_todos().unwrap(), state);
    }

    #[test]
    fn test_malformed_file_is_decode_error_and_backed_up() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("todos.v1.json");
        std::fs::write(&path, "{ broken").unwrap();

        let store = JsonStore::new(&path);
        let err = store.load_todos().unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));

        let backups = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".bak."))
            .count();
        assert_eq!(backups, 1);
    }

    #[test]
    fn test_unreadable_file_is_backed_up_before_overwrite() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("todos.v1.json");
        let bytes = [b'{', 0xFF, 0xFE, b'}'];
        std::fs::write(&path, bytes).unwrap();

        let mut store = JsonStore::new(&path);
        let err = store.load_todos().unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));

        store.save_todos(&TodosState::seeded()).unwrap();

        let backup = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .find(|e| e.file_name().to_string_lossy().contains(".bak."))
            .unwrap();
        assert_eq!(std::fs::read(backup.path()).unwrap(), bytes.to_vec());
    }

    #[test]
    fn test_from_parts_partitions_by_kind() {
        let (tasks, completed, day) = TodosState::seeded().into_tasks();
        let state = TodosState::from_parts(&tasks, &completed, day);
        assert_eq!(state, TodosState::seeded());
    }

    #[test]
    fn test_memory_store_shares_state_between_clones() {
        let store = MemoryStore::new();
        let mut handle = store.clone();

        handle.save_todos(&TodosState::default()).unwrap();
        assert_eq!(store.state(), Some(TodosState::default()));
        assert_eq!(store.save_count(), 1);

        store.set_fail_saves(true);
        assert!(handle.save_todos(&TodosState::seeded()).is_err());
        assert_eq!(store.save_count(), 1);
    }
}
