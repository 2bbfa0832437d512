//! Task repository port.
//!
//! The dependency core never owns task storage. It reads tasks through
//! `TaskRepository` and hands mutated tasks back through `save_task`;
//! durability and write serialization are the implementor's concern.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::core::task::{ProjectId, Task, TaskId};
use crate::{tlog_debug, Error, Result};

/// Read/write access to stored tasks.
pub trait TaskRepository: Send + Sync {
    /// Fetch one task.
    ///
    /// # Errors
    /// Returns `Error::TaskNotFound` if no task has this id.
    fn get_task(&self, id: TaskId) -> Result<Task>;

    /// All tasks of a project, in the order the store keeps them.
    fn get_tasks_by_project(&self, project_id: ProjectId) -> Result<Vec<Task>>;

    /// Persist a task whose dependency list was changed.
    fn save_task(&self, task: &Task) -> Result<()>;
}

#[derive(Default, Serialize, Deserialize)]
struct Snapshot {
    tasks: Vec<Task>,
}

#[derive(Default)]
struct Inner {
    tasks: HashMap<TaskId, Task>,
    /// Insertion order, so project listings are stable.
    order: Vec<TaskId>,
}

/// Map-backed repository for embedding and tests.
///
/// All operations take the internal lock for their duration.
#[derive(Default)]
pub struct InMemoryTaskRepository {
    inner: RwLock<Inner>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository holding `tasks`, in order.
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let repo = Self::new();
        for task in tasks {
            repo.insert(task);
        }
        repo
    }

    /// Insert or replace a task.
    pub fn insert(&self, task: Task) {
        let mut inner = self.inner.write();
        if !inner.tasks.contains_key(&task.id) {
            inner.order.push(task.id);
        }
        inner.tasks.insert(task.id, task);
    }

    pub fn len(&self) -> usize {
        self.inner.read().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().tasks.is_empty()
    }

    /// Load a snapshot written by `save_json`. A missing file is empty.
    pub fn load_json(path: &Path) -> Result<Self> {
        tlog_debug!("InMemoryTaskRepository::load_json path={}", path.display());
        if !path.exists() {
            tlog_debug!("Snapshot not found, returning empty repository");
            return Ok(Self::new());
        }
        let snapshot: Snapshot = serde_json::from_str(&fs::read_to_string(path)?)?;
        tlog_debug!("Snapshot loaded: {} tasks", snapshot.tasks.len());
        Ok(Self::with_tasks(snapshot.tasks))
    }

    /// Write all tasks to `path`, keeping the previous file as `.json.bak`.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let snapshot = {
            let inner = self.inner.read();
            Snapshot {
                tasks: inner
                    .order
                    .iter()
                    .filter_map(|id| inner.tasks.get(id).cloned())
                    .collect(),
            }
        };
        let contents = serde_json::to_string_pretty(&snapshot)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        if path.exists() {
            fs::copy(path, path.with_extension("json.bak"))?;
        }
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &contents)?;
        fs::rename(&temp_path, path)?;
        tlog_debug!(
            "Snapshot saved: {} tasks to {}",
            snapshot.tasks.len(),
            path.display()
        );
        Ok(())
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn get_task(&self, id: TaskId) -> Result<Task> {
        self.inner
            .read()
            .tasks
            .get(&id)
            .cloned()
            .ok_or(Error::TaskNotFound(id))
    }

    fn get_tasks_by_project(&self, project_id: ProjectId) -> Result<Vec<Task>> {
        let inner = self.inner.read();
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.tasks.get(id))
            .filter(|task| task.project_id == project_id)
            .cloned()
            .collect())
    }

    fn save_task(&self, task: &Task) -> Result<()> {
        let mut inner = self.inner.write();
        match inner.tasks.get_mut(&task.id) {
            Some(stored) => {
                *stored = task.clone();
                Ok(())
            }
            None => Err(Error::TaskNotFound(task.id)),
        }
    }
}
