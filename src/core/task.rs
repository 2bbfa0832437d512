//! Task data model seen by the dependency core.
//!
//! Tasks are owned by an external store; the core only reads identity,
//! project, status and the dependency list, and mutates the list through
//! `add_dependency` / `remove_dependency`.

use serde::{Deserialize, Serialize};

/// Unique identifier for a task. Immutable once assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Project a task belongs to. Dependencies never cross projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub i64);

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task status in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Created, not yet scheduled.
    #[default]
    Pending,
    /// Eligible for dispatch.
    Ready,
    /// Being executed by an agent.
    Running,
    /// Held back by a breakpoint or an unmet condition.
    Blocked,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
    /// Abandoned before completion.
    Cancelled,
    /// Failed once and queued for another attempt.
    Retrying,
}

impl TaskStatus {
    /// Only a completed dependency unblocks its dependents unconditionally.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }

    /// The task has not been dispatched yet.
    pub fn is_pre_execution(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Ready)
    }

    /// Marker used when rendering dependency trees.
    pub fn glyph(&self) -> &'static str {
        if self.is_satisfied() {
            "✓"
        } else {
            "○"
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Ready => "ready",
            TaskStatus::Running => "running",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Retrying => "retrying",
        };
        write!(f, "{}", s)
    }
}

/// A unit of work and the tasks it waits on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    /// Tasks that must complete before this one may run, in insertion order.
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
}

impl Task {
    /// Create a pending task with no dependencies.
    pub fn new(id: TaskId, project_id: ProjectId, title: &str) -> Self {
        Self {
            id,
            project_id,
            title: title.to_string(),
            status: TaskStatus::Pending,
            dependencies: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn dependencies(&self) -> &[TaskId] {
        &self.dependencies
    }

    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }

    pub fn depends_on(&self, id: TaskId) -> bool {
        self.dependencies.contains(&id)
    }

    /// Append a dependency. Returns `false` if it was already present.
    pub fn add_dependency(&mut self, id: TaskId) -> bool {
        if self.depends_on(id) {
            return false;
        }
        self.dependencies.push(id);
        true
    }

    /// Drop a dependency. Returns `false` if it was not present.
    pub fn remove_dependency(&mut self, id: TaskId) -> bool {
        let before = self.dependencies.len();
        self.dependencies.retain(|dep| *dep != id);
        self.dependencies.len() != before
    }
}
