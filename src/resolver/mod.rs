//! Dependency resolution for the task scheduler.
//!
//! The `DependencyResolver` answers the questions a scheduler asks before
//! dispatching work to an agent: may this edge be added, in what order can
//! a project's tasks run, which tasks are ready, which are blocked. It
//! keeps no graph state between calls; every query re-reads the
//! repository.

mod readiness;
mod traversal;
mod validator;
mod visualize;

pub use validator::Validation;

use parking_lot::ReentrantMutex;
use std::sync::Arc;

use crate::config::{Config, DependencyConfig};
use crate::core::graph::DependencyGraph;
use crate::core::task::{ProjectId, Task, TaskId};
use crate::repository::TaskRepository;
use crate::{tlog, tlog_debug, tlog_error, Error, Result};

/// Validates, orders and inspects task dependencies.
///
/// Every public method holds one reentrant lock for its whole body. The
/// lock guards this resolver's own computation only; two resolvers over
/// the same store are not serialized against each other.
///
/// # Example
/// ```ignore
/// let repo = Arc::new(InMemoryTaskRepository::new());
/// let resolver = DependencyResolver::new(repo, DependencyConfig::default());
/// if resolver.validate_dependency(TaskId(4), TaskId(3))?.is_valid() {
///     resolver.add_dependency(TaskId(4), TaskId(3))?;
/// }
/// let order = resolver.get_execution_order(ProjectId(1), false)?;
/// ```
pub struct DependencyResolver {
    repo: Arc<dyn TaskRepository>,
    config: DependencyConfig,
    lock: ReentrantMutex<()>,
}

impl DependencyResolver {
    pub fn new(repo: Arc<dyn TaskRepository>, config: DependencyConfig) -> Self {
        Self {
            repo,
            config,
            lock: ReentrantMutex::new(()),
        }
    }

    /// Create a resolver reading the `dependencies.*` keys of `config`.
    pub fn from_config(repo: Arc<dyn TaskRepository>, config: &Config) -> Self {
        Self::new(repo, DependencyConfig::from_config(config))
    }

    pub fn config(&self) -> &DependencyConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<dyn TaskRepository> {
        &self.repo
    }

    /// Order a project's tasks so every dependency runs before its dependents.
    ///
    /// Completed tasks are left out unless `include_completed` is set; a
    /// completed task still appears when a remaining task depends on it.
    /// Ties among simultaneously ready tasks are broken arbitrarily.
    ///
    /// # Errors
    /// Returns `Error::CircularDependency` when the stored edges contain a
    /// cycle.
    pub fn get_execution_order(
        &self,
        project_id: ProjectId,
        include_completed: bool,
    ) -> Result<Vec<TaskId>> {
        let _guard = self.lock.lock();
        let tasks = self.repo.get_tasks_by_project(project_id)?;
        let order = DependencyGraph::from_tasks(&tasks, include_completed).execution_order()?;
        tlog_debug!(
            "Execution order for project {}: {} tasks",
            project_id,
            order.len()
        );
        Ok(order)
    }

    /// Tasks in the same project that directly depend on `task_id`.
    pub fn get_dependents(&self, task_id: TaskId) -> Result<Vec<TaskId>> {
        let _guard = self.lock.lock();
        let task = self.repo.get_task(task_id)?;
        Ok(self
            .repo
            .get_tasks_by_project(task.project_id)?
            .iter()
            .filter(|t| t.depends_on(task_id))
            .map(|t| t.id)
            .collect())
    }

    /// Validate and persist a new edge `task_id -> depends_on`.
    ///
    /// Returns `false` if the edge already existed.
    ///
    /// # Errors
    /// - `Error::MaxDepthExceeded` if the edge would make the chain too deep
    /// - `Error::InvalidDependency` for every other rejection
    /// - repository errors from the final write
    pub fn add_dependency(&self, task_id: TaskId, depends_on: TaskId) -> Result<bool> {
        let _guard = self.lock.lock();
        self.validate_dependency(task_id, depends_on)?.into_result()?;

        let mut task = self.repo.get_task(task_id)?;
        if !task.add_dependency(depends_on) {
            return Ok(false);
        }
        if let Err(e) = self.repo.save_task(&task) {
            tlog_error!(
                "Validated dependency {} -> {} could not be saved: {}",
                task_id,
                depends_on,
                e
            );
            return Err(e);
        }
        tlog!("Dependency added: task {} now depends on {}", task_id, depends_on);
        Ok(true)
    }

    /// Remove and persist the edge `task_id -> depends_on`.
    ///
    /// Returns `false` if there was no such edge.
    pub fn remove_dependency(&self, task_id: TaskId, depends_on: TaskId) -> Result<bool> {
        let _guard = self.lock.lock();
        let mut task = self.repo.get_task(task_id)?;
        if !task.remove_dependency(depends_on) {
            return Ok(false);
        }
        self.repo.save_task(&task)?;
        tlog!(
            "Dependency removed: task {} no longer depends on {}",
            task_id,
            depends_on
        );
        Ok(true)
    }

    /// Fetch a task, mapping "not found" to `None`.
    fn find_task(&self, id: TaskId) -> Result<Option<Task>> {
        match self.repo.get_task(id) {
            Ok(task) => Ok(Some(task)),
            Err(Error::TaskNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for DependencyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyResolver")
            .field("config", &self.config)
            .finish()
    }
}
