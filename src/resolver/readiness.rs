//! Readiness checks a scheduler runs right before dispatch.

use super::DependencyResolver;
use crate::core::task::{ProjectId, Task, TaskId, TaskStatus};
use crate::{tlog, tlog_warn, Result};

impl DependencyResolver {
    /// Can `task_id` run now?
    ///
    /// True when every dependency is completed. A failed dependency counts
    /// as satisfied only when `fail_on_dependency_error` is off. A
    /// dependency that cannot be fetched makes the task not ready.
    ///
    /// # Errors
    /// Repository errors for `task_id` itself.
    pub fn is_task_ready(&self, task_id: TaskId) -> Result<bool> {
        let _guard = self.lock.lock();
        let task = self.repo.get_task(task_id)?;
        Ok(self.dependencies_satisfied(&task))
    }

    /// Pending or ready tasks of a project held back by an unmet dependency.
    ///
    /// Running and finished tasks are never reported, whatever their
    /// dependencies look like.
    pub fn get_blocked_tasks(&self, project_id: ProjectId) -> Result<Vec<TaskId>> {
        let _guard = self.lock.lock();
        Ok(self
            .repo
            .get_tasks_by_project(project_id)?
            .iter()
            .filter(|task| task.status.is_pre_execution() && task.has_dependencies())
            .filter(|task| !self.dependencies_satisfied(task))
            .map(|task| task.id)
            .collect())
    }

    /// Pending or ready tasks of a project that may be dispatched now.
    pub fn get_ready_tasks(&self, project_id: ProjectId) -> Result<Vec<TaskId>> {
        let _guard = self.lock.lock();
        Ok(self
            .repo
            .get_tasks_by_project(project_id)?
            .iter()
            .filter(|task| task.status.is_pre_execution())
            .filter(|task| self.dependencies_satisfied(task))
            .map(|task| task.id)
            .collect())
    }

    fn dependencies_satisfied(&self, task: &Task) -> bool {
        for dep_id in task.dependencies() {
            let dependency = match self.repo.get_task(*dep_id) {
                Ok(dependency) => dependency,
                Err(e) => {
                    tlog_warn!(
                        "Task {} not ready: dependency {} unavailable ({})",
                        task.id,
                        dep_id,
                        e
                    );
                    return false;
                }
            };

            match dependency.status {
                TaskStatus::Completed => {}
                TaskStatus::Failed => {
                    if self.config.fail_on_dependency_error {
                        tlog!("Task {} blocked by failed dependency {}", task.id, dep_id);
                        return false;
                    }
                }
                TaskStatus::Pending
                | TaskStatus::Ready
                | TaskStatus::Running
                | TaskStatus::Blocked
                | TaskStatus::Cancelled
                | TaskStatus::Retrying => return false,
            }
        }
        true
    }
}
