//! Pre-flight checks for a new dependency edge.

use super::DependencyResolver;
use crate::core::task::TaskId;
use crate::error::DependencyRejection;
use crate::{tlog_debug, Result};

/// Outcome of `validate_dependency`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Rejected(DependencyRejection),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    /// Human-readable reason for a rejection.
    pub fn reason(&self) -> Option<String> {
        self.rejection().map(|r| r.to_string())
    }

    pub fn rejection(&self) -> Option<&DependencyRejection> {
        match self {
            Validation::Valid => None,
            Validation::Rejected(rejection) => Some(rejection),
        }
    }

    /// Turn a rejection into an error for callers that prefer `?`.
    ///
    /// A depth rejection becomes `Error::MaxDepthExceeded`, anything else
    /// `Error::InvalidDependency`.
    pub fn into_result(self) -> Result<()> {
        match self {
            Validation::Valid => Ok(()),
            Validation::Rejected(rejection) => Err(rejection.into()),
        }
    }
}

impl DependencyResolver {
    /// Check whether `task_id` may depend on `depends_on`.
    ///
    /// Checks run in order and the first failure wins: both tasks exist,
    /// same project, not a self-reference, no cycle (unless cycles are
    /// allowed), depth within `max_depth`. Nothing is written.
    ///
    /// # Errors
    /// Only repository failures other than a missing task. Every domain
    /// failure is returned as `Validation::Rejected`.
    pub fn validate_dependency(&self, task_id: TaskId, depends_on: TaskId) -> Result<Validation> {
        let _guard = self.lock.lock();

        let verdict = self.check_dependency(task_id, depends_on)?;
        match &verdict {
            Validation::Valid => {
                tlog_debug!("Dependency {} -> {} is valid", task_id, depends_on);
            }
            Validation::Rejected(rejection) => {
                tlog_debug!(
                    "Dependency {} -> {} rejected: {}",
                    task_id,
                    depends_on,
                    rejection
                );
            }
        }
        Ok(verdict)
    }

    fn check_dependency(&self, task_id: TaskId, depends_on: TaskId) -> Result<Validation> {
        let reject = |r: DependencyRejection| -> Result<Validation> { Ok(Validation::Rejected(r)) };

        let Some(task) = self.find_task(task_id)? else {
            return reject(DependencyRejection::TaskNotFound(task_id.to_string()));
        };
        let Some(dependency) = self.find_task(depends_on)? else {
            return reject(DependencyRejection::TaskNotFound(depends_on.to_string()));
        };

        if task.project_id != dependency.project_id {
            return reject(DependencyRejection::CrossProject);
        }

        if task_id == depends_on {
            return reject(DependencyRejection::SelfReference);
        }

        let mut candidate = task.dependencies;
        if !candidate.contains(&depends_on) {
            candidate.push(depends_on);
        }

        if !self.config.allow_cycles && self.would_create_cycle(task_id, &candidate)? {
            return reject(DependencyRejection::WouldCycle);
        }

        let depth = self.dependency_depth(task_id, Some(candidate.as_slice()))?;
        if depth > self.config.max_depth {
            return reject(DependencyRejection::DepthExceeded {
                depth,
                max: self.config.max_depth,
            });
        }

        Ok(Validation::Valid)
    }
}
