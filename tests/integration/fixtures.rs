//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - Building tasks with dependency lists
//! - Predefined task sets (chain, diamond, ring)
//! - A resolver harness over an in-memory repository
//! - A repository whose backend fails for chosen ids

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use taskdeps::{
    DependencyConfig, DependencyResolver, Error, InMemoryTaskRepository, ProjectId, Result, Task,
    TaskId, TaskRepository,
};

pub const PROJECT: ProjectId = ProjectId(1);

/// Create a pending task in `PROJECT` depending on `deps`.
pub fn test_task(id: i64, deps: &[i64]) -> Task {
    let mut task = Task::new(TaskId(id), PROJECT, &format!("task-{}", id));
    for dep in deps {
        task.add_dependency(TaskId(*dep));
    }
    task
}

/// Chain 1 <- 2 <- 3: each task depends on the previous one.
pub fn chain_tasks() -> Vec<Task> {
    vec![test_task(1, &[]), test_task(2, &[1]), test_task(3, &[2])]
}

/// Diamond: 2 and 3 depend on 1, 4 depends on 2 and 3.
///
/// ```text
///     1
///    / \
///   2   3
///    \ /
///     4
/// ```
pub fn diamond_tasks() -> Vec<Task> {
    vec![
        test_task(1, &[]),
        test_task(2, &[1]),
        test_task(3, &[1]),
        test_task(4, &[2, 3]),
    ]
}

/// Ring 1 -> 2 -> 3 -> 1, as it would look if validation had been bypassed.
pub fn ring_tasks() -> Vec<Task> {
    vec![test_task(1, &[2]), test_task(2, &[3]), test_task(3, &[1])]
}

/// Index of `id` in an execution order.
pub fn position(order: &[TaskId], id: i64) -> usize {
    order
        .iter()
        .position(|t| *t == TaskId(id))
        .unwrap_or_else(|| panic!("task {} missing from order {:?}", id, order))
}

/// Resolver plus the repository it reads, for inspecting writes.
pub struct ResolverHarness {
    pub repo: Arc<InMemoryTaskRepository>,
    pub resolver: DependencyResolver,
}

impl ResolverHarness {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self::with_config(tasks, DependencyConfig::default())
    }

    pub fn with_config(tasks: Vec<Task>, config: DependencyConfig) -> Self {
        let repo = Arc::new(InMemoryTaskRepository::with_tasks(tasks));
        let resolver = DependencyResolver::new(repo.clone(), config);
        Self { repo, resolver }
    }
}

/// Backend error message used by `UnreliableRepository`.
pub const BACKEND_DOWN: &str = "db down";

/// In-memory repository whose backend is unreachable for some ids.
///
/// `get_task` on an id in `unreachable` returns `Error::Repository`, and
/// `save_task` fails while `fail_saves` is set. Project listings succeed.
pub struct UnreliableRepository {
    inner: InMemoryTaskRepository,
    unreachable: HashSet<TaskId>,
    fail_saves: AtomicBool,
}

impl UnreliableRepository {
    pub fn new(tasks: Vec<Task>, unreachable: &[i64]) -> Self {
        Self {
            inner: InMemoryTaskRepository::with_tasks(tasks),
            unreachable: unreachable.iter().map(|id| TaskId(*id)).collect(),
            fail_saves: AtomicBool::new(false),
        }
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Read past the failure, for asserting what was stored.
    pub fn stored(&self, id: i64) -> Task {
        self.inner.get_task(TaskId(id)).unwrap()
    }
}

impl TaskRepository for UnreliableRepository {
    fn get_task(&self, id: TaskId) -> Result<Task> {
        if self.unreachable.contains(&id) {
            return Err(Error::Repository(BACKEND_DOWN.to_string()));
        }
        self.inner.get_task(id)
    }

    fn get_tasks_by_project(&self, project_id: ProjectId) -> Result<Vec<Task>> {
        self.inner.get_tasks_by_project(project_id)
    }

    fn save_task(&self, task: &Task) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::Repository(BACKEND_DOWN.to_string()));
        }
        self.inner.save_task(task)
    }
}

/// Resolver over an `UnreliableRepository`.
pub fn unreliable_resolver(
    tasks: Vec<Task>,
    unreachable: &[i64],
) -> (Arc<UnreliableRepository>, DependencyResolver) {
    let repo = Arc::new(UnreliableRepository::new(tasks, unreachable));
    let resolver = DependencyResolver::new(repo.clone(), DependencyConfig::default());
    (repo, resolver)
}
