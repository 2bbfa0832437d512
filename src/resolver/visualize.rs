//! ASCII dependency trees for operators.

use std::collections::HashSet;

use super::DependencyResolver;
use crate::core::task::{ProjectId, Task, TaskId};
use crate::{Error, Result};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";
const INDENT: &str = "  ";
const MISSING: &str = "✗";

/// A task whose dependency lines are being written.
struct Frame {
    id: TaskId,
    dependencies: Vec<TaskId>,
    next: usize,
    prefix: String,
}

impl DependencyResolver {
    /// Render the dependency tree of one task, or of every task in a project.
    ///
    /// ```text
    /// Task 5: Release
    ///   ├── ○ Task 4: Wire API [pending]
    ///   │   ├── ✓ Task 2: Schema [completed]
    ///   │   │   └── ✓ Task 1: Setup [completed]
    ///   │   └── ○ Task 3: Models [running]
    ///   └── ✓ Task 2: Schema [completed] (shown above)
    /// ```
    ///
    /// A dependency that cannot be fetched is shown with ✗ and the rest of
    /// the tree still renders. Each task is expanded once per tree; later
    /// occurrences are marked `(shown above)`, and a task already on the
    /// current branch is marked `(cycle)`.
    ///
    /// # Errors
    /// Repository errors for the selected task or the project listing.
    pub fn visualize_dependencies(
        &self,
        project_id: ProjectId,
        task_id: Option<TaskId>,
    ) -> Result<String> {
        let _guard = self.lock.lock();

        let roots = match task_id {
            Some(id) => vec![self.repo.get_task(id)?],
            None => self.repo.get_tasks_by_project(project_id)?,
        };
        if roots.is_empty() {
            return Ok(format!("No tasks in project {}\n", project_id));
        }

        let mut out = String::new();
        for (i, task) in roots.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            self.render_tree(task, &mut out);
        }
        Ok(out)
    }

    fn render_tree(&self, root: &Task, out: &mut String) {
        out.push_str(&format!("Task {}: {}\n", root.id, root.title));

        let mut expanded = HashSet::from([root.id]);
        let mut stack = vec![Frame {
            id: root.id,
            dependencies: root.dependencies.clone(),
            next: 0,
            prefix: INDENT.to_string(),
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.next == frame.dependencies.len() {
                stack.pop();
                continue;
            }
            let dep_id = frame.dependencies[frame.next];
            frame.next += 1;
            let last = frame.next == frame.dependencies.len();
            let head = format!("{}{}", frame.prefix, if last { LAST_BRANCH } else { BRANCH });
            let child_prefix = format!("{}{}", frame.prefix, if last { SPACE } else { PIPE });

            let dependency = match self.repo.get_task(dep_id) {
                Ok(dependency) => dependency,
                Err(Error::TaskNotFound(_)) => {
                    out.push_str(&format!("{}{} Task {}: not found\n", head, MISSING, dep_id));
                    continue;
                }
                Err(e) => {
                    out.push_str(&format!("{}{} Task {}: {}\n", head, MISSING, dep_id, e));
                    continue;
                }
            };

            out.push_str(&format!(
                "{}{} Task {}: {} [{}]",
                head,
                dependency.status.glyph(),
                dependency.id,
                dependency.title,
                dependency.status
            ));
            if stack.iter().any(|f| f.id == dependency.id) {
                out.push_str(" (cycle)\n");
            } else if !expanded.insert(dependency.id) {
                if dependency.has_dependencies() {
                    out.push_str(" (shown above)");
                }
                out.push('\n');
            } else {
                out.push('\n');
                stack.push(Frame {
                    id: dependency.id,
                    dependencies: dependency.dependencies,
                    next: 0,
                    prefix: child_prefix,
                });
            }
        }
    }
}
