//! Repository-backed graph walks used by validation.
//!
//! Both walks can substitute a candidate dependency list for the root task,
//! which is how the validator asks "what if this edge existed" without
//! writing anything.

use std::collections::{HashMap, HashSet};

use super::DependencyResolver;
use crate::core::task::TaskId;
use crate::{tlog_trace, Result};

impl DependencyResolver {
    /// Would `root` sit on a cycle if its dependencies were `candidate_dependencies`?
    ///
    /// Depth-first search from `root` keeping the current path; every other
    /// node uses its stored dependency list. Dependency ids with no stored
    /// task are treated as leaves. The walk uses an explicit stack, so long
    /// stored chains cost heap, not call depth.
    pub fn would_create_cycle(
        &self,
        root: TaskId,
        candidate_dependencies: &[TaskId],
    ) -> Result<bool> {
        let _guard = self.lock.lock();
        let candidate = Some(candidate_dependencies);

        let mut visited = HashSet::from([root]);
        let mut on_path = HashSet::from([root]);
        let mut stack = vec![(root, self.edges_of(root, root, candidate)?, 0)];

        while let Some((node, deps, next)) = stack.last_mut() {
            let node = *node;
            if *next == deps.len() {
                on_path.remove(&node);
                stack.pop();
                continue;
            }
            let dep = deps[*next];
            *next += 1;

            if on_path.contains(&dep) {
                tlog_trace!("Back edge {} -> {} closes a cycle", node, dep);
                return Ok(true);
            }
            if visited.insert(dep) {
                on_path.insert(dep);
                stack.push((dep, self.edges_of(dep, root, candidate)?, 0));
            }
        }
        Ok(false)
    }

    /// Length of the longest dependency chain below `root` (0 with no dependencies).
    ///
    /// `override_dependencies` replaces the root's stored list for this call
    /// only. Each node's depth is memoized once fully explored, so diamonds
    /// are counted exactly and each node is expanded once. A node reached
    /// again while still on the current path (a stored cycle) contributes
    /// nothing, which keeps the walk finite.
    pub fn dependency_depth(
        &self,
        root: TaskId,
        override_dependencies: Option<&[TaskId]>,
    ) -> Result<usize> {
        let _guard = self.lock.lock();

        let mut memo: HashMap<TaskId, usize> = HashMap::new();
        let mut on_path = HashSet::from([root]);
        // (node, dependencies, next index, deepest chain seen so far)
        let mut stack = vec![(root, self.edges_of(root, root, override_dependencies)?, 0, 0)];

        while let Some((node, deps, next, best)) = stack.last_mut() {
            if *next == deps.len() {
                let (node, depth) = (*node, *best);
                stack.pop();
                on_path.remove(&node);
                memo.insert(node, depth);
                if let Some((_, _, _, parent_best)) = stack.last_mut() {
                    *parent_best = (*parent_best).max(depth + 1);
                }
                continue;
            }
            let dep = deps[*next];
            *next += 1;

            if let Some(&below) = memo.get(&dep) {
                *best = (*best).max(below + 1);
            } else if on_path.contains(&dep) {
                *best = (*best).max(1);
            } else {
                on_path.insert(dep);
                let deps = self.edges_of(dep, root, override_dependencies)?;
                stack.push((dep, deps, 0, 0));
            }
        }

        Ok(memo.get(&root).copied().unwrap_or_default())
    }

    /// Outgoing dependency edges of `node`, honoring a root override.
    fn edges_of(
        &self,
        node: TaskId,
        root: TaskId,
        root_override: Option<&[TaskId]>,
    ) -> Result<Vec<TaskId>> {
        if node == root {
            if let Some(deps) = root_override {
                return Ok(deps.to_vec());
            }
        }
        Ok(self
            .find_task(node)?
            .map(|task| task.dependencies)
            .unwrap_or_default())
    }
}
