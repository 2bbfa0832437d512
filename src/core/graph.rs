//! Ephemeral dependency graph used for execution ordering.
//!
//! A `DependencyGraph` is rebuilt from repository task lists on every
//! query and dropped afterwards. Edges point from a dependency to the task
//! that depends on it, so a topological walk yields dependencies first.

use crate::core::task::{Task, TaskId};
use crate::error::{Error, Result};
use crate::{tlog_debug, tlog_warn};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};

/// Number of ids reported when a cycle exists but no explicit loop was found.
const CYCLE_FALLBACK_LEN: usize = 3;

/// Adjacency view over a set of tasks.
///
/// Every id mentioned by a task, including dependency ids whose tasks are
/// not part of the input, becomes a node so in-degrees stay consistent.
pub struct DependencyGraph {
    /// Nodes are task ids; an edge `a -> b` means `b` depends on `a`.
    graph: DiGraph<TaskId, ()>,
    /// Index mapping from TaskId to NodeIndex for fast lookups.
    node_index: HashMap<TaskId, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
        }
    }

    /// Build the view for a task list.
    ///
    /// With `include_completed == false`, completed tasks contribute no
    /// node or edges of their own; they still appear as nodes when another
    /// task in the list names them as a dependency.
    pub fn from_tasks(tasks: &[Task], include_completed: bool) -> Self {
        let mut graph = Self::new();
        for task in tasks {
            if !include_completed && task.status.is_satisfied() {
                continue;
            }
            graph.add_node(task.id);
            for dep in task.dependencies() {
                graph.add_edge(*dep, task.id);
            }
        }
        tlog_debug!(
            "DependencyGraph built: nodes={}, edges={}",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    /// Add a node, returning the existing index if the id is already present.
    pub fn add_node(&mut self, id: TaskId) -> NodeIndex {
        if let Some(&index) = self.node_index.get(&id) {
            return index;
        }
        let index = self.graph.add_node(id);
        self.node_index.insert(id, index);
        index
    }

    /// Record that `dependent` depends on `dependency`.
    pub fn add_edge(&mut self, dependency: TaskId, dependent: TaskId) {
        let from = self.add_node(dependency);
        let to = self.add_node(dependent);
        self.graph.add_edge(from, to, ());
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.node_index.contains_key(&id)
    }

    /// Tasks that directly depend on `id`.
    pub fn dependents(&self, id: TaskId) -> Vec<TaskId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Tasks that `id` directly depends on.
    pub fn dependencies(&self, id: TaskId) -> Vec<TaskId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: TaskId, direction: Direction) -> Vec<TaskId> {
        match self.node_index.get(&id) {
            Some(&index) => {
                let mut ids: Vec<TaskId> = self
                    .graph
                    .neighbors_directed(index, direction)
                    .map(|n| self.graph[n])
                    .collect();
                // petgraph walks edges newest first
                ids.reverse();
                ids.dedup();
                ids
            }
            None => Vec::new(),
        }
    }

    /// Order all nodes so that every dependency precedes its dependents.
    ///
    /// Kahn's algorithm with a FIFO queue seeded in node discovery order.
    /// Among tasks that become ready together the order is arbitrary; only
    /// dependency order is guaranteed.
    ///
    /// # Errors
    /// Returns `Error::CircularDependency` if any node could not be placed.
    /// A partial order is never returned.
    pub fn execution_order(&self) -> Result<Vec<TaskId>> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|n| self.graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();

        let mut queue: VecDeque<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|n| in_degree[n.index()] == 0)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(node) = queue.pop_front() {
            order.push(self.graph[node]);
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                let degree = &mut in_degree[next.index()];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(next);
                }
            }
        }

        if order.len() < self.graph.node_count() {
            let cycle = self.find_cycle(&order);
            tlog_warn!(
                "Cycle among stored dependencies: placed {} of {} tasks, cycle={:?}",
                order.len(),
                self.graph.node_count(),
                cycle
            );
            return Err(Error::CircularDependency { cycle });
        }

        Ok(order)
    }

    /// Locate one cycle among the nodes not in `processed`.
    ///
    /// Returns the loop closed on its first node, e.g. `[a, b, c, a]`. If no
    /// explicit loop is found, returns up to three unprocessed ids; that
    /// fallback only says a cycle exists somewhere among them.
    pub fn find_cycle(&self, processed: &[TaskId]) -> Vec<TaskId> {
        let processed: HashSet<NodeIndex> = processed
            .iter()
            .filter_map(|id| self.node_index.get(id).copied())
            .collect();

        let mut visited = HashSet::new();
        for start in self.graph.node_indices() {
            if processed.contains(&start) || visited.contains(&start) {
                continue;
            }
            if let Some(cycle) = self.cycle_from(start, &processed, &mut visited) {
                return cycle.into_iter().map(|n| self.graph[n]).collect();
            }
        }

        self.graph
            .node_indices()
            .filter(|n| !processed.contains(n))
            .take(CYCLE_FALLBACK_LEN)
            .map(|n| self.graph[n])
            .collect()
    }

    /// Depth-first walk from `start` over unprocessed nodes, returning the
    /// first loop closed on the current path. Uses an explicit stack of
    /// neighbor iterators.
    fn cycle_from(
        &self,
        start: NodeIndex,
        processed: &HashSet<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        visited.insert(start);
        let mut path = vec![start];
        let mut on_path = HashSet::from([start]);
        let mut frames = vec![self.graph.neighbors_directed(start, Direction::Outgoing)];

        while let Some(neighbors) = frames.last_mut() {
            let Some(next) = neighbors.next() else {
                frames.pop();
                if let Some(done) = path.pop() {
                    on_path.remove(&done);
                }
                continue;
            };
            if processed.contains(&next) {
                continue;
            }
            if on_path.contains(&next) {
                let start = path.iter().position(|n| *n == next)?;
                let mut cycle = path[start..].to_vec();
                cycle.push(next);
                return Some(cycle);
            }
            if visited.insert(next) {
                path.push(next);
                on_path.insert(next);
                frames.push(self.graph.neighbors_directed(next, Direction::Outgoing));
            }
        }
        None
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}
