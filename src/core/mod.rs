//! Core domain models for dependency resolution.
//!
//! Tasks as the resolver sees them, and the per-query graph view built
//! from them.

pub mod graph;
pub mod task;

pub use graph::DependencyGraph;
pub use task::{ProjectId, Task, TaskId, TaskStatus};
