//! Task dependency resolution for an autonomous coding-agent orchestrator.
//!
//! The orchestrator stores projects and tasks elsewhere; this crate reads
//! them through [`repository::TaskRepository`] and answers scheduling
//! questions with [`resolver::DependencyResolver`]: edge validation,
//! execution order, readiness, blocked tasks and dependency trees.

pub mod config;
pub mod core;
pub mod error;
pub mod log;
pub mod repository;
pub mod resolver;

pub use config::{Config, DependencyConfig};
pub use crate::core::{DependencyGraph, ProjectId, Task, TaskId, TaskStatus};
pub use error::{DependencyRejection, Error, Result};
pub use repository::{InMemoryTaskRepository, TaskRepository};
pub use resolver::{DependencyResolver, Validation};
