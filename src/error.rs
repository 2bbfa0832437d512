use thiserror::Error;

use crate::core::task::TaskId;

/// Why a proposed dependency edge was refused.
///
/// The display strings are the reasons handed back to callers probing
/// whether an edge is legal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyRejection {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Tasks must be in same project")]
    CrossProject,

    #[error("Task cannot depend on itself")]
    SelfReference,

    #[error("Adding dependency would create a circular dependency")]
    WouldCycle,

    #[error("Dependency depth {depth} exceeds maximum {max}")]
    DepthExceeded { depth: usize, max: usize },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// Storage failure other than a missing task. Repository
    /// implementations outside this crate map their backend errors here.
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Circular dependency detected: {}", format_cycle(.cycle))]
    CircularDependency { cycle: Vec<TaskId> },

    #[error("Dependency depth {depth} exceeds maximum {max}")]
    MaxDepthExceeded { depth: usize, max: usize },

    #[error("Invalid dependency: {0}")]
    InvalidDependency(DependencyRejection),
}

fn format_cycle(cycle: &[TaskId]) -> String {
    cycle
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl From<DependencyRejection> for Error {
    fn from(rejection: DependencyRejection) -> Self {
        match rejection {
            DependencyRejection::DepthExceeded { depth, max } => {
                Error::MaxDepthExceeded { depth, max }
            }
            other => Error::InvalidDependency(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
