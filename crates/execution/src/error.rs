//! Scheduler and configuration errors.

use taskweave_core::{Conflict, Requirements, TaskId};

/// Result alias for scheduler operations.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Errors that can occur when handing tasks to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The tree runs two siblings concurrently that need the same resource.
    #[error("'{task}' runs conflicting siblings: {}", format_conflicts(.conflicts))]
    SiblingConflict {
        /// Name of the rejected task
        task: String,
        /// Every conflicting sibling pair
        conflicts: Vec<Conflict>,
    },

    /// An active task already holds a resource the new task needs.
    #[error("'{task}' requires {shared}, held by active task '{holder}'")]
    RequirementConflict {
        /// Name of the rejected task
        task: String,
        /// Name of the active task holding the resources
        holder: String,
        /// Resources both need
        shared: Requirements,
    },

    /// No active task has this id.
    #[error("no active task with id {0}")]
    UnknownTask(TaskId),
}

fn format_conflicts(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A value is out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
