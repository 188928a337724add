//! Error types for the dependency engine.
//!
//! Business validation failures (self-dependency, cycles, duplicates) are not
//! errors: they come back as [`crate::graph::ValidationResult`] values. The
//! variants here mean a computation could not run at all.

use crate::domain::{EdgeId, ProjectId, TaskId};
use std::io;
use thiserror::Error;

/// Broad classification used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The supplied snapshot is inconsistent ("our data is broken").
    Integrity,

    /// The computation was interrupted or its environment failed.
    Operational,
}

/// The error type for engine operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An edge references a task that is not part of the snapshot.
    #[error("Dependency {edge} references unknown task {task}")]
    UnknownTaskReference {
        /// The offending edge
        edge: EdgeId,
        /// The missing task
        task: TaskId,
    },

    /// The graph could not be fully ordered; the acyclic invariant is broken.
    #[error("Dependency graph contains a cycle; {unordered} of {total} tasks could not be ordered")]
    CyclicGraph {
        /// Tasks left with a residual in-degree
        unordered: usize,
        /// Tasks in the snapshot
        total: usize,
    },

    /// A queried task is not part of the snapshot.
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// The snapshot lists the same task twice.
    #[error("Duplicate task in snapshot: {0}")]
    DuplicateTask(TaskId),

    /// A duration or lag is negative or not a number.
    #[error("Invalid hours for {subject}: {value}")]
    InvalidHours {
        /// The task or edge carrying the value
        subject: String,
        /// The rejected value
        value: f64,
    },

    /// The store holds no snapshot for the project.
    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// A dependency slated for removal does not exist.
    #[error("Dependency not found: {0}")]
    DependencyNotFound(EdgeId),

    /// The snapshot exceeds the configured size guard.
    #[error("Snapshot has {tasks} tasks, more than the configured maximum of {max}")]
    SnapshotTooLarge {
        /// Tasks in the snapshot
        tasks: usize,
        /// Configured limit
        max: usize,
    },

    /// The computation was cancelled or ran past its deadline.
    #[error("Computation cancelled during {phase}")]
    Cancelled {
        /// The phase that observed the signal
        phase: &'static str,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Edge ID generation failed.
    #[error("ID generation failed: {0}")]
    IdGeneration(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Classify the error for the caller.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::UnknownTaskReference { .. }
            | Error::CyclicGraph { .. }
            | Error::TaskNotFound(_)
            | Error::DuplicateTask(_)
            | Error::InvalidHours { .. }
            | Error::ProjectNotFound(_)
            | Error::DependencyNotFound(_) => ErrorCategory::Integrity,
            Error::SnapshotTooLarge { .. }
            | Error::Cancelled { .. }
            | Error::Config(_)
            | Error::IdGeneration(_)
            | Error::Io(_)
            | Error::Json(_) => ErrorCategory::Operational,
        }
    }

    /// Shorthand for `category() == ErrorCategory::Integrity`.
    #[must_use]
    pub fn is_integrity(&self) -> bool {
        self.category() == ErrorCategory::Integrity
    }
}

/// A specialized Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
