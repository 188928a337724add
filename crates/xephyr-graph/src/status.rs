//! Ready/blocked resolution from predecessor progress.

use crate::domain::{DependencyEdge, DependencyType, Snapshot, Task, TaskStatus};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a task may start given its predecessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyStatus {
    /// Every predecessor constraint on the task's start is met
    Ready,

    /// At least one predecessor constraint is still open
    Blocked,
}

impl fmt::Display for DependencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Blocked => write!(f, "blocked"),
        }
    }
}

/// Whether `edge` currently prevents its dependent task from starting.
///
/// Finish-anchored types (`finish_to_finish`, `start_to_finish`) only
/// constrain when the dependent may finish, so they never block a start.
#[must_use]
pub fn is_blocking(edge: &DependencyEdge, predecessor: TaskStatus) -> bool {
    match edge.dependency_type {
        DependencyType::FinishToStart => !predecessor.is_done(),
        DependencyType::StartToStart => !predecessor.has_started(),
        DependencyType::FinishToFinish | DependencyType::StartToFinish => false,
    }
}

/// Resolve `task`'s status from its predecessor edges in `snapshot`.
///
/// The task itself need not be part of the snapshot; only edges whose
/// `task_id` matches are consulted.
///
/// # Errors
///
/// Returns `Error::UnknownTaskReference` if a predecessor is missing.
pub fn dependency_status(task: &Task, snapshot: &Snapshot) -> Result<DependencyStatus> {
    for edge in snapshot.edges.iter().filter(|e| e.task_id == task.id) {
        let predecessor = snapshot.task(&edge.depends_on_task_id).ok_or_else(|| {
            Error::UnknownTaskReference {
                edge: edge.id.clone(),
                task: edge.depends_on_task_id.clone(),
            }
        })?;
        if is_blocking(edge, predecessor.status) {
            tracing::trace!(
                task = %task.id,
                blocked_by = %predecessor.id,
                edge = %edge.id,
                "Task is blocked"
            );
            return Ok(DependencyStatus::Blocked);
        }
    }
    Ok(DependencyStatus::Ready)
}
