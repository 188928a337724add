//! Cycle detection for proposed dependency edges.

use super::{GraphModel, Traversal};
use crate::domain::{EdgeId, TaskId};
use crate::error::{Error, Result};
use serde::Serialize;

/// Why a proposed dependency was refused.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// The task would depend on itself.
    SelfDependency,

    /// The edge would close a loop through the listed tasks.
    Cycle {
        /// Tasks along the loop, first and last entries equal
        path: Vec<TaskId>,
    },

    /// The same dependency already exists.
    DuplicateDependency {
        /// The existing edge
        existing: EdgeId,
    },

    /// A requested lag or duration delta is unusable.
    InvalidHours {
        /// The offending request field
        field: String,
        /// The rejected value
        value: f64,
    },

    /// The request names a task outside the project.
    UnknownTask {
        /// The missing task
        task: TaskId,
    },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::SelfDependency => write!(f, "Task cannot depend on itself"),
            Rejection::Cycle { path } => {
                let rendered: Vec<&str> = path.iter().map(TaskId::as_str).collect();
                write!(f, "Circular dependency detected: {}", rendered.join(" -> "))
            }
            Rejection::DuplicateDependency { existing } => {
                write!(f, "Dependency already exists: {existing}")
            }
            Rejection::InvalidHours { field, value } => write!(f, "Invalid {field}: {value}"),
            Rejection::UnknownTask { task } => write!(f, "Task not found: {task}"),
        }
    }
}

/// Outcome of validating a proposed dependency.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Whether the edge may be admitted
    pub valid: bool,

    /// Whether the edge would introduce a cycle
    pub would_create_cycle: bool,

    /// The loop the edge would close, empty unless `would_create_cycle`
    pub cycle_path: Vec<TaskId>,

    /// Reason for refusal, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<Rejection>,
}

impl ValidationResult {
    /// A passing validation.
    #[must_use]
    pub fn accepted() -> Self {
        Self {
            valid: true,
            would_create_cycle: false,
            cycle_path: Vec::new(),
            rejection: None,
        }
    }

    /// A failing validation for the given reason.
    #[must_use]
    pub fn rejected(rejection: Rejection) -> Self {
        let (would_create_cycle, cycle_path) = match &rejection {
            Rejection::Cycle { path } => (true, path.clone()),
            _ => (false, Vec::new()),
        };
        Self {
            valid: false,
            would_create_cycle,
            cycle_path,
            rejection: Some(rejection),
        }
    }
}

/// Checks proposed edges against the committed graph.
pub struct CycleDetector<'g, 'a> {
    model: &'g GraphModel<'a>,
}

impl<'g, 'a> CycleDetector<'g, 'a> {
    /// Create a detector over a committed graph.
    #[must_use]
    pub fn new(model: &'g GraphModel<'a>) -> Self {
        Self { model }
    }

    /// Validate "`task` depends on `depends_on`".
    ///
    /// The edge closes a cycle exactly when `task` is already an ancestor of
    /// `depends_on`. The reported path reads in "depends on" order:
    /// `task -> depends_on -> ... -> task`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownTaskReference` if either task is not in the snapshot.
    pub fn validate(&self, task: &TaskId, depends_on: &TaskId) -> Result<ValidationResult> {
        if task == depends_on {
            return Ok(ValidationResult::rejected(Rejection::SelfDependency));
        }

        let task_node = self.resolve(task)?;
        let depends_on_node = self.resolve(depends_on)?;

        if let Some(existing) = self.model.find_edge(task_node, depends_on_node) {
            return Ok(ValidationResult::rejected(
                Rejection::DuplicateDependency {
                    existing: existing.id.clone(),
                },
            ));
        }

        let upstream = self.model.reachable(depends_on_node, Traversal::Upstream);
        if !upstream.contains(task_node) {
            return Ok(ValidationResult::accepted());
        }

        // Parent pointers lead from `task` back to `depends_on` in precedence
        // order; reverse to read as a chain of "depends on" steps.
        let mut path: Vec<TaskId> = upstream
            .path_to_start(task_node)
            .into_iter()
            .rev()
            .map(|node| self.model.task(node).id.clone())
            .collect();
        path.insert(0, task.clone());

        tracing::debug!(
            task = %task,
            depends_on = %depends_on,
            cycle_len = path.len(),
            "Proposed dependency would create a cycle"
        );

        Ok(ValidationResult::rejected(Rejection::Cycle { path }))
    }

    fn resolve(&self, id: &TaskId) -> Result<petgraph::graph::NodeIndex> {
        self.model
            .node(id)
            .map_err(|_| Error::UnknownTaskReference {
                edge: EdgeId::new("proposed"),
                task: id.clone(),
            })
    }
}
