//! Domain types for the dependency engine.
//!
//! Tasks and dependency edges are owned by the surrounding service; the engine
//! only ever borrows a [`Snapshot`] of one project for a single computation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a task
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create a new task ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a dependency edge
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    /// Create a new edge ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EdgeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EdgeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of the project a snapshot belongs to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Create a new project ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Workflow status of a task.
///
/// Variants are declared in workflow order, so `Ord` reflects progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not yet planned for work
    #[default]
    Backlog,

    /// Planned and available to pick up
    Ready,

    /// Currently being worked on
    InProgress,

    /// Work finished, awaiting review
    Review,

    /// Completed
    Done,
}

impl TaskStatus {
    /// Whether work on the task has begun.
    #[must_use]
    pub fn has_started(self) -> bool {
        self >= TaskStatus::InProgress
    }

    /// Whether the task is complete.
    #[must_use]
    pub fn is_done(self) -> bool {
        self == TaskStatus::Done
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backlog => write!(f, "backlog"),
            Self::Ready => write!(f, "ready"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Review => write!(f, "review"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// A task as supplied by the task provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task
    pub id: TaskId,

    /// Display title (not used by the algorithms)
    #[serde(default)]
    pub title: String,

    /// Estimated effort in hours
    pub duration_hours: f64,

    /// Current status
    #[serde(default)]
    pub status: TaskStatus,

    /// Optional due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl Task {
    /// Create a task in the backlog with the given duration.
    pub fn new(id: impl Into<TaskId>, duration_hours: f64) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            duration_hours,
            status: TaskStatus::Backlog,
            due_date: None,
        }
    }

    /// Builder-style status override.
    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder-style title override.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// How a predecessor's progress constrains its successor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// Successor starts after the predecessor finishes
    #[default]
    FinishToStart,

    /// Successor starts after the predecessor starts
    StartToStart,

    /// Successor finishes after the predecessor finishes
    FinishToFinish,

    /// Successor finishes after the predecessor starts
    StartToFinish,
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FinishToStart => write!(f, "finish_to_start"),
            Self::StartToStart => write!(f, "start_to_start"),
            Self::FinishToFinish => write!(f, "finish_to_finish"),
            Self::StartToFinish => write!(f, "start_to_finish"),
        }
    }
}

/// A dependency between two tasks of the same project.
///
/// `depends_on_task_id` is the predecessor (edge source) and `task_id` the
/// dependent successor (edge target).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEdge {
    /// Unique identifier for the edge
    pub id: EdgeId,

    /// The dependent task
    pub task_id: TaskId,

    /// The task being depended upon
    pub depends_on_task_id: TaskId,

    /// Type of dependency
    #[serde(default)]
    pub dependency_type: DependencyType,

    /// Mandatory delay after the type-defined trigger
    #[serde(default)]
    pub lag_hours: f64,
}

impl DependencyEdge {
    /// Create a zero-lag finish-to-start edge: `task` depends on `depends_on`.
    pub fn new(
        id: impl Into<EdgeId>,
        task: impl Into<TaskId>,
        depends_on: impl Into<TaskId>,
    ) -> Self {
        Self {
            id: id.into(),
            task_id: task.into(),
            depends_on_task_id: depends_on.into(),
            dependency_type: DependencyType::FinishToStart,
            lag_hours: 0.0,
        }
    }

    /// Builder-style dependency type override.
    #[must_use]
    pub fn with_type(mut self, dependency_type: DependencyType) -> Self {
        self.dependency_type = dependency_type;
        self
    }

    /// Builder-style lag override.
    #[must_use]
    pub fn with_lag(mut self, lag_hours: f64) -> Self {
        self.lag_hours = lag_hours;
        self
    }

    /// Whether this edge makes `task` depend on `depends_on`.
    #[must_use]
    pub fn same_pair(&self, task: &TaskId, depends_on: &TaskId) -> bool {
        &self.task_id == task && &self.depends_on_task_id == depends_on
    }
}

/// One project's tasks and edges, captured at a point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// All tasks of the project
    pub tasks: Vec<Task>,

    /// All dependency edges between those tasks
    #[serde(default)]
    pub edges: Vec<DependencyEdge>,
}

impl Snapshot {
    /// Create a snapshot from tasks and edges
    #[must_use]
    pub fn new(tasks: Vec<Task>, edges: Vec<DependencyEdge>) -> Self {
        Self { tasks, edges }
    }

    /// Look up a task by ID (linear scan).
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }
}

/// A hypothetical change to a snapshot, evaluated without committing it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mutation {
    /// Add a dependency: `task` depends on `depends_on`
    #[serde(rename_all = "camelCase")]
    AddEdge {
        /// The dependent task
        task: TaskId,
        /// The task being depended upon
        depends_on: TaskId,
        /// Type of dependency
        #[serde(default)]
        dependency_type: DependencyType,
        /// Lag in hours
        #[serde(default)]
        lag_hours: f64,
    },

    /// Change a task's estimated duration by a (possibly negative) delta
    #[serde(rename_all = "camelCase")]
    ChangeDuration {
        /// The task whose estimate changes
        task: TaskId,
        /// Hours to add to the current estimate
        delta_hours: f64,
    },
}

/// Request to create a new dependency through the service layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDependency {
    /// The dependent task
    pub task_id: TaskId,

    /// The task being depended upon
    pub depends_on_task_id: TaskId,

    /// Type of dependency
    #[serde(default)]
    pub dependency_type: DependencyType,

    /// Lag in hours
    #[serde(default)]
    pub lag_hours: f64,
}

impl From<&NewDependency> for Mutation {
    fn from(dep: &NewDependency) -> Self {
        Mutation::AddEdge {
            task: dep.task_id.clone(),
            depends_on: dep.depends_on_task_id.clone(),
            dependency_type: dep.dependency_type,
            lag_hours: dep.lag_hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ordering_reflects_progress() {
        assert!(TaskStatus::Backlog < TaskStatus::Ready);
        assert!(TaskStatus::Review < TaskStatus::Done);
        assert!(!TaskStatus::Ready.has_started());
        assert!(TaskStatus::InProgress.has_started());
        assert!(TaskStatus::Review.has_started());
        assert!(TaskStatus::Done.is_done());
    }

    #[test]
    fn test_edge_deserializes_collaborator_field_names() {
        let json = r#"{
            "id": "dep-1",
            "taskId": "task-2",
            "dependsOnTaskId": "task-1",
            "dependencyType": "start_to_start",
            "lagHours": 8
        }"#;
        let edge: DependencyEdge = serde_json::from_str(json).unwrap();
        assert_eq!(edge.task_id, TaskId::new("task-2"));
        assert_eq!(edge.depends_on_task_id, TaskId::new("task-1"));
        assert_eq!(edge.dependency_type, DependencyType::StartToStart);
        assert!((edge.lag_hours - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_edge_defaults_to_finish_to_start() {
        let json = r#"{"id": "d", "taskId": "b", "dependsOnTaskId": "a"}"#;
        let edge: DependencyEdge = serde_json::from_str(json).unwrap();
        assert_eq!(edge.dependency_type, DependencyType::FinishToStart);
        assert_eq!(edge.lag_hours, 0.0);
    }

    #[test]
    fn test_mutation_tagged_representation() {
        let json = r#"{"kind": "change_duration", "task": "t1", "deltaHours": -4}"#;
        let mutation: Mutation = serde_json::from_str(json).unwrap();
        assert_eq!(
            mutation,
            Mutation::ChangeDuration {
                task: TaskId::new("t1"),
                delta_hours: -4.0
            }
        );
    }
}
