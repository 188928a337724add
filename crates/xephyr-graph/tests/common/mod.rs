//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};
use xephyr_graph::domain::{DependencyEdge, DependencyType, Snapshot, Task, TaskId, TaskStatus};

/// Fluent builder for project snapshots.
#[derive(Default)]
pub struct SnapshotBuilder {
    tasks: Vec<Task>,
    edges: Vec<DependencyEdge>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a backlog task.
    pub fn task(mut self, id: &str, hours: f64) -> Self {
        self.tasks.push(Task::new(id, hours));
        self
    }

    /// Add a task with a status.
    pub fn task_with_status(mut self, id: &str, hours: f64, status: TaskStatus) -> Self {
        self.tasks.push(Task::new(id, hours).with_status(status));
        self
    }

    /// `task` depends on `depends_on` (finish-to-start, no lag).
    pub fn dep(self, task: &str, depends_on: &str) -> Self {
        self.typed_dep(task, depends_on, DependencyType::FinishToStart, 0.0)
    }

    /// Fully specified dependency; edge IDs are assigned sequentially.
    pub fn typed_dep(
        mut self,
        task: &str,
        depends_on: &str,
        dependency_type: DependencyType,
        lag_hours: f64,
    ) -> Self {
        let id = format!("e{}", self.edges.len() + 1);
        self.edges.push(
            DependencyEdge::new(id, task, depends_on)
                .with_type(dependency_type)
                .with_lag(lag_hours),
        );
        self
    }

    pub fn build(self) -> Snapshot {
        Snapshot::new(self.tasks, self.edges)
    }
}

/// Task IDs from string slices.
pub fn ids(values: &[&str]) -> Vec<TaskId> {
    values.iter().map(|v| TaskId::new(*v)).collect()
}

/// The three-task chain used throughout: 40h -> 80h -> 50h.
pub fn linear_chain() -> Snapshot {
    SnapshotBuilder::new()
        .task("task-1", 40.0)
        .task("task-2", 80.0)
        .task("task-3", 50.0)
        .dep("task-2", "task-1")
        .dep("task-3", "task-2")
        .build()
}

/// Run the xephyr-graph binary in `dir`.
pub fn run_cli_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xephyr-graph"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute xephyr-graph binary")
}
