//! Snapshot-in, result-out entry points.
//!
//! [`Engine`] bundles the configuration with the individual components so
//! callers do not have to build graph models and orders themselves. Every
//! call builds a fresh [`GraphModel`] over the borrowed snapshot.

use crate::cancel::CancelSignal;
use crate::config::EngineConfig;
use crate::domain::{Mutation, Snapshot, TaskId};
use crate::error::{Error, Result};
use crate::graph::{CycleDetector, GraphModel, ValidationResult};
use crate::report::{DependencyGraphView, Reporter, TaskDependencyReport};
use crate::schedule::{CriticalPathCalculator, CriticalPathResult, ImpactAnalyzer, ImpactOutcome};
use crate::status::{self, DependencyStatus};
use std::collections::HashSet;

/// The dependency and scheduling engine.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Create an engine with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A fresh signal carrying the configured deadline, if any.
    #[must_use]
    pub fn cancel_signal(&self) -> CancelSignal {
        CancelSignal::new().with_optional_timeout(self.config.phase_deadline())
    }

    fn model<'a>(&self, snapshot: &'a Snapshot, cancel: &CancelSignal) -> Result<GraphModel<'a>> {
        cancel.check("build graph")?;
        GraphModel::build_bounded(snapshot, self.config.max_tasks)
    }

    /// Check whether "`task` depends on `depends_on`" may be added.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownTaskReference` if either task is missing, any
    /// graph-building error for the snapshot, or `Error::Cancelled`.
    pub fn validate_dependency(
        &self,
        snapshot: &Snapshot,
        task: &TaskId,
        depends_on: &TaskId,
        cancel: &CancelSignal,
    ) -> Result<ValidationResult> {
        let model = self.model(snapshot, cancel)?;
        CycleDetector::new(&model).validate(task, depends_on)
    }

    /// Run CPM over the snapshot.
    ///
    /// # Errors
    ///
    /// Fails on an invalid or cyclic snapshot, or when `cancel` fires.
    pub fn compute_critical_path(
        &self,
        snapshot: &Snapshot,
        cancel: &CancelSignal,
    ) -> Result<CriticalPathResult> {
        crate::schedule::compute(snapshot, &self.config, cancel)
    }

    /// Evaluate a hypothetical mutation without applying it.
    ///
    /// Invalid requests come back as [`ImpactOutcome::Rejected`], not as errors.
    ///
    /// # Errors
    ///
    /// Fails on an invalid or cyclic snapshot, or when `cancel` fires.
    pub fn analyze_dependency_impact(
        &self,
        snapshot: &Snapshot,
        mutation: &Mutation,
        cancel: &CancelSignal,
    ) -> Result<ImpactOutcome> {
        ImpactAnalyzer::new(&self.config).analyze(snapshot, mutation, cancel)
    }

    /// Transitive successors of `task`.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` for an unknown task, or a graph-building error.
    pub fn descendants(
        &self,
        snapshot: &Snapshot,
        task: &TaskId,
        cancel: &CancelSignal,
    ) -> Result<HashSet<TaskId>> {
        self.model(snapshot, cancel)?.descendants(task)
    }

    /// Transitive predecessors of `task`.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` for an unknown task, or a graph-building error.
    pub fn ancestors(
        &self,
        snapshot: &Snapshot,
        task: &TaskId,
        cancel: &CancelSignal,
    ) -> Result<HashSet<TaskId>> {
        self.model(snapshot, cancel)?.ancestors(task)
    }

    /// Ready/blocked status of a task that belongs to the snapshot.
    ///
    /// Use [`status::dependency_status`] directly for a task held outside the
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` for an unknown task and
    /// `Error::UnknownTaskReference` if one of its predecessors is missing.
    pub fn dependency_status(&self, snapshot: &Snapshot, task: &TaskId) -> Result<DependencyStatus> {
        let task = snapshot
            .task(task)
            .ok_or_else(|| Error::TaskNotFound(task.clone()))?;
        status::dependency_status(task, snapshot)
    }

    /// Dependency report for one task.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` for an unknown task, or any error of
    /// [`Self::compute_critical_path`].
    pub fn task_dependencies(
        &self,
        snapshot: &Snapshot,
        task: &TaskId,
        include_indirect: bool,
        cancel: &CancelSignal,
    ) -> Result<TaskDependencyReport> {
        let model = self.model(snapshot, cancel)?;
        cancel.check("topological sort")?;
        let order = model.topological_order()?;
        let schedule = self.calculator().calculate(&model, &order, cancel)?;
        Reporter::new(&model, &order, &schedule).task_dependencies(task, include_indirect)
    }

    /// Laid-out view of the whole project graph.
    ///
    /// # Errors
    ///
    /// Fails on an invalid or cyclic snapshot, or when `cancel` fires.
    pub fn dependency_graph(
        &self,
        snapshot: &Snapshot,
        cancel: &CancelSignal,
    ) -> Result<DependencyGraphView> {
        let model = self.model(snapshot, cancel)?;
        cancel.check("topological sort")?;
        let order = model.topological_order()?;
        let schedule = self.calculator().calculate(&model, &order, cancel)?;
        Ok(Reporter::new(&model, &order, &schedule).dependency_graph())
    }

    fn calculator(&self) -> CriticalPathCalculator {
        CriticalPathCalculator::new(self.config.float_tolerance_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyEdge, Task, TaskStatus};

    fn snapshot() -> Snapshot {
        Snapshot::new(
            vec![
                Task::new("a", 2.0).with_status(TaskStatus::Done),
                Task::new("b", 3.0),
            ],
            vec![DependencyEdge::new("e1", "b", "a")],
        )
    }

    #[test]
    fn test_facade_round_trip() {
        let engine = Engine::default();
        let cancel = engine.cancel_signal();
        let snapshot = snapshot();

        let result = engine.compute_critical_path(&snapshot, &cancel).unwrap();
        assert_eq!(result.project_duration_hours, 5.0);

        assert_eq!(
            engine
                .descendants(&snapshot, &TaskId::new("a"), &cancel)
                .unwrap(),
            HashSet::from([TaskId::new("b")])
        );
        assert_eq!(
            engine
                .dependency_status(&snapshot, &TaskId::new("b"))
                .unwrap(),
            DependencyStatus::Ready
        );
        assert!(
            !engine
                .validate_dependency(&snapshot, &TaskId::new("a"), &TaskId::new("b"), &cancel)
                .unwrap()
                .valid
        );
    }

    #[test]
    fn test_size_guard_applies_to_every_call() {
        let engine = Engine::new(EngineConfig {
            max_tasks: 1,
            ..EngineConfig::default()
        });
        let cancel = engine.cancel_signal();
        let err = engine
            .ancestors(&snapshot(), &TaskId::new("b"), &cancel)
            .unwrap_err();
        assert!(matches!(err, Error::SnapshotTooLarge { .. }));
    }

    #[test]
    fn test_status_of_unknown_task() {
        let err = Engine::default()
            .dependency_status(&snapshot(), &TaskId::new("ghost"))
            .unwrap_err();
        assert!(matches!(err, Error::TaskNotFound(_)));
    }
}
