//! What-if analysis of graph mutations.
//!
//! The analyzer schedules the baseline snapshot and a mutated copy, then
//! diffs the two. The caller's snapshot is never modified.

use super::{compute, CriticalPathResult, ScheduleWarning};
use crate::cancel::CancelSignal;
use crate::config::EngineConfig;
use crate::domain::{DependencyEdge, EdgeId, Mutation, Snapshot, TaskId};
use crate::error::{Error, Result};
use crate::graph::{CycleDetector, GraphModel, Rejection, ValidationResult};
use serde::Serialize;

/// Edge ID given to the hypothetical edge while it is analyzed.
const PROPOSED_EDGE_ID: &str = "proposed";

/// Schedule differences caused by a mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactResult {
    /// Tasks whose earliest start or finish moved, sorted by ID
    pub affected_task_ids: Vec<TaskId>,

    /// Growth of the project duration, never negative
    pub estimated_delay_hours: f64,

    /// Whether the ordered critical chain differs
    pub critical_path_changed: bool,

    /// Project duration before the mutation
    pub baseline_duration_hours: f64,

    /// Project duration after the mutation
    pub projected_duration_hours: f64,

    /// Scheduling anomalies in the mutated schedule
    pub warnings: Vec<ScheduleWarning>,
}

/// Outcome of an impact analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "result", rename_all = "snake_case")]
pub enum ImpactOutcome {
    /// The mutation is valid; here is what it would change.
    Analyzed(ImpactResult),

    /// The proposed edge failed validation; nothing was scheduled.
    Rejected(ValidationResult),
}

impl ImpactOutcome {
    /// The impact, if the mutation was valid.
    #[must_use]
    pub fn impact(&self) -> Option<&ImpactResult> {
        match self {
            ImpactOutcome::Analyzed(impact) => Some(impact),
            ImpactOutcome::Rejected(_) => None,
        }
    }
}

/// Evaluates mutations against a baseline without committing them.
pub struct ImpactAnalyzer<'c> {
    config: &'c EngineConfig,
}

impl<'c> ImpactAnalyzer<'c> {
    /// Create an analyzer using the engine configuration.
    #[must_use]
    pub fn new(config: &'c EngineConfig) -> Self {
        Self { config }
    }

    /// Analyze `mutation` against `baseline`.
    ///
    /// The request itself is checked first: lags must be finite and
    /// non-negative, deltas finite, and a duration change must name a task
    /// of the baseline. Edge additions are then validated against the graph.
    /// Any failure short-circuits into [`ImpactOutcome::Rejected`].
    ///
    /// # Errors
    ///
    /// Integrity errors from either snapshot and `Error::Cancelled`.
    pub fn analyze(
        &self,
        baseline: &Snapshot,
        mutation: &Mutation,
        cancel: &CancelSignal,
    ) -> Result<ImpactOutcome> {
        if let Some(rejection) = check_request(baseline, mutation) {
            tracing::warn!(%rejection, "Refusing impact analysis for invalid request");
            return Ok(ImpactOutcome::Rejected(ValidationResult::rejected(rejection)));
        }

        if let Mutation::AddEdge {
            task, depends_on, ..
        } = mutation
        {
            cancel.check("build graph")?;
            let model = GraphModel::build_bounded(baseline, self.config.max_tasks)?;
            let validation = CycleDetector::new(&model).validate(task, depends_on)?;
            if !validation.valid {
                tracing::warn!(
                    task = %task,
                    depends_on = %depends_on,
                    rejection = ?validation.rejection,
                    "Refusing impact analysis for invalid dependency"
                );
                return Ok(ImpactOutcome::Rejected(validation));
            }
        }

        let mutated = apply(baseline, mutation)?;

        let before = compute(baseline, self.config, cancel)?;
        let after = compute(&mutated, self.config, cancel)?;

        Ok(ImpactOutcome::Analyzed(self.diff(&before, after)))
    }

    fn diff(&self, before: &CriticalPathResult, after: CriticalPathResult) -> ImpactResult {
        let tolerance = self.config.float_tolerance_hours;
        let moved = |a: f64, b: f64| (a - b).abs() > tolerance;

        let affected_task_ids = after
            .timings
            .iter()
            .filter(|(id, timing)| {
                before.timings.get(*id).is_none_or(|old| {
                    moved(old.earliest_start, timing.earliest_start)
                        || moved(old.earliest_finish, timing.earliest_finish)
                })
            })
            .map(|(id, _)| id.clone())
            .collect();

        let mut estimated_delay_hours =
            (after.project_duration_hours - before.project_duration_hours).max(0.0);
        if estimated_delay_hours <= tolerance {
            estimated_delay_hours = 0.0;
        }

        ImpactResult {
            affected_task_ids,
            estimated_delay_hours,
            critical_path_changed: before.critical_task_ids != after.critical_task_ids,
            baseline_duration_hours: before.project_duration_hours,
            projected_duration_hours: after.project_duration_hours,
            warnings: after.warnings,
        }
    }
}

/// Request-level checks that need no graph.
fn check_request(baseline: &Snapshot, mutation: &Mutation) -> Option<Rejection> {
    match mutation {
        Mutation::AddEdge { lag_hours, .. } => (!lag_hours.is_finite() || *lag_hours < 0.0)
            .then(|| Rejection::InvalidHours {
                field: "lag_hours".to_string(),
                value: *lag_hours,
            }),
        Mutation::ChangeDuration { task, delta_hours } => {
            if !delta_hours.is_finite() {
                Some(Rejection::InvalidHours {
                    field: "delta_hours".to_string(),
                    value: *delta_hours,
                })
            } else if baseline.task(task).is_none() {
                Some(Rejection::UnknownTask { task: task.clone() })
            } else {
                None
            }
        }
    }
}

/// Clone `baseline` with `mutation` applied.
fn apply(baseline: &Snapshot, mutation: &Mutation) -> Result<Snapshot> {
    let mut mutated = baseline.clone();
    match mutation {
        Mutation::AddEdge {
            task,
            depends_on,
            dependency_type,
            lag_hours,
        } => {
            mutated.edges.push(
                DependencyEdge::new(EdgeId::new(PROPOSED_EDGE_ID), task.clone(), depends_on.clone())
                    .with_type(*dependency_type)
                    .with_lag(*lag_hours),
            );
        }
        Mutation::ChangeDuration { task, delta_hours } => {
            let target = mutated
                .tasks
                .iter_mut()
                .find(|t| &t.id == task)
                .ok_or_else(|| Error::TaskNotFound(task.clone()))?;
            target.duration_hours = (target.duration_hours + delta_hours).max(0.0);
        }
    }
    Ok(mutated)
}
