//! Critical Path Method (CPM) scheduling.
//!
//! Times are hours relative to project start (hour 0). The forward pass walks
//! the topological order computing earliest start/finish; the backward pass
//! walks it in reverse computing latest start/finish against the project
//! duration. Float is `LS - ES`; a task is critical when its float is zero.
//!
//! # Dependency offsets
//!
//! For an edge `P -> S` with lag `l`:
//!
//! | type               | forward (bound on `S.ES`)  | backward (bound on `P.LF`)   |
//! |--------------------|----------------------------|------------------------------|
//! | `finish_to_start`  | `P.EF + l`                 | `S.LS - l`                   |
//! | `start_to_start`   | `P.ES + l`                 | `S.LS - l + P.duration`      |
//! | `finish_to_finish` | `P.EF + l - S.duration`    | `S.LF - l`                   |
//! | `start_to_finish`  | `P.ES + l - S.duration`    | `S.LF - l + P.duration`      |
//!
//! # Policies
//!
//! - A negative earliest start (possible with finish-anchored types) is clamped
//!   to 0 and reported as [`ScheduleWarning::NegativeStartClamped`].
//! - Project duration is the largest earliest finish in the project. For
//!   finish-to-start graphs this is the largest sink finish.
//! - When several zero-float chains exist, the reported chain starts at the
//!   first critical task in topological order that has no predecessors, and at
//!   each step follows the zero-slack edge to the critical successor that comes
//!   first in topological order.

mod impact;

pub use impact::{ImpactAnalyzer, ImpactOutcome, ImpactResult};

use crate::cancel::CancelSignal;
use crate::config::EngineConfig;
use crate::domain::{DependencyEdge, DependencyType, Snapshot, TaskId};
use crate::error::Result;
use crate::graph::{GraphModel, TopologicalOrder};
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::BTreeMap;

/// CPM timings for one task, in hours from project start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTiming {
    /// Earliest start (ES)
    pub earliest_start: f64,

    /// Earliest finish (EF)
    pub earliest_finish: f64,

    /// Latest start (LS)
    pub latest_start: f64,

    /// Latest finish (LF)
    pub latest_finish: f64,

    /// Float (LS - ES), exactly zero for critical tasks
    pub float_hours: f64,
}

impl TaskTiming {
    /// Whether the task has no scheduling flexibility.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.float_hours == 0.0
    }
}

/// Non-fatal anomalies found while scheduling.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleWarning {
    /// Offsets placed the task before project start; its start was moved to 0.
    #[serde(rename_all = "camelCase")]
    NegativeStartClamped {
        /// The affected task
        task_id: TaskId,
        /// The start implied by its predecessors before clamping
        unclamped_start_hours: f64,
    },
}

/// Result of a critical path computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPathResult {
    /// The critical chain, from its first task to its last
    pub critical_task_ids: Vec<TaskId>,

    /// Float for every task
    pub float_by_task: BTreeMap<TaskId, f64>,

    /// Minimum possible project duration
    pub project_duration_hours: f64,

    /// Full CPM timings for every task
    pub timings: BTreeMap<TaskId, TaskTiming>,

    /// Anomalies that did not stop the computation
    pub warnings: Vec<ScheduleWarning>,
}

impl CriticalPathResult {
    /// Whether the task has zero float.
    #[must_use]
    pub fn is_critical(&self, id: &TaskId) -> bool {
        self.timings.get(id).is_some_and(TaskTiming::is_critical)
    }

    /// Tasks with positive float, largest float first (ties by ID).
    #[must_use]
    pub fn non_critical(&self) -> Vec<(TaskId, f64)> {
        let mut tasks: Vec<(TaskId, f64)> = self
            .float_by_task
            .iter()
            .filter(|(_, float)| **float > 0.0)
            .map(|(id, float)| (id.clone(), *float))
            .collect();
        tasks.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        tasks
    }
}

/// Bound an edge places on the successor's earliest start.
fn forward_offset(
    edge: &DependencyEdge,
    pred_start: f64,
    pred_finish: f64,
    succ_duration: f64,
) -> f64 {
    match edge.dependency_type {
        DependencyType::FinishToStart => pred_finish + edge.lag_hours,
        DependencyType::StartToStart => pred_start + edge.lag_hours,
        DependencyType::FinishToFinish => pred_finish + edge.lag_hours - succ_duration,
        DependencyType::StartToFinish => pred_start + edge.lag_hours - succ_duration,
    }
}

/// Bound an edge places on the predecessor's latest finish.
fn backward_offset(
    edge: &DependencyEdge,
    succ_latest_start: f64,
    succ_latest_finish: f64,
    pred_duration: f64,
) -> f64 {
    match edge.dependency_type {
        DependencyType::FinishToStart => succ_latest_start - edge.lag_hours,
        DependencyType::StartToStart => succ_latest_start - edge.lag_hours + pred_duration,
        DependencyType::FinishToFinish => succ_latest_finish - edge.lag_hours,
        DependencyType::StartToFinish => succ_latest_finish - edge.lag_hours + pred_duration,
    }
}

/// Runs the CPM forward and backward passes.
#[derive(Debug, Clone, Copy)]
pub struct CriticalPathCalculator {
    float_tolerance: f64,
}

impl CriticalPathCalculator {
    /// Create a calculator that treats `|float| <= float_tolerance` as zero.
    #[must_use]
    pub fn new(float_tolerance: f64) -> Self {
        Self { float_tolerance }
    }

    fn near(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.float_tolerance
    }

    /// Compute timings, float and the critical chain.
    ///
    /// `order` must come from [`GraphModel::topological_order`] on `model`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Cancelled` if `cancel` fires before either pass.
    pub fn calculate(
        &self,
        model: &GraphModel<'_>,
        order: &TopologicalOrder,
        cancel: &CancelSignal,
    ) -> Result<CriticalPathResult> {
        let n = model.task_count();
        let mut es = vec![0.0_f64; n];
        let mut ef = vec![0.0_f64; n];
        let mut warnings = Vec::new();

        cancel.check("forward pass")?;
        for &node in order.nodes() {
            let task = model.task(node);
            let unclamped = model
                .predecessors(node)
                .map(|(pred, edge)| {
                    forward_offset(edge, es[pred.index()], ef[pred.index()], task.duration_hours)
                })
                .fold(f64::NEG_INFINITY, f64::max);

            if unclamped.is_finite() && unclamped < -self.float_tolerance {
                tracing::warn!(
                    task = %task.id,
                    unclamped_start_hours = unclamped,
                    "Dependency offsets imply a start before project start; clamping to 0"
                );
                warnings.push(ScheduleWarning::NegativeStartClamped {
                    task_id: task.id.clone(),
                    unclamped_start_hours: unclamped,
                });
            }

            // No predecessors folds to -inf, which also clamps to 0.
            let start = unclamped.max(0.0);
            es[node.index()] = start;
            ef[node.index()] = start + task.duration_hours;
        }

        let project_duration = ef.iter().copied().fold(0.0_f64, f64::max);

        cancel.check("backward pass")?;
        let mut ls = vec![0.0_f64; n];
        let mut lf = vec![0.0_f64; n];
        for &node in order.nodes().iter().rev() {
            let duration = model.task(node).duration_hours;
            let latest_finish = model
                .successors(node)
                .map(|(succ, edge)| {
                    backward_offset(edge, ls[succ.index()], lf[succ.index()], duration)
                })
                .fold(project_duration, f64::min);
            lf[node.index()] = latest_finish;
            ls[node.index()] = latest_finish - duration;
        }

        let mut timings = BTreeMap::new();
        let mut float_by_task = BTreeMap::new();
        let mut critical = vec![false; n];
        for node in model.nodes() {
            let i = node.index();
            let mut float_hours = ls[i] - es[i];
            if float_hours.abs() <= self.float_tolerance {
                float_hours = 0.0;
            }
            critical[i] = float_hours == 0.0;

            let id = model.task(node).id.clone();
            float_by_task.insert(id.clone(), float_hours);
            timings.insert(
                id,
                TaskTiming {
                    earliest_start: es[i],
                    earliest_finish: ef[i],
                    latest_start: ls[i],
                    latest_finish: lf[i],
                    float_hours,
                },
            );
        }

        let chain = self.critical_chain(model, order, &es, &ef, &critical);
        let critical_task_ids = chain
            .into_iter()
            .map(|node| model.task(node).id.clone())
            .collect();

        tracing::debug!(
            project_duration_hours = project_duration,
            tasks = n,
            "Computed critical path"
        );

        Ok(CriticalPathResult {
            critical_task_ids,
            float_by_task,
            project_duration_hours: project_duration,
            timings,
            warnings,
        })
    }

    fn critical_chain(
        &self,
        model: &GraphModel<'_>,
        order: &TopologicalOrder,
        es: &[f64],
        ef: &[f64],
        critical: &[bool],
    ) -> Vec<NodeIndex> {
        let is_critical = |node: NodeIndex| critical[node.index()];

        let start = order
            .nodes()
            .iter()
            .copied()
            .find(|&node| is_critical(node) && model.predecessors(node).next().is_none())
            .or_else(|| order.nodes().iter().copied().find(|&node| is_critical(node)));

        let Some(mut current) = start else {
            return Vec::new();
        };

        let mut chain = vec![current];
        loop {
            let next = model
                .successors(current)
                .filter(|&(succ, edge)| {
                    is_critical(succ)
                        && self.near(
                            forward_offset(
                                edge,
                                es[current.index()],
                                ef[current.index()],
                                model.task(succ).duration_hours,
                            ),
                            es[succ.index()],
                        )
                })
                .map(|(succ, _)| succ)
                .min_by_key(|&succ| order.position(succ).unwrap_or(usize::MAX));

            match next {
                Some(succ) => {
                    chain.push(succ);
                    current = succ;
                }
                None => break,
            }
        }
        chain
    }
}

/// Build, sort and schedule a snapshot in one call.
///
/// # Errors
///
/// Fails on an invalid or cyclic snapshot, or when `cancel` fires.
pub fn compute(
    snapshot: &Snapshot,
    config: &EngineConfig,
    cancel: &CancelSignal,
) -> Result<CriticalPathResult> {
    cancel.check("build graph")?;
    let model = GraphModel::build_bounded(snapshot, config.max_tasks)?;
    cancel.check("topological sort")?;
    let order = model.topological_order()?;
    CriticalPathCalculator::new(config.float_tolerance_hours).calculate(&model, &order, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Task;

    fn run(snapshot: &Snapshot) -> CriticalPathResult {
        compute(snapshot, &EngineConfig::default(), &CancelSignal::new()).unwrap()
    }

    fn ids(values: &[&str]) -> Vec<TaskId> {
        values.iter().map(|v| TaskId::new(*v)).collect()
    }

    fn timing<'r>(result: &'r CriticalPathResult, id: &str) -> &'r TaskTiming {
        &result.timings[&TaskId::new(id)]
    }

    #[test]
    fn test_linear_chain() {
        let snapshot = Snapshot::new(
            vec![
                Task::new("task-1", 40.0),
                Task::new("task-2", 80.0),
                Task::new("task-3", 50.0),
            ],
            vec![
                DependencyEdge::new("d1", "task-2", "task-1"),
                DependencyEdge::new("d2", "task-3", "task-2"),
            ],
        );
        let result = run(&snapshot);

        assert_eq!(result.critical_task_ids, ids(&["task-1", "task-2", "task-3"]));
        assert_eq!(result.project_duration_hours, 170.0);
        for float in result.float_by_task.values() {
            assert_eq!(*float, 0.0);
        }
        let t2 = timing(&result, "task-2");
        assert_eq!((t2.earliest_start, t2.earliest_finish), (40.0, 120.0));
    }

    #[test]
    fn test_branch_off_critical_chain_has_float() {
        let snapshot = Snapshot::new(
            vec![
                Task::new("task-1", 40.0),
                Task::new("task-2", 80.0),
                Task::new("task-3", 50.0),
                Task::new("task-4", 30.0),
            ],
            vec![
                DependencyEdge::new("d1", "task-2", "task-1"),
                DependencyEdge::new("d2", "task-3", "task-2"),
                DependencyEdge::new("d3", "task-4", "task-1"),
            ],
        );
        let result = run(&snapshot);

        assert_eq!(result.critical_task_ids, ids(&["task-1", "task-2", "task-3"]));
        let t4 = timing(&result, "task-4");
        assert_eq!(t4.earliest_start, 40.0);
        assert_eq!(t4.latest_finish, 170.0);
        assert_eq!(t4.float_hours, 100.0);
        assert_eq!(result.non_critical(), vec![(TaskId::new("task-4"), 100.0)]);
    }

    #[test]
    fn test_lag_extends_finish_to_start() {
        let snapshot = Snapshot::new(
            vec![Task::new("a", 10.0), Task::new("b", 5.0)],
            vec![DependencyEdge::new("d1", "b", "a").with_lag(8.0)],
        );
        let result = run(&snapshot);
        assert_eq!(timing(&result, "b").earliest_start, 18.0);
        assert_eq!(result.project_duration_hours, 23.0);
        assert_eq!(result.critical_task_ids, ids(&["a", "b"]));
    }

    #[test]
    fn test_start_to_start_overlaps_tasks() {
        let snapshot = Snapshot::new(
            vec![Task::new("a", 10.0), Task::new("b", 4.0)],
            vec![
                DependencyEdge::new("d1", "b", "a")
                    .with_type(DependencyType::StartToStart)
                    .with_lag(2.0),
            ],
        );
        let result = run(&snapshot);

        // b runs 2..6, a runs 0..10 and drives the project end.
        assert_eq!(timing(&result, "b").earliest_start, 2.0);
        assert_eq!(result.project_duration_hours, 10.0);
        assert!(result.is_critical(&TaskId::new("a")));
        assert_eq!(timing(&result, "b").float_hours, 4.0);
        assert_eq!(result.critical_task_ids, ids(&["a"]));
    }

    #[test]
    fn test_finish_to_finish_aligns_finishes() {
        let snapshot = Snapshot::new(
            vec![Task::new("a", 10.0), Task::new("b", 4.0)],
            vec![
                DependencyEdge::new("d1", "b", "a")
                    .with_type(DependencyType::FinishToFinish)
                    .with_lag(1.0),
            ],
        );
        let result = run(&snapshot);

        let b = timing(&result, "b");
        assert_eq!((b.earliest_start, b.earliest_finish), (7.0, 11.0));
        assert_eq!(result.project_duration_hours, 11.0);
        assert_eq!(result.critical_task_ids, ids(&["a", "b"]));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_negative_start_is_clamped_with_warning() {
        let snapshot = Snapshot::new(
            vec![Task::new("a", 2.0), Task::new("b", 10.0)],
            vec![
                DependencyEdge::new("d1", "b", "a").with_type(DependencyType::StartToFinish),
            ],
        );
        let result = run(&snapshot);

        assert_eq!(timing(&result, "b").earliest_start, 0.0);
        assert_eq!(
            result.warnings,
            vec![ScheduleWarning::NegativeStartClamped {
                task_id: TaskId::new("b"),
                unclamped_start_hours: -10.0,
            }]
        );
        for t in result.timings.values() {
            assert!(t.float_hours >= 0.0);
        }
    }

    #[test]
    fn test_equal_chains_pick_first_in_topological_order() {
        //   a -> b -> d
        //   a -> c -> d   (b and c both 5h)
        let snapshot = Snapshot::new(
            vec![
                Task::new("a", 1.0),
                Task::new("b", 5.0),
                Task::new("c", 5.0),
                Task::new("d", 1.0),
            ],
            vec![
                DependencyEdge::new("e1", "b", "a"),
                DependencyEdge::new("e2", "c", "a"),
                DependencyEdge::new("e3", "d", "b"),
                DependencyEdge::new("e4", "d", "c"),
            ],
        );
        let result = run(&snapshot);

        assert!(result.is_critical(&TaskId::new("c")));
        assert_eq!(result.critical_task_ids, ids(&["a", "b", "d"]));
    }

    #[test]
    fn test_empty_snapshot() {
        let result = run(&Snapshot::default());
        assert!(result.critical_task_ids.is_empty());
        assert_eq!(result.project_duration_hours, 0.0);
    }

    #[test]
    fn test_cancelled_before_forward_pass() {
        let snapshot = Snapshot::new(vec![Task::new("a", 1.0)], vec![]);
        let model = GraphModel::build(&snapshot).unwrap();
        let order = model.topological_order().unwrap();
        let cancel = CancelSignal::new();
        cancel.cancel();

        let err = CriticalPathCalculator::new(0.0)
            .calculate(&model, &order, &cancel)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Cancelled {
                phase: "forward pass"
            }
        ));
    }
}
