//! Property tests over randomly generated acyclic snapshots.

use proptest::prelude::*;
use std::collections::HashSet;
use xephyr_graph::cancel::CancelSignal;
use xephyr_graph::config::EngineConfig;
use xephyr_graph::domain::{DependencyEdge, Snapshot, Task, TaskId};
use xephyr_graph::graph::{CycleDetector, GraphModel, Rejection};
use xephyr_graph::schedule::compute;

// Acyclic by construction: task i may only depend on tasks 0..i.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Snapshot> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        let durations = proptest::collection::vec(0u32..100, num_tasks);
        let deps = proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks.min(4)),
            num_tasks,
        );
        let lags = proptest::collection::vec(0u32..10, num_tasks);

        (durations, deps, lags).prop_map(|(durations, raw_deps, lags)| {
            let tasks = durations
                .iter()
                .enumerate()
                .map(|(i, hours)| Task::new(format!("t{i:02}"), f64::from(*hours)))
                .collect();

            let mut edges = Vec::new();
            for (i, potential) in raw_deps.into_iter().enumerate() {
                if i == 0 {
                    continue;
                }
                let unique: HashSet<usize> = potential.into_iter().map(|d| d % i).collect();
                let mut unique: Vec<usize> = unique.into_iter().collect();
                unique.sort_unstable();
                for dep in unique {
                    edges.push(
                        DependencyEdge::new(
                            format!("e{}", edges.len()),
                            format!("t{i:02}"),
                            format!("t{dep:02}"),
                        )
                        .with_lag(f64::from(lags[i])),
                    );
                }
            }
            Snapshot::new(tasks, edges)
        })
    })
}

proptest! {
    #[test]
    fn test_topological_order_respects_every_edge(snapshot in dag_strategy(20)) {
        let model = GraphModel::build(&snapshot).unwrap();
        let order = model.topological_order().unwrap();
        let ids = order.task_ids(&model);
        prop_assert_eq!(ids.len(), snapshot.tasks.len());

        let position = |id: &TaskId| ids.iter().position(|x| x == id).unwrap();
        for edge in &snapshot.edges {
            prop_assert!(position(&edge.depends_on_task_id) < position(&edge.task_id));
        }
    }

    #[test]
    fn test_float_classifies_critical_tasks(snapshot in dag_strategy(20)) {
        let result = compute(&snapshot, &EngineConfig::default(), &CancelSignal::new()).unwrap();

        for (id, timing) in &result.timings {
            prop_assert!(timing.float_hours >= 0.0, "negative float for {}", id);
            if result.critical_task_ids.contains(id) {
                prop_assert_eq!(timing.float_hours, 0.0);
            }
            if timing.float_hours > 0.0 {
                prop_assert!(!result.critical_task_ids.contains(id));
            }
        }
    }

    #[test]
    fn test_critical_chain_is_connected_and_ends_at_project_finish(snapshot in dag_strategy(20)) {
        let result = compute(&snapshot, &EngineConfig::default(), &CancelSignal::new()).unwrap();
        let chain = &result.critical_task_ids;
        prop_assert!(!chain.is_empty());

        for pair in chain.windows(2) {
            let linked = snapshot
                .edges
                .iter()
                .any(|e| e.same_pair(&pair[1], &pair[0]));
            prop_assert!(linked, "{} -> {} is not an edge", pair[0], pair[1]);
        }

        let last = chain.last().unwrap();
        prop_assert_eq!(
            result.timings[last].earliest_finish,
            result.project_duration_hours
        );
    }

    #[test]
    fn test_critical_path_is_idempotent(snapshot in dag_strategy(15)) {
        let config = EngineConfig::default();
        let first = compute(&snapshot, &config, &CancelSignal::new()).unwrap();
        let second = compute(&snapshot, &config, &CancelSignal::new()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_cycle_detection_matches_reachability(
        snapshot in dag_strategy(15),
        a in any::<usize>(),
        b in any::<usize>(),
    ) {
        let n = snapshot.tasks.len();
        let task = snapshot.tasks[a % n].id.clone();
        let depends_on = snapshot.tasks[b % n].id.clone();

        let model = GraphModel::build(&snapshot).unwrap();
        let result = CycleDetector::new(&model).validate(&task, &depends_on).unwrap();

        if task == depends_on {
            prop_assert_eq!(result.rejection, Some(Rejection::SelfDependency));
        } else if !matches!(result.rejection, Some(Rejection::DuplicateDependency { .. })) {
            let closes_loop = model.descendants(&task).unwrap().contains(&depends_on);
            prop_assert_eq!(result.would_create_cycle, closes_loop);
            prop_assert_eq!(result.valid, !closes_loop);
            if closes_loop {
                prop_assert_eq!(result.cycle_path.first(), Some(&task));
                prop_assert_eq!(result.cycle_path.last(), Some(&task));
            }
        }
    }
}
