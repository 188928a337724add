//! Dependency graph model built from a project snapshot.
//!
//! # Edge Direction Convention
//!
//! Edges point from **predecessor -> successor**:
//!
//! - **Edge source**: the task being depended upon (`depends_on_task_id`)
//! - **Edge target**: the dependent task (`task_id`)
//! - **Edge weight**: a borrow of the originating [`DependencyEdge`]
//!
//! So "B depends on A" becomes the edge `A -> B`. Outgoing edges lead to
//! successors (descendants), incoming edges to predecessors (ancestors).
//!
//! The model borrows the snapshot: it is cheap to build per computation and is
//! never mutated after construction.

mod cycle;
mod queries;
mod topo;

pub use cycle::{CycleDetector, Rejection, ValidationResult};
pub use queries::DependencyPath;
pub use topo::TopologicalOrder;

use crate::domain::{DependencyEdge, Snapshot, Task, TaskId};
use crate::error::{Error, Result};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Direction of a traversal relative to the edge convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Follow predecessor edges (ancestors)
    Upstream,

    /// Follow successor edges (descendants)
    Downstream,
}

impl Traversal {
    fn petgraph_direction(self) -> Direction {
        match self {
            Traversal::Upstream => Direction::Incoming,
            Traversal::Downstream => Direction::Outgoing,
        }
    }
}

/// In-memory dependency graph over a borrowed snapshot.
pub struct GraphModel<'a> {
    /// Nodes hold task borrows, edges hold edge borrows.
    graph: DiGraph<&'a Task, &'a DependencyEdge>,

    /// Mapping from task ID to graph node.
    node_map: HashMap<&'a TaskId, NodeIndex>,
}

impl<'a> GraphModel<'a> {
    /// Build the model with no size limit.
    ///
    /// # Errors
    ///
    /// - `Error::DuplicateTask` if a task ID appears twice
    /// - `Error::InvalidHours` for negative or non-finite durations and lags
    /// - `Error::UnknownTaskReference` if an edge names a task outside the snapshot
    pub fn build(snapshot: &'a Snapshot) -> Result<Self> {
        Self::build_bounded(snapshot, usize::MAX)
    }

    /// Build the model, refusing snapshots with more than `max_tasks` tasks.
    ///
    /// # Errors
    ///
    /// Returns `Error::SnapshotTooLarge` above the limit, otherwise as [`Self::build`].
    pub fn build_bounded(snapshot: &'a Snapshot, max_tasks: usize) -> Result<Self> {
        if snapshot.tasks.len() > max_tasks {
            return Err(Error::SnapshotTooLarge {
                tasks: snapshot.tasks.len(),
                max: max_tasks,
            });
        }

        let mut graph = DiGraph::with_capacity(snapshot.tasks.len(), snapshot.edges.len());
        let mut node_map = HashMap::with_capacity(snapshot.tasks.len());

        for task in &snapshot.tasks {
            check_hours(task.duration_hours, || format!("task {}", task.id))?;
            if node_map.contains_key(&task.id) {
                return Err(Error::DuplicateTask(task.id.clone()));
            }
            let node = graph.add_node(task);
            node_map.insert(&task.id, node);
        }

        for edge in &snapshot.edges {
            check_hours(edge.lag_hours, || format!("dependency {}", edge.id))?;
            let lookup = |id: &TaskId| {
                node_map
                    .get(id)
                    .copied()
                    .ok_or_else(|| Error::UnknownTaskReference {
                        edge: edge.id.clone(),
                        task: id.clone(),
                    })
            };
            let source = lookup(&edge.depends_on_task_id)?;
            let target = lookup(&edge.task_id)?;
            graph.add_edge(source, target, edge);
        }

        tracing::debug!(
            tasks = graph.node_count(),
            edges = graph.edge_count(),
            "Built dependency graph"
        );

        Ok(Self { graph, node_map })
    }

    /// Resolve a task ID to its node.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` if the task is not in the snapshot.
    pub fn node(&self, id: &TaskId) -> Result<NodeIndex> {
        self.node_map
            .get(id)
            .copied()
            .ok_or_else(|| Error::TaskNotFound(id.clone()))
    }

    /// Whether the snapshot contains the task.
    #[must_use]
    pub fn contains(&self, id: &TaskId) -> bool {
        self.node_map.contains_key(id)
    }

    /// The task stored at `node`.
    #[must_use]
    pub fn task(&self, node: NodeIndex) -> &'a Task {
        self.graph[node]
    }

    /// Number of tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All nodes, in snapshot order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Neighbours of `node` in the given direction, paired with the connecting edge.
    pub fn neighbors(
        &self,
        node: NodeIndex,
        traversal: Traversal,
    ) -> impl Iterator<Item = (NodeIndex, &'a DependencyEdge)> + '_ {
        let direction = traversal.petgraph_direction();
        self.graph.edges_directed(node, direction).map(move |edge| {
            let other = match direction {
                Direction::Incoming => edge.source(),
                Direction::Outgoing => edge.target(),
            };
            (other, *edge.weight())
        })
    }

    /// Predecessors of `node` with the edge leading into `node`.
    pub fn predecessors(
        &self,
        node: NodeIndex,
    ) -> impl Iterator<Item = (NodeIndex, &'a DependencyEdge)> + '_ {
        self.neighbors(node, Traversal::Upstream)
    }

    /// Successors of `node` with the edge leading out of `node`.
    pub fn successors(
        &self,
        node: NodeIndex,
    ) -> impl Iterator<Item = (NodeIndex, &'a DependencyEdge)> + '_ {
        self.neighbors(node, Traversal::Downstream)
    }

    /// Number of predecessor edges of `node`.
    #[must_use]
    pub fn in_degree(&self, node: NodeIndex) -> usize {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .count()
    }

    /// Find an existing edge for "`task` depends on `depends_on`".
    #[must_use]
    pub fn find_edge(&self, task: NodeIndex, depends_on: NodeIndex) -> Option<&'a DependencyEdge> {
        self.graph
            .find_edge(depends_on, task)
            .map(|edge| self.graph[edge])
    }
}

fn check_hours(value: f64, subject: impl FnOnce() -> String) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidHours {
            subject: subject(),
            value,
        })
    }
}
