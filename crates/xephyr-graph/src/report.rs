//! Per-task dependency reports and the project graph view.
//!
//! Both reports are read-only projections of an already scheduled snapshot:
//! they take the [`GraphModel`], its [`TopologicalOrder`] and the
//! [`CriticalPathResult`] computed from them.

use crate::domain::{DependencyType, EdgeId, TaskId, TaskStatus};
use crate::error::Result;
use crate::graph::{DependencyPath, GraphModel, TopologicalOrder, Traversal};
use crate::schedule::CriticalPathResult;
use crate::status::is_blocking;
use petgraph::graph::NodeIndex;
use serde::Serialize;

/// Horizontal and vertical spacing between laid-out nodes
const LAYOUT_SPACING: f64 = 100.0;

/// A task this task directly depends on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectDependency {
    /// The connecting edge
    pub dependency_id: EdgeId,
    /// The predecessor
    pub depends_on_task_id: TaskId,
    /// Type of dependency
    pub dependency_type: DependencyType,
    /// Lag in hours
    pub lag_hours: f64,
    /// The predecessor's status
    pub status: TaskStatus,
    /// Whether this edge keeps the task from starting
    pub is_blocking: bool,
}

/// A task that directly depends on this task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectDependent {
    /// The connecting edge
    pub dependency_id: EdgeId,
    /// The successor
    pub task_id: TaskId,
    /// Type of dependency
    pub dependency_type: DependencyType,
    /// Lag in hours
    pub lag_hours: f64,
    /// Whether this task currently blocks the successor
    pub is_blocked: bool,
}

/// Predecessors of the task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencySection {
    /// Immediate predecessors, ordered by task ID
    pub direct: Vec<DirectDependency>,
    /// Transitive predecessors at depth 2 or more
    pub indirect: Vec<DependencyPath>,
}

/// Successors of the task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependentsSection {
    /// Immediate successors, ordered by task ID
    pub direct: Vec<DirectDependent>,
    /// Transitive successors at depth 2 or more
    pub indirect: Vec<DependencyPath>,
}

/// Where the task sits relative to the critical path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainPosition {
    /// The task has zero float
    OnPath,
    /// The task has slack
    OffPath,
}

/// Chain statistics for the task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainAnalysis {
    /// Tasks in the longest dependency chain passing through this task
    pub longest_chain: usize,
    /// Critical path membership
    pub position: ChainPosition,
    /// The task's float
    pub float_hours: f64,
}

/// Everything known about one task's dependencies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDependencyReport {
    /// The reported task
    pub task_id: TaskId,
    /// What the task waits on
    pub dependencies: DependencySection,
    /// What waits on the task
    pub dependents: DependentsSection,
    /// Chain statistics
    pub chain: ChainAnalysis,
}

/// A node of the project graph view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    /// Task ID
    pub id: TaskId,
    /// Task title
    pub title: String,
    /// Task status
    pub status: TaskStatus,
    /// Layer coordinate
    pub x: f64,
    /// Position within the layer
    pub y: f64,
    /// Whether the task has zero float
    pub critical: bool,
}

/// An edge of the project graph view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// Edge ID
    pub id: EdgeId,
    /// Predecessor
    pub source: TaskId,
    /// Successor
    pub target: TaskId,
    /// Type of dependency
    #[serde(rename = "type")]
    pub dependency_type: DependencyType,
    /// Lag in hours
    pub lag_hours: f64,
}

/// The whole project as a laid-out graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyGraphView {
    /// Tasks in topological order
    pub nodes: Vec<GraphNode>,
    /// Edges ordered by ID
    pub edges: Vec<GraphEdge>,
}

/// Builds reports over one scheduled snapshot.
pub struct Reporter<'g, 'a> {
    model: &'g GraphModel<'a>,
    order: &'g TopologicalOrder,
    schedule: &'g CriticalPathResult,
}

impl<'g, 'a> Reporter<'g, 'a> {
    /// Create a reporter. `order` and `schedule` must be derived from `model`.
    #[must_use]
    pub fn new(
        model: &'g GraphModel<'a>,
        order: &'g TopologicalOrder,
        schedule: &'g CriticalPathResult,
    ) -> Self {
        Self {
            model,
            order,
            schedule,
        }
    }

    /// Report on one task's predecessors, successors and chain.
    ///
    /// Indirect sections stay empty unless `include_indirect` is set.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` if the task is not in the snapshot.
    pub fn task_dependencies(
        &self,
        id: &TaskId,
        include_indirect: bool,
    ) -> Result<TaskDependencyReport> {
        let node = self.model.node(id)?;
        let task = self.model.task(node);

        let mut direct_dependencies: Vec<DirectDependency> = self
            .model
            .predecessors(node)
            .map(|(pred, edge)| {
                let predecessor = self.model.task(pred);
                DirectDependency {
                    dependency_id: edge.id.clone(),
                    depends_on_task_id: predecessor.id.clone(),
                    dependency_type: edge.dependency_type,
                    lag_hours: edge.lag_hours,
                    status: predecessor.status,
                    is_blocking: is_blocking(edge, predecessor.status),
                }
            })
            .collect();
        direct_dependencies.sort_by(|a, b| a.depends_on_task_id.cmp(&b.depends_on_task_id));

        let mut direct_dependents: Vec<DirectDependent> = self
            .model
            .successors(node)
            .map(|(succ, edge)| DirectDependent {
                dependency_id: edge.id.clone(),
                task_id: self.model.task(succ).id.clone(),
                dependency_type: edge.dependency_type,
                lag_hours: edge.lag_hours,
                is_blocked: is_blocking(edge, task.status),
            })
            .collect();
        direct_dependents.sort_by(|a, b| a.task_id.cmp(&b.task_id));

        let indirect = |traversal| -> Result<Vec<DependencyPath>> {
            if !include_indirect {
                return Ok(Vec::new());
            }
            Ok(self
                .model
                .dependency_paths(id, traversal)?
                .into_iter()
                .filter(|p| p.depth >= 2)
                .collect())
        };

        let float_hours = self.schedule.float_by_task.get(id).copied().unwrap_or(0.0);
        let position = if self.schedule.is_critical(id) {
            ChainPosition::OnPath
        } else {
            ChainPosition::OffPath
        };

        Ok(TaskDependencyReport {
            task_id: id.clone(),
            dependencies: DependencySection {
                direct: direct_dependencies,
                indirect: indirect(Traversal::Upstream)?,
            },
            dependents: DependentsSection {
                direct: direct_dependents,
                indirect: indirect(Traversal::Downstream)?,
            },
            chain: ChainAnalysis {
                longest_chain: self.longest_chain_through(node),
                position,
                float_hours,
            },
        })
    }

    /// Lay out the whole project by longest-path layers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn dependency_graph(&self) -> DependencyGraphView {
        let layers = self.layers();
        let mut rows = vec![0usize; self.model.task_count()];

        let nodes = self
            .order
            .nodes()
            .iter()
            .map(|&node| {
                let task = self.model.task(node);
                let layer = layers[node.index()];
                let row = rows[layer];
                rows[layer] += 1;
                GraphNode {
                    id: task.id.clone(),
                    title: task.title.clone(),
                    status: task.status,
                    x: layer as f64 * LAYOUT_SPACING,
                    y: row as f64 * LAYOUT_SPACING,
                    critical: self.schedule.is_critical(&task.id),
                }
            })
            .collect();

        let mut edges: Vec<GraphEdge> = self
            .model
            .nodes()
            .flat_map(|node| self.model.successors(node))
            .map(|(_, edge)| GraphEdge {
                id: edge.id.clone(),
                source: edge.depends_on_task_id.clone(),
                target: edge.task_id.clone(),
                dependency_type: edge.dependency_type,
                lag_hours: edge.lag_hours,
            })
            .collect();
        edges.sort_by(|a, b| a.id.cmp(&b.id));

        DependencyGraphView { nodes, edges }
    }

    /// Longest-path layer (edge count from a source) of every node.
    fn layers(&self) -> Vec<usize> {
        let mut layers = vec![0usize; self.model.task_count()];
        for &node in self.order.nodes() {
            let layer = self
                .model
                .predecessors(node)
                .map(|(pred, _)| layers[pred.index()] + 1)
                .max()
                .unwrap_or(0);
            layers[node.index()] = layer;
        }
        layers
    }

    fn longest_chain_through(&self, node: NodeIndex) -> usize {
        let n = self.model.task_count();

        // Tasks in the longest chain ending at / starting from each node.
        let mut ending = vec![1usize; n];
        for &current in self.order.nodes() {
            ending[current.index()] = self
                .model
                .predecessors(current)
                .map(|(pred, _)| ending[pred.index()] + 1)
                .max()
                .unwrap_or(1);
        }

        let mut starting = vec![1usize; n];
        for &current in self.order.nodes().iter().rev() {
            starting[current.index()] = self
                .model
                .successors(current)
                .map(|(succ, _)| starting[succ.index()] + 1)
                .max()
                .unwrap_or(1);
        }

        ending[node.index()] + starting[node.index()] - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelSignal;
    use crate::domain::{DependencyEdge, Snapshot, Task};
    use crate::schedule::CriticalPathCalculator;

    fn with_reporter<T>(snapshot: &Snapshot, f: impl FnOnce(&Reporter<'_, '_>) -> T) -> T {
        let model = GraphModel::build(snapshot).unwrap();
        let order = model.topological_order().unwrap();
        let schedule = CriticalPathCalculator::new(1e-9)
            .calculate(&model, &order, &CancelSignal::new())
            .unwrap();
        f(&Reporter::new(&model, &order, &schedule))
    }

    // a(4) -> b(4) -> c(4), a -> d(1)
    fn project() -> Snapshot {
        Snapshot::new(
            vec![
                Task::new("a", 4.0)
                    .with_title("Design")
                    .with_status(TaskStatus::Done),
                Task::new("b", 4.0).with_status(TaskStatus::InProgress),
                Task::new("c", 4.0),
                Task::new("d", 1.0),
            ],
            vec![
                DependencyEdge::new("e1", "b", "a"),
                DependencyEdge::new("e2", "c", "b"),
                DependencyEdge::new("e3", "d", "a"),
            ],
        )
    }

    #[test]
    fn test_direct_sections() {
        let report = with_reporter(&project(), |r| {
            r.task_dependencies(&TaskId::new("b"), false).unwrap()
        });

        assert_eq!(report.dependencies.direct.len(), 1);
        let dep = &report.dependencies.direct[0];
        assert_eq!(dep.depends_on_task_id, TaskId::new("a"));
        assert!(!dep.is_blocking);

        assert_eq!(report.dependents.direct.len(), 1);
        let dependent = &report.dependents.direct[0];
        assert_eq!(dependent.task_id, TaskId::new("c"));
        assert!(dependent.is_blocked);

        assert!(report.dependencies.indirect.is_empty());
        assert!(report.dependents.indirect.is_empty());
    }

    #[test]
    fn test_indirect_sections_skip_direct_neighbours() {
        let report = with_reporter(&project(), |r| {
            r.task_dependencies(&TaskId::new("c"), true).unwrap()
        });

        assert_eq!(report.dependencies.indirect.len(), 1);
        let indirect = &report.dependencies.indirect[0];
        assert_eq!(indirect.depth, 2);
        assert_eq!(
            indirect.path,
            vec![TaskId::new("c"), TaskId::new("b"), TaskId::new("a")]
        );
    }

    #[test]
    fn test_chain_analysis() {
        let snapshot = project();
        let on_path = with_reporter(&snapshot, |r| {
            r.task_dependencies(&TaskId::new("b"), false).unwrap()
        });
        assert_eq!(on_path.chain.longest_chain, 3);
        assert_eq!(on_path.chain.position, ChainPosition::OnPath);
        assert_eq!(on_path.chain.float_hours, 0.0);

        let off_path = with_reporter(&snapshot, |r| {
            r.task_dependencies(&TaskId::new("d"), false).unwrap()
        });
        assert_eq!(off_path.chain.longest_chain, 2);
        assert_eq!(off_path.chain.position, ChainPosition::OffPath);
        assert_eq!(off_path.chain.float_hours, 7.0);
    }

    #[test]
    fn test_graph_layout_by_layers() {
        let view = with_reporter(&project(), |r| r.dependency_graph());

        let coords: Vec<(&str, f64, f64)> = view
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n.x, n.y))
            .collect();
        assert_eq!(
            coords,
            vec![
                ("a", 0.0, 0.0),
                ("b", 100.0, 0.0),
                ("c", 200.0, 0.0),
                ("d", 100.0, 100.0),
            ]
        );
        assert!(view.nodes[0].critical);
        assert!(!view.nodes[3].critical);
        assert_eq!(view.nodes[0].title, "Design");
        assert_eq!(view.nodes[0].status, TaskStatus::Done);
        assert!(view.nodes[1].title.is_empty());

        let edge_ids: Vec<&str> = view.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edge_ids, vec!["e1", "e2", "e3"]);
        assert_eq!(view.edges[0].source, TaskId::new("a"));
        assert_eq!(view.edges[0].target, TaskId::new("b"));
    }

    #[test]
    fn test_edge_type_serializes_as_type() {
        let view = with_reporter(&project(), |r| r.dependency_graph());
        let json = serde_json::to_value(&view.edges[0]).unwrap();
        assert_eq!(json["type"], "finish_to_start");
        assert_eq!(json["lagHours"], 0.0);
    }
}
