//! Transitive ancestor/descendant queries.
//!
//! All traversals are iterative BFS with an explicit visited set, so they stay
//! bounded even on a graph that (against the invariant) contains a cycle.

use super::{GraphModel, Traversal};
use crate::domain::TaskId;
use crate::error::Result;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// A task reached from a starting task, with the shortest path to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyPath {
    /// The reached task
    pub task_id: TaskId,

    /// Tasks from the starting task (inclusive) to the reached task (inclusive)
    pub path: Vec<TaskId>,

    /// Number of edges between the starting task and the reached task
    pub depth: usize,
}

/// BFS result: discovery order plus parent pointers back towards the start.
pub(super) struct Reachable {
    pub(super) start: NodeIndex,
    pub(super) order: Vec<(NodeIndex, usize)>,
    pub(super) parents: HashMap<NodeIndex, NodeIndex>,
}

impl Reachable {
    /// Walk parent pointers from `node` back to the start.
    ///
    /// The returned list begins at `node` and ends at the start node.
    pub(super) fn path_to_start(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![node];
        let mut current = node;
        while current != self.start {
            match self.parents.get(&current) {
                Some(&parent) => {
                    path.push(parent);
                    current = parent;
                }
                None => break,
            }
        }
        path
    }

    pub(super) fn contains(&self, node: NodeIndex) -> bool {
        self.parents.contains_key(&node)
    }
}

impl GraphModel<'_> {
    /// Breadth-first traversal from `start`, excluding `start` from the result.
    ///
    /// Neighbours are visited in task-ID order so parent pointers (and hence
    /// reported paths) are deterministic.
    pub(super) fn reachable(&self, start: NodeIndex, traversal: Traversal) -> Reachable {
        let mut order = Vec::new();
        let mut parents = HashMap::new();
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([(start, 0usize)]);

        while let Some((current, depth)) = queue.pop_front() {
            let mut next: Vec<NodeIndex> = self
                .neighbors(current, traversal)
                .map(|(node, _)| node)
                .filter(|node| !visited.contains(node))
                .collect();
            next.sort_by(|a, b| self.task(*a).id.cmp(&self.task(*b).id));
            next.dedup();

            for node in next {
                if visited.insert(node) {
                    parents.insert(node, current);
                    order.push((node, depth + 1));
                    queue.push_back((node, depth + 1));
                }
            }
        }

        Reachable {
            start,
            order,
            parents,
        }
    }

    fn reachable_ids(&self, id: &TaskId, traversal: Traversal) -> Result<HashSet<TaskId>> {
        let start = self.node(id)?;
        Ok(self
            .reachable(start, traversal)
            .order
            .into_iter()
            .map(|(node, _)| self.task(node).id.clone())
            .collect())
    }

    /// All tasks transitively reachable over successor edges.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` if `id` is not in the snapshot.
    pub fn descendants(&self, id: &TaskId) -> Result<HashSet<TaskId>> {
        self.reachable_ids(id, Traversal::Downstream)
    }

    /// All tasks transitively reachable over predecessor edges.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` if `id` is not in the snapshot.
    pub fn ancestors(&self, id: &TaskId) -> Result<HashSet<TaskId>> {
        self.reachable_ids(id, Traversal::Upstream)
    }

    /// Every task reachable from `id` with its shortest path, in BFS order.
    ///
    /// # Errors
    ///
    /// Returns `Error::TaskNotFound` if `id` is not in the snapshot.
    pub fn dependency_paths(&self, id: &TaskId, traversal: Traversal) -> Result<Vec<DependencyPath>> {
        let start = self.node(id)?;
        let reachable = self.reachable(start, traversal);

        Ok(reachable
            .order
            .iter()
            .map(|&(node, depth)| {
                let mut path: Vec<TaskId> = reachable
                    .path_to_start(node)
                    .into_iter()
                    .map(|n| self.task(n).id.clone())
                    .collect();
                path.reverse();
                DependencyPath {
                    task_id: self.task(node).id.clone(),
                    path,
                    depth,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyEdge, Snapshot, Task};

    fn ids(values: &[&str]) -> HashSet<TaskId> {
        values.iter().map(|v| TaskId::new(*v)).collect()
    }

    //    A
    //   / \
    //  B   C
    //   \ /
    //    D
    fn diamond() -> Snapshot {
        Snapshot::new(
            ["a", "b", "c", "d"]
                .into_iter()
                .map(|id| Task::new(id, 1.0))
                .collect(),
            vec![
                DependencyEdge::new("e1", "b", "a"),
                DependencyEdge::new("e2", "c", "a"),
                DependencyEdge::new("e3", "d", "b"),
                DependencyEdge::new("e4", "d", "c"),
            ],
        )
    }

    #[test]
    fn test_descendants_of_diamond_root() {
        let snapshot = diamond();
        let model = GraphModel::build(&snapshot).unwrap();
        assert_eq!(
            model.descendants(&TaskId::new("a")).unwrap(),
            ids(&["b", "c", "d"])
        );
    }

    #[test]
    fn test_ancestors_of_diamond_sink() {
        let snapshot = diamond();
        let model = GraphModel::build(&snapshot).unwrap();
        assert_eq!(
            model.ancestors(&TaskId::new("d")).unwrap(),
            ids(&["a", "b", "c"])
        );
    }

    #[test]
    fn test_leaf_has_no_descendants() {
        let snapshot = diamond();
        let model = GraphModel::build(&snapshot).unwrap();
        assert!(model.descendants(&TaskId::new("d")).unwrap().is_empty());
        assert!(model.ancestors(&TaskId::new("a")).unwrap().is_empty());
    }

    #[test]
    fn test_dependency_paths_are_shortest_and_deterministic() {
        let snapshot = diamond();
        let model = GraphModel::build(&snapshot).unwrap();
        let paths = model
            .dependency_paths(&TaskId::new("d"), Traversal::Upstream)
            .unwrap();

        let to_a = paths.iter().find(|p| p.task_id.as_str() == "a").unwrap();
        assert_eq!(to_a.depth, 2);
        // b sorts before c, so b is the discovering parent of a
        assert_eq!(
            to_a.path,
            vec![TaskId::new("d"), TaskId::new("b"), TaskId::new("a")]
        );
    }

    #[test]
    fn test_traversal_terminates_on_corrupt_cycle() {
        let snapshot = Snapshot::new(
            vec![Task::new("x", 1.0), Task::new("y", 1.0)],
            vec![
                DependencyEdge::new("e1", "y", "x"),
                DependencyEdge::new("e2", "x", "y"),
            ],
        );
        let model = GraphModel::build(&snapshot).unwrap();
        assert_eq!(model.descendants(&TaskId::new("x")).unwrap(), ids(&["y"]));
    }
}
