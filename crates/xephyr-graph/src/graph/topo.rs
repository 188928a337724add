//! Deterministic topological ordering (Kahn's algorithm).

use super::GraphModel;
use crate::domain::TaskId;
use crate::error::{Error, Result};
use petgraph::graph::NodeIndex;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// A topological order of every task in a [`GraphModel`].
#[derive(Debug, Clone)]
pub struct TopologicalOrder {
    nodes: Vec<NodeIndex>,
    position: HashMap<NodeIndex, usize>,
}

impl TopologicalOrder {
    /// Nodes, predecessors before successors.
    #[must_use]
    pub fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    /// Index of `node` within the order.
    #[must_use]
    pub fn position(&self, node: NodeIndex) -> Option<usize> {
        self.position.get(&node).copied()
    }

    /// The order as task IDs.
    #[must_use]
    pub fn task_ids(&self, model: &GraphModel<'_>) -> Vec<TaskId> {
        self.nodes
            .iter()
            .map(|&node| model.task(node).id.clone())
            .collect()
    }
}

impl GraphModel<'_> {
    /// Order all tasks so every predecessor precedes its successors.
    ///
    /// Among tasks that are eligible at the same time, the smallest task ID
    /// is emitted first, so the order depends only on the snapshot contents.
    ///
    /// # Errors
    ///
    /// Returns `Error::CyclicGraph` if some tasks keep a residual in-degree.
    pub fn topological_order(&self) -> Result<TopologicalOrder> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .nodes()
            .map(|node| (node, self.in_degree(node)))
            .collect();

        let mut ready: BinaryHeap<Reverse<(&TaskId, NodeIndex)>> = in_degree
            .iter()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(&node, _)| Reverse((&self.task(node).id, node)))
            .collect();

        let mut nodes = Vec::with_capacity(self.task_count());

        while let Some(Reverse((_, node))) = ready.pop() {
            nodes.push(node);

            for (successor, _) in self.successors(node) {
                if let Some(degree) = in_degree.get_mut(&successor) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse((&self.task(successor).id, successor)));
                    }
                }
            }
        }

        if nodes.len() != self.task_count() {
            let err = Error::CyclicGraph {
                unordered: self.task_count() - nodes.len(),
                total: self.task_count(),
            };
            tracing::error!(error = %err, "Acyclic invariant violated in committed dependency graph");
            return Err(err);
        }

        let position = nodes
            .iter()
            .enumerate()
            .map(|(index, &node)| (node, index))
            .collect();

        Ok(TopologicalOrder { nodes, position })
    }
}
