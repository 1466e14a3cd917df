// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap, HashSet};

use super::Path;
use crate::{Edge, Graph, NodeId};

/// Nodes and edges hidden from a [shortest_path] search.
///
/// Exclusions are query-local, so that the [Graph] itself is never modified.
#[derive(Debug, Default, Clone)]
pub(super) struct Exclusions {
    nodes: HashSet<NodeId>,
    edges: HashSet<(NodeId, NodeId)>,
}

impl Exclusions {
    pub(super) fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    pub(super) fn exclude_node(&mut self, id: NodeId) {
        self.nodes.insert(id);
    }

    /// Hides the undirected edge between `a` and `b`, in both directions.
    pub(super) fn exclude_edge(&mut self, a: NodeId, b: NodeId) {
        self.edges.insert(Self::edge_key(a, b));
    }

    fn allows(&self, from: NodeId, to: NodeId) -> bool {
        !self.nodes.contains(&to) && !self.edges.contains(&Self::edge_key(from, to))
    }

    #[inline]
    fn edge_key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: NodeId,
    cost: f64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for QueueItem {}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower costs (and then lower ids) are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.at.cmp(&self.at))
    }
}

fn reconstruct_path(came_from: &HashMap<NodeId, NodeId>, mut last: NodeId) -> Vec<NodeId> {
    let mut path = vec![last];

    while let Some(&nd) = came_from.get(&last) {
        path.push(nd);
        last = nd;
    }

    path.reverse();
    path
}

/// Uses [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// to find the cheapest path between two nodes, skipping anything hidden by `excluded`.
///
/// The start node itself is never considered excluded. Among equally cheap paths,
/// nodes with lower ids are expanded first, and the first predecessor to reach a node wins.
///
/// Returns `None` if there is no path between the two nodes.
pub(super) fn shortest_path(
    g: &Graph,
    from_id: NodeId,
    to_id: NodeId,
    excluded: &Exclusions,
) -> Option<Path> {
    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
    let mut came_from: HashMap<NodeId, NodeId> = HashMap::default();
    let mut known_costs: HashMap<NodeId, f64> = HashMap::default();

    queue.push(QueueItem {
        at: from_id,
        cost: 0.0,
    });
    known_costs.insert(from_id, 0.0);

    while let Some(item) = queue.pop() {
        if item.at == to_id {
            return Some(Path {
                nodes: reconstruct_path(&came_from, to_id),
                weight: item.cost,
            });
        }

        // Multiple items may be kept in the queue for the same node; skip outdated ones.
        if item.cost > known_costs.get(&item.at).copied().unwrap_or(f64::INFINITY) {
            continue;
        }

        for &Edge {
            to: neighbor_id,
            weight,
        } in g.get_edges(item.at)
        {
            if neighbor_id == from_id || !excluded.allows(item.at, neighbor_id) {
                continue;
            }

            let neighbor_cost = item.cost + weight;
            if neighbor_cost
                >= known_costs
                    .get(&neighbor_id)
                    .copied()
                    .unwrap_or(f64::INFINITY)
            {
                continue;
            }

            came_from.insert(neighbor_id, item.at);
            known_costs.insert(neighbor_id, neighbor_cost);
            queue.push(QueueItem {
                at: neighbor_id,
                cost: neighbor_cost,
            });
        }
    }

    None
}
