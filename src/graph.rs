// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{earth_distance, Edge, Node, NodeId};
use std::collections::btree_map::{BTreeMap, Entry};

/// Represents a road network as a set of [Nodes](Node)
/// and undirected, weighted [Edges](Edge) between them.
///
/// Every undirected edge is stored twice, once in the adjacency list of each endpoint.
/// At most one edge may exist between a pair of nodes. Graphs are only populated by
/// [build](crate::build) and are read-only afterwards, so a single graph can be
/// shared by any number of concurrent queries.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph(BTreeMap<NodeId, (Node, Vec<Edge>)>);

impl Graph {
    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of undirected edges in the graph.
    pub fn edge_count(&self) -> usize {
        let (loops, others) = self
            .0
            .iter()
            .flat_map(|(&id, (_, edges))| edges.iter().map(move |e| e.to == id))
            .fold((0, 0), |(loops, others), is_loop| {
                if is_loop {
                    (loops + 1, others)
                } else {
                    (loops, others + 1)
                }
            });
        loops + others / 2
    }

    /// Returns an iterator over all [Nodes](Node) in the graph, in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.0.values().map(|(node, _)| node)
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: NodeId) -> Option<Node> {
        self.0.get(&id).map(|&(node, _)| node)
    }

    /// Returns `true` if a node with the provided id exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.0.contains_key(&id)
    }

    /// Creates or updates a [Node] with `node.id`.
    ///
    /// All edges are preserved, and are not re-weighted.
    pub(crate) fn set_node(&mut self, node: Node) {
        match self.0.entry(node.id) {
            Entry::Vacant(e) => {
                e.insert((node, Vec::default()));
            }
            Entry::Occupied(mut e) => {
                debug_assert_eq!(e.get().0.id, node.id);
                e.get_mut().0 = node;
            }
        }
    }

    /// Finds the closest [Node] to the given position, by great-circle distance.
    ///
    /// This function requires computing the distance to every [Node] in the graph.
    /// If multiple nodes are equally close, the one with the lowest id wins.
    /// Returns `None` only for empty graphs.
    pub fn find_nearest_node(&self, lat: f64, lon: f64) -> Option<Node> {
        self.iter()
            .map(|&nd| (earth_distance(lat, lon, nd.lat, nd.lon), nd))
            .min_by(|(a_dist, _), (b_dist, _)| a_dist.total_cmp(b_dist))
            .map(|(_, nd)| nd)
    }

    /// Gets all [Edges](Edge) incident to a node with a given id.
    pub fn get_edges(&self, from_id: NodeId) -> &[Edge] {
        self.0
            .get(&from_id)
            .map(|(_, e)| e.as_slice())
            .unwrap_or_default()
    }

    /// Gets the weight of the edge between two nodes.
    /// If such an edge doesn't exist, returns [f64::INFINITY].
    pub fn get_edge(&self, from_id: NodeId, to_id: NodeId) -> f64 {
        self.get_edges(from_id)
            .iter()
            .find(|edge| edge.to == to_id)
            .map(|edge| edge.weight)
            .unwrap_or(f64::INFINITY)
    }

    /// Creates or updates the undirected edge between `a` and `b`.
    /// An existing edge between the two nodes has its weight replaced.
    ///
    /// Does nothing if either of the nodes doesn't exist.
    pub(crate) fn set_edge(&mut self, a: NodeId, b: NodeId, weight: f64) {
        debug_assert!(weight >= 0.0);
        if !self.contains(a) || !self.contains(b) {
            return;
        }

        self.set_half_edge(a, Edge { to: b, weight });
        if a != b {
            self.set_half_edge(b, Edge { to: a, weight });
        }
    }

    fn set_half_edge(&mut self, from_id: NodeId, edge: Edge) {
        if let Some((_, edges)) = self.0.get_mut(&from_id) {
            if let Some(candidate) = edges.iter_mut().find(|e| e.to == edge.to) {
                *candidate = edge;
            } else {
                edges.push(edge);
            }
        }
    }

    /// Calculates the total weight of a sequence of nodes, summing the weights
    /// of consecutive edges in order.
    ///
    /// Returns `None` if any two consecutive nodes are not connected.
    /// Sequences with less than two nodes have a weight of zero.
    pub fn path_weight(&self, nodes: &[NodeId]) -> Option<f64> {
        nodes.windows(2).try_fold(0.0, |total, pair| {
            let weight = self.get_edge(pair[0], pair[1]);
            if weight.is_finite() {
                Some(total + weight)
            } else {
                None
            }
        })
    }
}
