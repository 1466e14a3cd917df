// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{earth_distance, Graph, Node, NodeId};

/// A single row of the nodes table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRecord {
    pub id: NodeId,
    pub lon: f64,
    pub lat: f64,
}

/// A single row of the edges table.
///
/// If `length` is `None`, the edge weight is the great-circle distance
/// between both endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRecord {
    pub u: NodeId,
    pub v: NodeId,
    pub length: Option<f64>,
}

/// Builds a [Graph] from node and edge records.
///
/// Nodes with duplicate ids overwrite each other (last one wins). Edges are undirected;
/// a repeated edge between the same pair of nodes replaces the earlier weight.
///
/// Edges referencing unknown nodes, and edges with a negative or non-finite length,
/// are skipped with a warning. Building never fails.
pub fn build<N, E>(nodes: N, edges: E) -> Graph
where
    N: IntoIterator<Item = NodeRecord>,
    E: IntoIterator<Item = EdgeRecord>,
{
    let mut builder = GraphBuilder::default();
    nodes.into_iter().for_each(|n| builder.add_node(n));
    edges.into_iter().for_each(|e| builder.add_edge(e));
    builder.finish()
}

/// Helper object used for storing state related to converting records into a [Graph].
#[derive(Debug, Default)]
struct GraphBuilder {
    g: Graph,
    skipped_edges: usize,
}

impl GraphBuilder {
    fn add_node(&mut self, n: NodeRecord) {
        self.g.set_node(Node {
            id: n.id,
            lat: n.lat,
            lon: n.lon,
        });
    }

    fn add_edge(&mut self, e: EdgeRecord) {
        let (left, right) = match (self.g.get_node(e.u), self.g.get_node(e.v)) {
            (Some(left), Some(right)) => (left, right),
            (None, _) => return self.skip_edge(&e, format_args!("unknown node {}", e.u)),
            (_, None) => return self.skip_edge(&e, format_args!("unknown node {}", e.v)),
        };

        let weight = match e.length {
            Some(length) if length.is_finite() && length >= 0.0 => length,
            Some(length) => return self.skip_edge(&e, format_args!("invalid length {length}")),
            None => earth_distance(left.lat, left.lon, right.lat, right.lon),
        };

        self.g.set_edge(left.id, right.id, weight);
    }

    fn skip_edge(&mut self, e: &EdgeRecord, reason: std::fmt::Arguments<'_>) {
        log::warn!("skipping edge {}-{}: {}", e.u, e.v, reason);
        self.skipped_edges += 1;
    }

    fn finish(self) -> Graph {
        if self.skipped_edges > 0 {
            log::warn!("{} edges were skipped", self.skipped_edges);
        }
        log::info!(
            "graph built: {} nodes, {} edges",
            self.g.len(),
            self.g.edge_count()
        );
        self.g
    }
}
