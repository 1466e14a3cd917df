// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! K shortest loopless paths over road network tables.
//!
//! Nodes and edges of a road network are loaded from tabular records into an
//! undirected, weighted [Graph]. Two query coordinates are snapped to their
//! nearest graph nodes, and [Yen's algorithm](https://en.wikipedia.org/wiki/Yen%27s_algorithm)
//! enumerates the k cheapest simple paths between them. Found paths can be flattened
//! into [PathRecords](emit::PathRecord) and written out as CSV.
//!
//! # Example
//!
//! ```no_run
//! let options = kroute::table::Options::default();
//! let g = kroute::table::load_graph_from_files(
//!     &options,
//!     "path/to/road_network_nodes.csv",
//!     "path/to/road_network_edges.csv",
//! ).expect("failed to load the road network");
//!
//! let query = kroute::Query {
//!     start: (35.985924, 120.146173),
//!     end: (35.979291, 120.161095),
//!     k: kroute::DEFAULT_K,
//! };
//! let outcome = kroute::run_query(&g, &g, &query).expect("invalid query");
//!
//! for path in &outcome.paths {
//!     println!("{:.2} m: {:?}", path.weight, path.nodes);
//! }
//! ```

mod builder;
mod distance;
pub mod emit;
mod graph;
mod kd;
mod ksp;
mod locate;
mod query;
pub mod table;

pub use builder::{build, EdgeRecord, NodeRecord};
pub use distance::earth_distance;
pub use graph::Graph;
pub use kd::KDTree;
pub use ksp::{k_shortest_simple_paths, KShortestPaths, KspError, Path};
pub use locate::Locator;
pub use query::{run_query, Query, QueryError, QueryOutcome, SearchStatus, DEFAULT_K};

/// Identifier of a [Node], usually an OpenStreetMap node id.
pub type NodeId = i64;

/// Represents a vertex of the road network [Graph].
///
/// Positions are WGS84 decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

/// Represents one direction of an undirected road segment,
/// as stored in the adjacency list of a specific [Node].
///
/// `weight` is expressed in meters and is never negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: NodeId,
    pub weight: f64,
}
