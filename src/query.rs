// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::emit::{self, PathRecord};
use crate::{k_shortest_simple_paths, Graph, KspError, Locator, Node, NodeId, Path};

/// Number of paths requested when not specified otherwise.
pub const DEFAULT_K: usize = 4;

/// Request for the `k` cheapest loopless paths between two positions.
///
/// Positions are (latitude, longitude) pairs in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Query {
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub k: usize,
}

/// Malformed queries, rejected before any path search begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("no node found near the start position")]
    NoStartNode,

    #[error("no node found near the end position")]
    NoEndNode,

    #[error("start and end positions resolve to the same node {0}")]
    SameNode(NodeId),

    #[error("path search: {0}")]
    Search(#[from] KspError),
}

/// Summary of how a search went, as far as the caller is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// All requested paths were found.
    Complete,

    /// Less paths than requested exist between the two nodes.
    Shortfall { found: usize, requested: usize },

    /// The two nodes are not connected.
    NoPath,
}

/// Result of a successfully resolved [Query].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    /// Node closest to the start position.
    pub start: Node,

    /// Node closest to the end position.
    pub end: Node,

    /// Number of requested paths.
    pub requested: usize,

    /// Found paths, by non-decreasing weight.
    pub paths: Vec<Path>,
}

impl QueryOutcome {
    pub fn status(&self) -> SearchStatus {
        match self.paths.len() {
            0 => SearchStatus::NoPath,
            found if found < self.requested => SearchStatus::Shortfall {
                found,
                requested: self.requested,
            },
            _ => SearchStatus::Complete,
        }
    }

    /// Flattens the found paths into output rows, see [emit::emit].
    pub fn records(&self, g: &Graph) -> Result<Vec<PathRecord>, emit::Error> {
        emit::emit(g, &self.paths)
    }
}

/// Resolves both query positions to their nearest nodes (using the provided [Locator]),
/// and finds up to `k` loopless paths between them in the graph.
///
/// Not finding enough (or any) paths is not an error; see [QueryOutcome::status].
pub fn run_query<L: Locator + ?Sized>(
    g: &Graph,
    locator: &L,
    query: &Query,
) -> Result<QueryOutcome, QueryError> {
    let (start_lat, start_lon) = query.start;
    let (end_lat, end_lon) = query.end;

    let start = locator
        .nearest(start_lat, start_lon)
        .ok_or(QueryError::NoStartNode)?;
    log::info!("start position ({start_lat}, {start_lon}) -> node {}", start.id);

    let end = locator
        .nearest(end_lat, end_lon)
        .ok_or(QueryError::NoEndNode)?;
    log::info!("end position ({end_lat}, {end_lon}) -> node {}", end.id);

    if start.id == end.id {
        return Err(QueryError::SameNode(start.id));
    }

    let paths = k_shortest_simple_paths(g, start.id, end.id, query.k)?;
    for (rank, path) in paths.iter().enumerate() {
        log::info!(
            "path {}: {:.2} m, {} nodes",
            rank + 1,
            path.weight,
            path.len()
        );
        log::debug!("path {}: {:?}", rank + 1, path.nodes);
    }

    let outcome = QueryOutcome {
        start,
        end,
        requested: query.k,
        paths,
    };

    match outcome.status() {
        SearchStatus::Complete => {}
        SearchStatus::Shortfall { found, requested } => {
            log::warn!("only {found} paths found between nodes {} and {}, {requested} requested", start.id, end.id)
        }
        SearchStatus::NoPath => log::warn!("no path between nodes {} and {}", start.id, end.id),
    }

    Ok(outcome)
}
