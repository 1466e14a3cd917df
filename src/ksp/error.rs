// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::NodeId;

/// Malformed path queries, rejected by [k_shortest_simple_paths](crate::k_shortest_simple_paths)
/// before any search begins.
///
/// Not finding any path, or finding less paths than requested, is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum KspError {
    /// The source or target node doesn't exist in the graph.
    #[error("invalid node: {0}")]
    InvalidReference(NodeId),

    /// Source and target are the same node.
    #[error("source and target are the same node: {0}")]
    SameSourceAndTarget(NodeId),

    /// Zero paths were requested.
    #[error("at least one path must be requested")]
    ZeroPaths,
}
