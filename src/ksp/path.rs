// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::cmp::Ordering;

use crate::NodeId;

/// A loopless sequence of connected nodes, together with its total weight in meters.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub nodes: Vec<NodeId>,
    pub weight: f64,
}

impl Path {
    /// Returns the number of nodes on the path.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the path has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the first node of the path.
    pub fn source(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// Returns the last node of the path.
    pub fn target(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Ranks paths by ascending weight, and then by their node sequences.
    /// This is a total order, used to make the candidate pool deterministic.
    pub(super) fn rank_cmp(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then_with(|| self.nodes.cmp(&other.nodes))
    }
}
