// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{earth_distance, Node};

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree),
/// an alternative to the exhaustive [crate::Graph::find_nearest_node] scan for
/// resolving many query positions against a large road network.
///
/// Splits alternate between latitude and longitude, and a branch is only skipped if
/// the great-circle distance to its splitting axis exceeds the current best candidate.
/// This assumes the data does not cross the ante meridian (180°/-180° longitude) and
/// stays away from the poles. Among equally close nodes, the one with the lowest id
/// is returned, same as with [crate::Graph::find_nearest_node].
#[derive(Debug, Clone)]
pub struct KDTree {
    pivot: Node,
    left: Option<Box<KDTree>>,
    right: Option<Box<KDTree>>,
}

/// Closest node seen so far during a [KDTree] search.
#[derive(Debug, Clone, Copy)]
struct Best {
    node: Node,
    dist: f64,
}

impl Best {
    /// Replaces the candidate if `node` is closer, or equally close with a lower id.
    fn consider(&mut self, node: Node, dist: f64) {
        let ord = dist
            .total_cmp(&self.dist)
            .then_with(|| node.id.cmp(&self.node.id));
        if ord.is_lt() {
            *self = Self { node, dist };
        }
    }
}

impl KDTree {
    /// Finds the closest [Node] to the given position.
    pub fn find_nearest_node(&self, lat: f64, lon: f64) -> Node {
        let mut best = Best {
            node: self.pivot,
            dist: earth_distance(lat, lon, self.pivot.lat, self.pivot.lon),
        };
        self.search(lat, lon, false, &mut best);
        best.node
    }

    fn search(&self, lat: f64, lon: f64, lon_divides: bool, best: &mut Best) {
        best.consider(
            self.pivot,
            earth_distance(lat, lon, self.pivot.lat, self.pivot.lon),
        );

        let (near, far, axis_lat, axis_lon) = if lon_divides {
            let (near, far) = self.order_branches(lon < self.pivot.lon);
            (near, far, lat, self.pivot.lon)
        } else {
            let (near, far) = self.order_branches(lat < self.pivot.lat);
            (near, far, self.pivot.lat, lon)
        };

        if let Some(branch) = near {
            branch.search(lat, lon, !lon_divides, best);
        }

        // Nodes in the far branch can't be closer than the splitting axis.
        // Equally distant branches are still visited, as they may hold a lower id.
        if let Some(branch) = far {
            if earth_distance(lat, lon, axis_lat, axis_lon) <= best.dist {
                branch.search(lat, lon, !lon_divides, best);
            }
        }
    }

    fn order_branches(&self, left_first: bool) -> (Option<&KDTree>, Option<&KDTree>) {
        let left = self.left.as_deref();
        let right = self.right.as_deref();
        if left_first {
            (left, right)
        } else {
            (right, left)
        }
    }

    /// Builds a k-d tree from an iterable of [Nodes](Node).
    /// Returns `None` if there are no nodes.
    pub fn from_iter<I: IntoIterator<Item = Node>>(nodes: I) -> Option<Self> {
        let mut nodes = nodes.into_iter().collect::<Vec<_>>();
        Self::build(nodes.as_mut_slice())
    }

    /// Builds a k-d tree from a mutable slice of [Nodes](Node). Nodes will be reordered
    /// in the slice to facilitate building the tree.
    pub fn build(nodes: &mut [Node]) -> Option<Self> {
        Self::build_impl(nodes, false)
    }

    fn build_impl(nodes: &mut [Node], lon_divides: bool) -> Option<Self> {
        match nodes.len() {
            0 => None,
            1 => Some(Self {
                pivot: nodes[0],
                left: None,
                right: None,
            }),
            _ => {
                if lon_divides {
                    nodes.sort_by(|a, b| a.lon.total_cmp(&b.lon));
                } else {
                    nodes.sort_by(|a, b| a.lat.total_cmp(&b.lat));
                }
                let median = nodes.len() / 2;
                let pivot = nodes[median];
                let (left, right_and_pivot) = nodes.split_at_mut(median);
                let right = &mut right_and_pivot[1..];
                Some(Self {
                    pivot,
                    left: Self::build_impl(left, !lon_divides).map(Box::new),
                    right: Self::build_impl(right, !lon_divides).map(Box::new),
                })
            }
        }
    }
}
