// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{Graph, KDTree, Node};

/// Locator resolves a query position into the closest [Node] of a road network,
/// by great-circle distance.
///
/// [Graph] implements it with an exhaustive scan, [KDTree] with a spatial index.
pub trait Locator {
    /// Finds the [Node] closest to the given position.
    /// Returns `None` if there are no nodes to choose from.
    fn nearest(&self, lat: f64, lon: f64) -> Option<Node>;
}

impl Locator for Graph {
    fn nearest(&self, lat: f64, lon: f64) -> Option<Node> {
        self.find_nearest_node(lat, lon)
    }
}

impl Locator for KDTree {
    fn nearest(&self, lat: f64, lon: f64) -> Option<Node> {
        Some(self.find_nearest_node(lat, lon))
    }
}

impl<L: Locator> Locator for Option<L> {
    fn nearest(&self, lat: f64, lon: f64) -> Option<Node> {
        self.as_ref().and_then(|l| l.nearest(lat, lon))
    }
}
