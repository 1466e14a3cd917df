// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashSet};

use super::dijkstra::{shortest_path, Exclusions};
use super::{KspError, Path};
use crate::{Graph, NodeId};

/// Entry of the candidate pool; the cheapest candidate (as per [Path::rank_cmp]) is the "highest".
#[derive(Debug, Clone)]
struct Candidate(Path);

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.0.rank_cmp(&other.0).is_eq()
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.0.rank_cmp(&self.0)
    }
}

/// State of a [Yen's algorithm](https://en.wikipedia.org/wiki/Yen%27s_algorithm) search
/// for loopless paths between two nodes, in non-decreasing weight order.
///
/// Every call to [KShortestPaths::next_path] finishes one round of the search, and
/// callers may stop between any two calls. All state is local to the search;
/// the [Graph] is only ever read.
///
/// The first path is the one found by Dijkstra's algorithm. Subsequent paths are drawn
/// from the candidate pool by ascending weight, with ties broken by the lexicographically
/// smaller node id sequence.
#[derive(Debug)]
pub struct KShortestPaths<'a> {
    g: &'a Graph,
    source: NodeId,
    target: NodeId,
    found: Vec<Path>,
    candidates: BinaryHeap<Candidate>,
    seen: HashSet<Vec<NodeId>>,
    exhausted: bool,
}

impl<'a> KShortestPaths<'a> {
    /// Prepares a search between two distinct nodes of the graph.
    pub fn new(g: &'a Graph, source: NodeId, target: NodeId) -> Result<Self, KspError> {
        if !g.contains(source) {
            return Err(KspError::InvalidReference(source));
        }
        if !g.contains(target) {
            return Err(KspError::InvalidReference(target));
        }
        if source == target {
            return Err(KspError::SameSourceAndTarget(source));
        }

        Ok(Self {
            g,
            source,
            target,
            found: Vec::default(),
            candidates: BinaryHeap::default(),
            seen: HashSet::default(),
            exhausted: false,
        })
    }

    /// Returns all paths found so far, in ranking order.
    pub fn found(&self) -> &[Path] {
        &self.found
    }

    /// Consumes the search, returning all paths found so far.
    pub fn into_paths(self) -> Vec<Path> {
        self.found
    }

    /// Finds the next cheapest loopless path.
    ///
    /// Returns `None` once every simple path between the nodes has been found.
    pub fn next_path(&mut self) -> Option<&Path> {
        if self.exhausted {
            return None;
        }

        let next = if self.found.is_empty() {
            shortest_path(self.g, self.source, self.target, &Exclusions::default())
        } else {
            self.push_deviations();
            self.candidates.pop().map(|Candidate(p)| p)
        };

        match next {
            Some(path) => {
                self.seen.insert(path.nodes.clone());
                self.found.push(path);
                self.found.last()
            }
            None => {
                self.exhausted = true;
                None
            }
        }
    }

    /// Adds all deviations from the most recently found path to the candidate pool.
    fn push_deviations(&mut self) {
        let last = match self.found.last() {
            Some(p) => p.nodes.clone(),
            None => return,
        };

        let mut excluded = Exclusions::default();
        for i in 0..last.len() - 1 {
            let spur = last[i];
            let root = &last[..=i];

            // Hide edges leaving the root through which already-found paths continue,
            // and the root itself (except the spur node) to keep the result loopless.
            excluded.clear();
            self.found
                .iter()
                .filter(|p| p.nodes.len() > i + 1 && p.nodes[..=i] == *root)
                .for_each(|p| excluded.exclude_edge(p.nodes[i], p.nodes[i + 1]));
            root[..i].iter().for_each(|&n| excluded.exclude_node(n));

            let spur_path = match shortest_path(self.g, spur, self.target, &excluded) {
                Some(p) => p,
                None => continue,
            };

            let mut nodes = root[..i].to_vec();
            nodes.extend_from_slice(&spur_path.nodes);
            if self.seen.contains(&nodes) {
                continue;
            }

            // Weights are always recomputed from the source, so that
            // equal paths always compare equal.
            let Some(weight) = self.g.path_weight(&nodes) else {
                continue;
            };

            log::debug!(
                "candidate deviating at {} (index {}): {:.2} m, {} nodes",
                spur,
                i,
                weight,
                nodes.len()
            );
            self.seen.insert(nodes.clone());
            self.candidates.push(Candidate(Path { nodes, weight }));
        }
    }
}

/// Finds up to `k` loopless paths between `source` and `target`,
/// ordered by non-decreasing total weight. See [KShortestPaths] for the tie-breaking rule.
///
/// Less than `k` paths (possibly none) are returned if not enough simple paths exist
/// between the two nodes. Malformed queries are rejected with a [KspError].
pub fn k_shortest_simple_paths(
    g: &Graph,
    source: NodeId,
    target: NodeId,
    k: usize,
) -> Result<Vec<Path>, KspError> {
    if k == 0 {
        return Err(KspError::ZeroPaths);
    }

    let mut search = KShortestPaths::new(g, source, target)?;
    while search.found().len() < k && search.next_path().is_some() {}
    Ok(search.into_paths())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build, EdgeRecord, NodeRecord};

    fn graph(nodes: &[(NodeId, f64, f64)], edges: &[(NodeId, NodeId, f64)]) -> Graph {
        build(
            nodes
                .iter()
                .map(|&(id, lon, lat)| NodeRecord { id, lon, lat }),
            edges.iter().map(|&(u, v, length)| EdgeRecord {
                u,
                v,
                length: Some(length),
            }),
        )
    }

    fn check_paths(g: &Graph, paths: &[Path], source: NodeId, target: NodeId) {
        for p in paths {
            assert_eq!(p.source(), Some(source));
            assert_eq!(p.target(), Some(target));

            let unique: HashSet<NodeId> = p.nodes.iter().copied().collect();
            assert_eq!(unique.len(), p.len(), "path {:?} has a loop", p.nodes);

            assert_eq!(g.path_weight(&p.nodes), Some(p.weight));
        }

        for pair in paths.windows(2) {
            assert!(pair[0].weight <= pair[1].weight);
        }

        let distinct: HashSet<&[NodeId]> = paths.iter().map(|p| p.nodes.as_slice()).collect();
        assert_eq!(distinct.len(), paths.len());
    }

    // 2 ── 3
    // │    │
    // 1 ── 4
    fn square() -> Graph {
        graph(
            &[(1, 0.0, 0.0), (2, 0.0, 1.0), (3, 1.0, 1.0), (4, 1.0, 0.0)],
            &[(1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0), (4, 1, 1.0)],
        )
    }

    // 3×3 grid with unit weights:
    // 7 ── 8 ── 9
    // │    │    │
    // 4 ── 5 ── 6
    // │    │    │
    // 1 ── 2 ── 3
    fn grid() -> Graph {
        let nodes: Vec<_> = (0..9)
            .map(|i| (i + 1, (i % 3) as f64 * 0.001, (i / 3) as f64 * 0.001))
            .collect();
        let mut edges = vec![];
        for i in 1..=9 {
            if i % 3 != 0 {
                edges.push((i, i + 1, 1.0));
            }
            if i <= 6 {
                edges.push((i, i + 3, 1.0));
            }
        }
        graph(&nodes, &edges)
    }

    #[test]
    fn square_two_diagonal_routes() {
        let g = square();
        let paths = k_shortest_simple_paths(&g, 1, 3, 2).unwrap();
        assert_eq!(paths.len(), 2);
        check_paths(&g, &paths, 1, 3);
        assert_eq!(paths[0].nodes, vec![1, 2, 3]);
        assert_eq!(paths[1].nodes, vec![1, 4, 3]);
        assert_eq!(paths[0].weight, 2.0);
        assert_eq!(paths[1].weight, 2.0);
    }

    #[test]
    fn fewer_paths_than_requested() {
        let g = square();
        let paths = k_shortest_simple_paths(&g, 1, 3, 5).unwrap();
        assert_eq!(paths.len(), 2);
        check_paths(&g, &paths, 1, 3);
    }

    #[test]
    fn adjacent_nodes() {
        let g = square();
        let paths = k_shortest_simple_paths(&g, 1, 2, 4).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].nodes, vec![1, 2]);
        assert_eq!(paths[0].weight, 1.0);
        assert_eq!(paths[1].nodes, vec![1, 4, 3, 2]);
        assert_eq!(paths[1].weight, 3.0);
    }

    #[test]
    fn disconnected_components() {
        let g = graph(
            &[(1, 0.0, 0.0), (2, 0.0, 1.0), (3, 5.0, 5.0), (4, 5.0, 6.0)],
            &[(1, 2, 1.0), (3, 4, 1.0)],
        );
        assert_eq!(k_shortest_simple_paths(&g, 1, 4, 4).unwrap(), vec![]);
    }

    #[test]
    fn undirected_yen_example() {
        // C=1 D=2 E=3 F=4 G=5 H=6
        let g = graph(
            &[
                (1, 0.0, 0.0),
                (2, 0.0, 0.0),
                (3, 0.0, 0.0),
                (4, 0.0, 0.0),
                (5, 0.0, 0.0),
                (6, 0.0, 0.0),
            ],
            &[
                (1, 2, 3.0),
                (1, 3, 2.0),
                (2, 4, 4.0),
                (3, 2, 1.0),
                (3, 4, 2.0),
                (3, 5, 3.0),
                (4, 5, 2.0),
                (4, 6, 1.0),
                (5, 6, 2.0),
            ],
        );

        let paths = k_shortest_simple_paths(&g, 1, 6, 3).unwrap();
        check_paths(&g, &paths, 1, 6);
        assert_eq!(paths[0].nodes, vec![1, 3, 4, 6]);
        assert_eq!(paths[0].weight, 5.0);
        assert_eq!(paths[1].nodes, vec![1, 2, 3, 4, 6]);
        assert_eq!(paths[1].weight, 7.0);
        assert_eq!(paths[2].nodes, vec![1, 3, 5, 6]);
        assert_eq!(paths[2].weight, 7.0);
    }

    #[test]
    fn grid_enumerates_all_simple_paths() {
        let g = grid();
        let paths = k_shortest_simple_paths(&g, 1, 9, 20).unwrap();
        check_paths(&g, &paths, 1, 9);

        let weights: Vec<f64> = paths.iter().map(|p| p.weight).collect();
        assert_eq!(
            weights,
            vec![4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 6.0, 6.0, 6.0, 6.0, 8.0, 8.0]
        );
    }

    #[test]
    fn grid_exactly_k() {
        let g = grid();
        let paths = k_shortest_simple_paths(&g, 1, 9, 7).unwrap();
        assert_eq!(paths.len(), 7);
        check_paths(&g, &paths, 1, 9);
        assert_eq!(paths[6].weight, 6.0);
    }

    #[test]
    fn deterministic() {
        let g = grid();
        let a = k_shortest_simple_paths(&g, 1, 9, 10).unwrap();
        let b = k_shortest_simple_paths(&g, 1, 9, 10).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn stepwise_search() {
        let g = grid();
        let mut search = KShortestPaths::new(&g, 3, 7).unwrap();
        assert_eq!(search.next_path().map(|p| p.weight), Some(4.0));
        assert_eq!(search.found().len(), 1);

        let mut count = 1;
        while search.next_path().is_some() {
            count += 1;
        }
        assert_eq!(count, 12);
        assert!(search.next_path().is_none());
        assert_eq!(search.into_paths().len(), 12);
    }

    #[test]
    fn invalid_queries() {
        let g = square();
        assert_eq!(
            k_shortest_simple_paths(&g, 1, 1, 4),
            Err(KspError::SameSourceAndTarget(1))
        );
        assert_eq!(
            k_shortest_simple_paths(&g, 1, 42, 4),
            Err(KspError::InvalidReference(42))
        );
        assert_eq!(
            k_shortest_simple_paths(&g, 42, 1, 4),
            Err(KspError::InvalidReference(42))
        );
        assert_eq!(
            k_shortest_simple_paths(&g, 1, 3, 0),
            Err(KspError::ZeroPaths)
        );
    }

    #[test]
    fn concurrent_queries_share_graph() {
        let g = grid();
        let expected = k_shortest_simple_paths(&g, 1, 9, 12).unwrap();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| k_shortest_simple_paths(&g, 1, 9, 12).unwrap()))
                .collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), expected);
            }
        });
    }
}
