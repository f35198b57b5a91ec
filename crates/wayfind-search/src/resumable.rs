//! Resumable single-source searches.
//!
//! Both engines anchor at a fixed start node and keep their frontier and
//! distance table alive between queries, expanding only as far as each query
//! needs. Querying every vertex costs the same as one full sweep. Any
//! mutation of the underlying graph invalidates the instance; call
//! [`set_start`](ResumableDijkstra::set_start) to reseed.

use std::collections::{BinaryHeap, VecDeque};

use tracing::debug;
use wayfind_core::{Edge, NodeId, Path, PathGraph, Result};

use crate::frontier::{OpenEntry, NO_PARENT};

/// Hop-count sentinel for vertices the search proved unreachable.
pub const UNREACHABLE: usize = usize::MAX;

/// Resumable breadth-first search from a fixed start node.
pub struct ResumableBfs<'a, G: PathGraph> {
    graph: &'a G,
    start: NodeId,
    dist: Vec<usize>,
    parent: Vec<usize>,
    queue: VecDeque<NodeId>,
    nbuf: Vec<Edge>,
}

impl<'a, G: PathGraph> ResumableBfs<'a, G> {
    /// Create a resumable BFS anchored at `start`.
    pub fn new(graph: &'a G, start: NodeId) -> Result<Self> {
        graph.ensure_node(start)?;
        let mut rbfs = Self {
            graph,
            start,
            dist: Vec::new(),
            parent: Vec::new(),
            queue: VecDeque::new(),
            nbuf: Vec::new(),
        };
        rbfs.reset();
        Ok(rbfs)
    }

    /// The anchored start node.
    pub fn start_node(&self) -> NodeId {
        self.start
    }

    /// Re-anchor at `start`, discarding all search state.
    pub fn set_start(&mut self, start: NodeId) -> Result<()> {
        self.graph.ensure_node(start)?;
        self.start = start;
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.dist.clear();
        self.dist.resize(self.graph.size(), UNREACHABLE);
        self.parent.clear();
        self.parent.resize(self.graph.size(), NO_PARENT);
        self.queue.clear();
        self.dist[self.start] = 0;
        self.queue.push_back(self.start);
    }

    /// Hop distance from the start node to `node`, expanding the frontier
    /// only as far as needed. Returns [`UNREACHABLE`] if no path exists.
    pub fn distance(&mut self, node: NodeId) -> Result<usize> {
        self.graph.ensure_node(node)?;
        self.expand_until(node);
        Ok(self.dist[node])
    }

    /// Shortest-hop path from the start node to `node`, or an empty path if
    /// `node` is unreachable.
    pub fn find_path(&mut self, node: NodeId) -> Result<Path> {
        self.graph.ensure_node(node)?;
        self.expand_until(node);
        if self.dist[node] == UNREACHABLE {
            return Ok(Vec::new());
        }
        let mut path = vec![node];
        let mut current = node;
        while self.parent[current] != NO_PARENT {
            current = self.parent[current];
            path.push(current);
        }
        path.reverse();
        Ok(path)
    }

    fn expand_until(&mut self, target: NodeId) {
        if self.dist[target] != UNREACHABLE {
            return;
        }
        let mut nbuf = std::mem::take(&mut self.nbuf);
        while self.dist[target] == UNREACHABLE {
            let Some(node) = self.queue.pop_front() else {
                break;
            };
            let next_dist = self.dist[node] + 1;
            nbuf.clear();
            self.graph.neighbors_into(node, false, &mut nbuf);
            for edge in &nbuf {
                if self.dist[edge.to] == UNREACHABLE {
                    self.dist[edge.to] = next_dist;
                    self.parent[edge.to] = node;
                    self.queue.push_back(edge.to);
                }
            }
        }
        self.nbuf = nbuf;
    }
}

/// Resumable Dijkstra from a fixed start node.
///
/// Distances are settled in nondecreasing order: once a vertex is settled
/// its distance is final, and the settled set always agrees with a fresh
/// Dijkstra run from the same start.
pub struct ResumableDijkstra<'a, G: PathGraph> {
    graph: &'a G,
    start: NodeId,
    dist: Vec<f64>,
    parent: Vec<usize>,
    settled: Vec<bool>,
    open: BinaryHeap<OpenEntry>,
    nbuf: Vec<Edge>,
}

impl<'a, G: PathGraph> ResumableDijkstra<'a, G> {
    /// Create a resumable Dijkstra anchored at `start`.
    pub fn new(graph: &'a G, start: NodeId) -> Result<Self> {
        graph.ensure_node(start)?;
        let mut rd = Self {
            graph,
            start,
            dist: Vec::new(),
            parent: Vec::new(),
            settled: Vec::new(),
            open: BinaryHeap::new(),
            nbuf: Vec::new(),
        };
        rd.reset();
        Ok(rd)
    }

    /// The anchored start node.
    pub fn start_node(&self) -> NodeId {
        self.start
    }

    /// Re-anchor at `start`, discarding all search state.
    pub fn set_start(&mut self, start: NodeId) -> Result<()> {
        self.graph.ensure_node(start)?;
        self.start = start;
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        debug!(start = self.start, "resumable dijkstra reset");
        self.dist.clear();
        self.dist.resize(self.graph.size(), f64::INFINITY);
        self.parent.clear();
        self.parent.resize(self.graph.size(), NO_PARENT);
        self.settled.clear();
        self.settled.resize(self.graph.size(), false);
        self.open.clear();
        self.dist[self.start] = 0.0;
        self.open.push(OpenEntry {
            f: 0.0,
            h: 0.0,
            node: self.start,
        });
    }

    /// Shortest-path distance from the start node to `node`, expanding the
    /// frontier until `node` is settled. Returns `f64::INFINITY` if no path
    /// exists.
    pub fn distance(&mut self, node: NodeId) -> Result<f64> {
        self.graph.ensure_node(node)?;
        self.expand_until(node);
        Ok(self.dist[node])
    }

    /// Minimum-cost path from the start node to `node`, or an empty path if
    /// `node` is unreachable.
    pub fn find_path(&mut self, node: NodeId) -> Result<Path> {
        self.graph.ensure_node(node)?;
        self.expand_until(node);
        if self.dist[node].is_infinite() {
            return Ok(Vec::new());
        }
        let mut path = vec![node];
        let mut current = node;
        while self.parent[current] != NO_PARENT {
            current = self.parent[current];
            path.push(current);
        }
        path.reverse();
        Ok(path)
    }

    fn expand_until(&mut self, target: NodeId) {
        if self.settled[target] {
            return;
        }
        let mut nbuf = std::mem::take(&mut self.nbuf);
        while !self.settled[target] {
            let Some(current) = self.open.pop() else {
                break;
            };
            let ci = current.node;
            // Lazy deletion: skip superseded entries.
            if self.settled[ci] || current.f > self.dist[ci] {
                continue;
            }
            self.settled[ci] = true;

            nbuf.clear();
            self.graph.neighbors_into(ci, false, &mut nbuf);
            for edge in &nbuf {
                let tentative = self.dist[ci] + edge.cost;
                if tentative < self.dist[edge.to] {
                    self.dist[edge.to] = tentative;
                    self.parent[edge.to] = ci;
                    self.open.push(OpenEntry {
                        f: tentative,
                        h: 0.0,
                        node: edge.to,
                    });
                }
            }
        }
        self.nbuf = nbuf;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dijkstra;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use wayfind_core::Graph;

    fn line_graph(len: usize) -> Graph {
        let edges: Vec<_> = (0..len - 1).map(|i| (i, i + 1, 1.0)).collect();
        Graph::with_edges(len, false, &edges).unwrap()
    }

    #[test]
    fn bfs_distances_on_a_line() {
        let g = line_graph(10);
        let mut rbfs = ResumableBfs::new(&g, 0).unwrap();
        for node in 0..10 {
            assert_eq!(rbfs.distance(node).unwrap(), node);
        }
        // Queries out of order hit already-settled state.
        assert_eq!(rbfs.distance(3).unwrap(), 3);
    }

    #[test]
    fn bfs_expands_only_as_far_as_needed() {
        let g = line_graph(10);
        let mut rbfs = ResumableBfs::new(&g, 0).unwrap();
        assert_eq!(rbfs.distance(2).unwrap(), 2);
        // Nodes beyond the frontier have not been discovered yet.
        assert_eq!(rbfs.dist[7], UNREACHABLE);
        assert_eq!(rbfs.distance(7).unwrap(), 7);
    }

    #[test]
    fn bfs_path_and_unreachable() {
        let g = Graph::with_edges(4, false, &[(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
        let mut rbfs = ResumableBfs::new(&g, 0).unwrap();
        assert_eq!(rbfs.find_path(2).unwrap(), vec![0, 1, 2]);
        assert_eq!(rbfs.distance(3).unwrap(), UNREACHABLE);
        assert!(rbfs.find_path(3).unwrap().is_empty());
    }

    #[test]
    fn bfs_set_start_resets() {
        let g = line_graph(5);
        let mut rbfs = ResumableBfs::new(&g, 0).unwrap();
        assert_eq!(rbfs.distance(4).unwrap(), 4);
        rbfs.set_start(4).unwrap();
        assert_eq!(rbfs.start_node(), 4);
        assert_eq!(rbfs.distance(0).unwrap(), 4);
        assert_eq!(rbfs.distance(4).unwrap(), 0);
    }

    #[test]
    fn dijkstra_distances_match_fresh_runs() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let size = rng.random_range(5..25);
            let mut g = Graph::new(size, true);
            for _ in 0..size * 3 {
                let from = rng.random_range(0..size);
                let to = rng.random_range(0..size);
                g.add_edge(from, to, rng.random_range(0.1..5.0)).unwrap();
            }
            let mut resumable = ResumableDijkstra::new(&g, 0).unwrap();
            let mut fresh = Dijkstra::new(&g);
            for node in 0..size {
                let resumed = resumable.distance(node).unwrap();
                let path = fresh.find_path(0, node).unwrap();
                if path.is_empty() {
                    assert!(resumed.is_infinite(), "node {node} should be unreachable");
                } else {
                    let cost = g.path_cost(&path).unwrap();
                    assert!(
                        (resumed - cost).abs() < 1e-9,
                        "node {node}: resumable {resumed} vs fresh {cost}"
                    );
                }
            }
        }
    }

    #[test]
    fn dijkstra_paths_are_valid_and_optimal() {
        let g = Graph::with_edges(
            5,
            false,
            &[(0, 1, 2.0), (1, 2, 2.0), (0, 3, 1.0), (3, 4, 1.0), (4, 2, 1.0)],
        )
        .unwrap();
        let mut rd = ResumableDijkstra::new(&g, 0).unwrap();
        assert_eq!(rd.find_path(2).unwrap(), vec![0, 3, 4, 2]);
        assert_eq!(rd.distance(2).unwrap(), 3.0);
        assert_eq!(rd.find_path(0).unwrap(), vec![0]);
    }

    #[test]
    fn dijkstra_set_start_resets() {
        let g = line_graph(4);
        let mut rd = ResumableDijkstra::new(&g, 0).unwrap();
        assert_eq!(rd.distance(3).unwrap(), 3.0);
        rd.set_start(3).unwrap();
        assert_eq!(rd.distance(0).unwrap(), 3.0);
        assert_eq!(rd.find_path(1).unwrap(), vec![3, 2, 1]);
    }

    #[test]
    fn invalid_nodes_are_rejected() {
        let g = line_graph(3);
        assert!(ResumableBfs::new(&g, 9).is_err());
        let mut rd = ResumableDijkstra::new(&g, 0).unwrap();
        assert!(rd.distance(9).is_err());
        assert!(rd.set_start(9).is_err());
    }
}
