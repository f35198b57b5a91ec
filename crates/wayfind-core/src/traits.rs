//! The graph abstraction every search engine is written against.

use crate::components;
use crate::error::{Error, Result};

/// Dense vertex identifier. Valid ids are `0..graph.size()` and are stable
/// for the lifetime of the graph.
pub type NodeId = usize;

/// An ordered sequence of vertex ids. Consecutive entries are graph-adjacent;
/// in space-time plans a repeated vertex means a pause for one time step.
pub type Path = Vec<NodeId>;

/// A weighted transition into `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub to: NodeId,
    pub cost: f64,
}

impl Edge {
    /// Create a new edge record.
    #[inline]
    pub const fn new(to: NodeId, cost: f64) -> Self {
        Self { to, cost }
    }
}

/// Uniform interface over explicit graphs and implicit grids.
///
/// Engines are generic over this trait and monomorphize per graph type, so
/// the neighbor calls on the hot path carry no dynamic dispatch. All edge
/// costs are finite and non-negative; implementations keep neighbor results
/// stable for the duration of one search.
pub trait PathGraph {
    /// Number of vertices.
    fn size(&self) -> usize;

    /// Append the neighbors of `node` into `buf`; the caller clears `buf`
    /// before calling. With `reversed` set, enumerate the edges *into*
    /// `node` instead, each with its forward cost. For undirected graphs the
    /// two enumerations are equal.
    ///
    /// `node` must be a valid id; engines validate ids once at query entry.
    fn neighbors_into(&self, node: NodeId, reversed: bool, buf: &mut Vec<Edge>);

    /// Whether edges are one-way.
    fn is_directed(&self) -> bool;

    /// Whether [`estimate`](Self::estimate) is backed by vertex coordinates.
    /// When false, `estimate` returns 0 and A* degenerates to Dijkstra.
    fn has_coordinates(&self) -> bool {
        false
    }

    /// Admissible lower bound on the cost of any path from `from` to `to`.
    fn estimate(&self, from: NodeId, to: NodeId) -> f64 {
        let _ = (from, to);
        0.0
    }

    /// Lower bound on every edge cost, used to scale distance heuristics.
    fn min_weight(&self) -> f64 {
        1.0
    }

    /// Whether `node` can be occupied at all. Grids report obstacle cells as
    /// impassable; explicit graphs have no notion of blocked vertices.
    fn passable(&self, node: NodeId) -> bool {
        let _ = node;
        true
    }

    /// Cost of remaining at `node` for one time step in space-time search.
    fn pause_cost(&self, node: NodeId) -> f64;

    /// Whether two agents may not traverse the same edge in opposite
    /// directions at the same time.
    fn edge_collision(&self) -> bool;

    // -----------------------------------------------------------------------
    // Provided operations
    // -----------------------------------------------------------------------

    /// Allocating convenience wrapper around
    /// [`neighbors_into`](Self::neighbors_into).
    fn neighbors(&self, node: NodeId) -> Vec<Edge> {
        let mut buf = Vec::new();
        self.neighbors_into(node, false, &mut buf);
        buf
    }

    /// Validate a vertex id.
    fn ensure_node(&self, node: NodeId) -> Result<()> {
        if node < self.size() {
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!(
                "node {node} is out of range for a graph of {} vertices",
                self.size()
            )))
        }
    }

    /// True iff there is an edge of length one from `from` to `to`.
    fn adjacent(&self, from: NodeId, to: NodeId) -> bool {
        self.neighbors(from).iter().any(|e| e.to == to)
    }

    /// Cost of the edge `from -> to`, taking the cheapest parallel edge.
    fn edge_cost(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.neighbors(from)
            .iter()
            .filter(|e| e.to == to)
            .map(|e| e.cost)
            .min_by(f64::total_cmp)
    }

    /// Total cost of a path: the sum of its edge costs, with each repeated
    /// vertex charged as a pause. Fails on out-of-range ids and on
    /// consecutive vertices that are neither adjacent nor equal.
    fn path_cost(&self, path: &[NodeId]) -> Result<f64> {
        for &node in path {
            self.ensure_node(node)?;
        }
        let mut total = 0.0;
        for pair in path.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if from == to {
                total += self.pause_cost(from);
            } else if let Some(cost) = self.edge_cost(from, to) {
                total += cost;
            } else {
                return Err(Error::InvalidArgument(format!(
                    "path steps from {from} to non-adjacent {to}"
                )));
            }
        }
        Ok(total)
    }

    /// Whether every consecutive pair in `path` is adjacent or a pause.
    /// Out-of-range ids make the path invalid.
    fn is_valid_path(&self, path: &[NodeId]) -> bool {
        if path.iter().any(|&node| node >= self.size()) {
            return false;
        }
        path.windows(2)
            .all(|pair| pair[0] == pair[1] || self.adjacent(pair[0], pair[1]))
    }

    /// Connected components of an undirected graph, via iterative flood
    /// fill. Impassable vertices are skipped entirely.
    fn components(&self) -> Vec<Vec<NodeId>> {
        components::connected_components(self)
    }

    /// Strongly connected components of a directed graph. The ordering of
    /// components, and of vertices within one, is unspecified.
    fn strongly_connected_components(&self) -> Vec<Vec<NodeId>> {
        components::strongly_connected_components(self)
    }
}
