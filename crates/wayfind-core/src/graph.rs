//! Explicit weighted graphs over dense vertex ids.

use crate::error::{Error, Result};
use crate::traits::{Edge, NodeId, PathGraph};

/// A weighted graph stored as adjacency lists, directed or undirected, with
/// optional per-vertex coordinates for the A* heuristic.
///
/// Vertices are the ids `0..size`; edges are added one at a time or in bulk.
/// The graph owns its topology exclusively and must not be mutated while a
/// search borrows it.
#[derive(Debug, Clone)]
pub struct Graph {
    directed: bool,
    edges: Vec<Vec<Edge>>,
    // Predecessor lists, maintained only for directed graphs.
    reverse: Vec<Vec<Edge>>,
    coords: Option<Vec<Vec<f64>>>,
    min_edge_cost: Option<f64>,
    pause_cost: f64,
    edge_collision: bool,
}

impl Graph {
    /// Create a graph with `size` vertices and no edges.
    pub fn new(size: usize, directed: bool) -> Self {
        Self {
            directed,
            edges: vec![Vec::new(); size],
            reverse: if directed {
                vec![Vec::new(); size]
            } else {
                Vec::new()
            },
            coords: None,
            min_edge_cost: None,
            pause_cost: 1.0,
            edge_collision: false,
        }
    }

    /// Create a graph and add `(from, to, cost)` edges in one go.
    pub fn with_edges(size: usize, directed: bool, edges: &[(NodeId, NodeId, f64)]) -> Result<Self> {
        let mut graph = Self::new(size, directed);
        for &(from, to, cost) in edges {
            graph.add_edge(from, to, cost)?;
        }
        Ok(graph)
    }

    /// Add an edge. For undirected graphs the edge is traversable both ways.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, cost: f64) -> Result<()> {
        self.ensure_node(from)?;
        self.ensure_node(to)?;
        if !cost.is_finite() || cost < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "edge cost must be finite and non-negative, got {cost}"
            )));
        }
        self.edges[from].push(Edge::new(to, cost));
        if self.directed {
            self.reverse[to].push(Edge::new(from, cost));
        } else if from != to {
            self.edges[to].push(Edge::new(from, cost));
        }
        self.min_edge_cost = Some(match self.min_edge_cost {
            Some(current) => current.min(cost),
            None => cost,
        });
        Ok(())
    }

    /// Number of stored edges (an undirected edge counts once).
    pub fn edge_count(&self) -> usize {
        let total: usize = self.edges.iter().map(Vec::len).sum();
        if self.directed {
            total
        } else {
            let loops = self
                .edges
                .iter()
                .enumerate()
                .flat_map(|(from, list)| list.iter().map(move |e| (from, e.to)))
                .filter(|(from, to)| from == to)
                .count();
            loops + (total - loops) / 2
        }
    }

    /// Attach a coordinate vector to every vertex, enabling the Euclidean
    /// heuristic. All vectors must have the same dimension, and the caller
    /// guarantees that straight-line distance never overestimates path cost.
    pub fn set_coordinates(&mut self, coords: Vec<Vec<f64>>) -> Result<()> {
        if coords.len() != self.size() {
            return Err(Error::InvalidArgument(format!(
                "expected {} coordinate vectors, got {}",
                self.size(),
                coords.len()
            )));
        }
        let dim = coords.first().map_or(0, Vec::len);
        if coords.iter().any(|c| c.len() != dim) {
            return Err(Error::InvalidArgument(
                "coordinate vectors must all have the same dimension".into(),
            ));
        }
        self.coords = Some(coords);
        Ok(())
    }

    /// Set the fixed cost of the pause action. Must be non-negative.
    pub fn set_pause_cost(&mut self, cost: f64) -> Result<()> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "pause cost must be finite and non-negative, got {cost}"
            )));
        }
        self.pause_cost = cost;
        Ok(())
    }

    /// Forbid two agents from traversing one edge in opposite directions at
    /// the same time step.
    pub fn set_edge_collision(&mut self, enabled: bool) {
        self.edge_collision = enabled;
    }
}

impl PathGraph for Graph {
    fn size(&self) -> usize {
        self.edges.len()
    }

    fn neighbors_into(&self, node: NodeId, reversed: bool, buf: &mut Vec<Edge>) {
        let list = if reversed && self.directed {
            &self.reverse[node]
        } else {
            &self.edges[node]
        };
        buf.extend_from_slice(list);
    }

    fn is_directed(&self) -> bool {
        self.directed
    }

    fn has_coordinates(&self) -> bool {
        self.coords.is_some()
    }

    fn estimate(&self, from: NodeId, to: NodeId) -> f64 {
        match &self.coords {
            Some(coords) => coords[from]
                .iter()
                .zip(&coords[to])
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f64>()
                .sqrt(),
            None => 0.0,
        }
    }

    fn min_weight(&self) -> f64 {
        self.min_edge_cost.unwrap_or(1.0)
    }

    fn pause_cost(&self, _node: NodeId) -> f64 {
        self.pause_cost
    }

    fn edge_collision(&self) -> bool {
        self.edge_collision
    }
}
