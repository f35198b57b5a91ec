//! Dijkstra shortest-path search.

use std::collections::BinaryHeap;

use tracing::debug;
use wayfind_core::{Edge, Error, NodeId, Path, PathGraph, Result};

use crate::frontier::{OpenEntry, SearchNode, NO_PARENT};
use crate::PathFinder;

/// Dijkstra engine bound to one graph.
///
/// The node pool is generation-stamped and reused across queries, so
/// repeated calls incur no allocations after warm-up. Decrease-key is
/// handled by lazy deletion: popped entries whose stored cost exceeds the
/// current best are skipped.
pub struct Dijkstra<'a, G: PathGraph> {
    graph: &'a G,
    nodes: Vec<SearchNode>,
    generation: u32,
    nbuf: Vec<Edge>,
    expansion_limit: Option<usize>,
}

impl<'a, G: PathGraph> Dijkstra<'a, G> {
    /// Create a Dijkstra engine for `graph`.
    pub fn new(graph: &'a G) -> Self {
        Self {
            graph,
            nodes: vec![SearchNode::default(); graph.size()],
            generation: 0,
            nbuf: Vec::new(),
            expansion_limit: None,
        }
    }

    /// Cap the number of node expansions per query; exceeding the cap fails
    /// the query with [`Error::Timeout`]. `None` removes the cap.
    pub fn set_expansion_limit(&mut self, limit: Option<usize>) {
        self.expansion_limit = limit;
    }

    /// Minimum-cost path from `start` to `goal`, or an empty path if `goal`
    /// is unreachable.
    pub fn find_path(&mut self, start: NodeId, goal: NodeId) -> Result<Path> {
        self.graph.ensure_node(start)?;
        self.graph.ensure_node(goal)?;
        if start == goal {
            return Ok(vec![start]);
        }

        self.generation = self.generation.wrapping_add(1);
        let cur_gen = self.generation;
        {
            let node = &mut self.nodes[start];
            node.g = 0.0;
            node.parent = NO_PARENT;
            node.generation = cur_gen;
            node.open = true;
        }

        let mut open: BinaryHeap<OpenEntry> = BinaryHeap::new();
        open.push(OpenEntry {
            f: 0.0,
            h: 0.0,
            node: start,
        });

        let mut nbuf = std::mem::take(&mut self.nbuf);
        let mut expanded = 0usize;

        let found = 'search: loop {
            let Some(current) = open.pop() else {
                break 'search false;
            };
            let ci = current.node;
            if self.nodes[ci].generation != cur_gen || !self.nodes[ci].open {
                continue;
            }
            if let Some(limit) = self.expansion_limit {
                if expanded >= limit {
                    self.nbuf = nbuf;
                    return Err(Error::Timeout { limit });
                }
            }
            expanded += 1;
            if ci == goal {
                break 'search true;
            }
            self.nodes[ci].open = false;
            let current_g = self.nodes[ci].g;

            nbuf.clear();
            self.graph.neighbors_into(ci, false, &mut nbuf);
            for edge in &nbuf {
                let tentative = current_g + edge.cost;
                let node = &mut self.nodes[edge.to];
                if node.generation == cur_gen {
                    if tentative >= node.g {
                        continue;
                    }
                } else {
                    node.generation = cur_gen;
                }
                node.g = tentative;
                node.parent = ci;
                node.open = true;
                open.push(OpenEntry {
                    f: tentative,
                    h: 0.0,
                    node: edge.to,
                });
            }
        };

        self.nbuf = nbuf;
        debug!(start, goal, expanded, found, "dijkstra complete");
        if !found {
            return Ok(Vec::new());
        }
        Ok(reconstruct(&self.nodes, goal))
    }
}

impl<G: PathGraph> PathFinder for Dijkstra<'_, G> {
    fn find_path(&mut self, start: NodeId, goal: NodeId) -> Result<Path> {
        Dijkstra::find_path(self, start, goal)
    }
}

/// Walk the parent chain from `goal` back to the search root.
pub(crate) fn reconstruct(nodes: &[SearchNode], goal: NodeId) -> Path {
    let mut path = Vec::new();
    let mut node = goal;
    while node != NO_PARENT {
        path.push(node);
        node = nodes[node].parent;
    }
    path.reverse();
    path
}
