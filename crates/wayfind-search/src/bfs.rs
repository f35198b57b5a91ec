//! Breadth-first search: shortest paths by hop count.

use std::collections::VecDeque;

use tracing::debug;
use wayfind_core::{Edge, NodeId, Path, PathGraph, Result};

use crate::frontier::NO_PARENT;
use crate::PathFinder;

/// BFS engine bound to one graph. Edge weights are ignored; the returned
/// path minimizes the number of hops.
///
/// Internal state is generation-stamped and reused across queries.
pub struct Bfs<'a, G: PathGraph> {
    graph: &'a G,
    visited: Vec<u32>,
    parent: Vec<usize>,
    generation: u32,
    queue: VecDeque<NodeId>,
    nbuf: Vec<Edge>,
}

impl<'a, G: PathGraph> Bfs<'a, G> {
    /// Create a BFS engine for `graph`.
    pub fn new(graph: &'a G) -> Self {
        Self {
            graph,
            visited: vec![0; graph.size()],
            parent: vec![NO_PARENT; graph.size()],
            generation: 0,
            queue: VecDeque::new(),
            nbuf: Vec::new(),
        }
    }

    /// Shortest-hop path from `start` to `goal`, or an empty path if `goal`
    /// is unreachable.
    pub fn find_path(&mut self, start: NodeId, goal: NodeId) -> Result<Path> {
        self.graph.ensure_node(start)?;
        self.graph.ensure_node(goal)?;
        if start == goal {
            return Ok(vec![start]);
        }

        self.generation = self.generation.wrapping_add(1);
        let cur_gen = self.generation;
        self.visited[start] = cur_gen;
        self.parent[start] = NO_PARENT;
        self.queue.clear();
        self.queue.push_back(start);

        let mut nbuf = std::mem::take(&mut self.nbuf);
        let mut found = false;

        'search: while let Some(node) = self.queue.pop_front() {
            nbuf.clear();
            self.graph.neighbors_into(node, false, &mut nbuf);
            for edge in &nbuf {
                if self.visited[edge.to] == cur_gen {
                    continue;
                }
                self.visited[edge.to] = cur_gen;
                self.parent[edge.to] = node;
                if edge.to == goal {
                    found = true;
                    break 'search;
                }
                self.queue.push_back(edge.to);
            }
        }

        self.nbuf = nbuf;
        if !found {
            debug!(start, goal, "bfs found no path");
            return Ok(Vec::new());
        }

        let mut path = vec![goal];
        let mut node = goal;
        while self.parent[node] != NO_PARENT {
            node = self.parent[node];
            path.push(node);
        }
        path.reverse();
        debug!(start, goal, hops = path.len() - 1, "bfs complete");
        Ok(path)
    }
}

impl<G: PathGraph> PathFinder for Bfs<'_, G> {
    fn find_path(&mut self, start: NodeId, goal: NodeId) -> Result<Path> {
        Bfs::find_path(self, start, goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfind_core::{Graph, Grid};

    fn line_graph(len: usize) -> Graph {
        let edges: Vec<_> = (0..len - 1).map(|i| (i, i + 1, 1.0)).collect();
        Graph::with_edges(len, false, &edges).unwrap()
    }

    #[test]
    fn finds_shortest_hop_path() {
        let g = line_graph(10);
        let mut bfs = Bfs::new(&g);
        let path = bfs.find_path(0, 9).unwrap();
        assert_eq!(path, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn ignores_edge_weights() {
        // The weighted detour is cheaper, but BFS counts hops only.
        let g = Graph::with_edges(
            4,
            false,
            &[(0, 1, 10.0), (1, 3, 10.0), (0, 2, 0.1), (2, 1, 0.1), (1, 3, 0.1)],
        )
        .unwrap();
        let mut bfs = Bfs::new(&g);
        let path = bfs.find_path(0, 3).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path, vec![0, 1, 3]);
    }

    #[test]
    fn trivial_and_unreachable_queries() {
        let g = Graph::with_edges(4, false, &[(0, 1, 1.0)]).unwrap();
        let mut bfs = Bfs::new(&g);
        assert_eq!(bfs.find_path(2, 2).unwrap(), vec![2]);
        assert!(bfs.find_path(0, 3).unwrap().is_empty());
        assert!(bfs.find_path(0, 9).is_err());
    }

    #[test]
    fn repeated_queries_reuse_state() {
        let g = line_graph(6);
        let mut bfs = Bfs::new(&g);
        for goal in 0..6 {
            let path = bfs.find_path(0, goal).unwrap();
            assert_eq!(path.len(), goal + 1);
        }
    }

    #[test]
    fn grid_path_respects_obstacles() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.add_obstacle(4).unwrap();
        let mut bfs = Bfs::new(&grid);
        let path = bfs.find_path(3, 5).unwrap();
        // The center is blocked, so the path goes around it.
        assert_eq!(path.len(), 5);
        assert!(grid.is_valid_path(&path));
        assert!(!path.contains(&4));
    }
}
