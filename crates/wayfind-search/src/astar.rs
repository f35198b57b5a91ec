//! A* shortest-path search.

use std::collections::BinaryHeap;

use tracing::debug;
use wayfind_core::{Edge, Error, NodeId, Path, PathGraph, Result};

use crate::dijkstra::reconstruct;
use crate::frontier::{OpenEntry, SearchNode, NO_PARENT};
use crate::PathFinder;

/// A* engine bound to one graph, guided by the graph's
/// [`estimate`](PathGraph::estimate) heuristic.
///
/// On graphs without coordinates the heuristic is zero and the search
/// degenerates to Dijkstra, returning paths of the same cost.
pub struct Astar<'a, G: PathGraph> {
    graph: &'a G,
    nodes: Vec<SearchNode>,
    generation: u32,
    nbuf: Vec<Edge>,
    expansion_limit: Option<usize>,
}

impl<'a, G: PathGraph> Astar<'a, G> {
    /// Create an A* engine for `graph`.
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

        let h0 = self.graph.estimate(start, goal);
        let mut open: BinaryHeap<OpenEntry> = BinaryHeap::new();
        open.push(OpenEntry {
            f: h0,
            h: h0,
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
                let h = self.graph.estimate(edge.to, goal);
                open.push(OpenEntry {
                    f: tentative + h,
                    h,
                    node: edge.to,
                });
            }
        };

        self.nbuf = nbuf;
        debug!(start, goal, expanded, found, "astar complete");
        if !found {
            return Ok(Vec::new());
        }
        Ok(reconstruct(&self.nodes, goal))
    }
}

impl<G: PathGraph> PathFinder for Astar<'_, G> {
    fn find_path(&mut self, start: NodeId, goal: NodeId) -> Result<Path> {
        Astar::find_path(self, start, goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dijkstra;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use wayfind_core::{DiagonalMovement, Graph, Grid};

    #[test]
    fn manhattan_path_on_open_grid() {
        let grid = Grid::new(3, 3).unwrap();
        let mut astar = Astar::new(&grid);
        let path = astar.find_path(0, 8).unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(grid.path_cost(&path).unwrap(), 4.0);
        assert_eq!(path[0], 0);
        assert_eq!(path[4], 8);
    }

    #[test]
    fn diagonal_shortcut_with_sqrt2_multiplier() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.set_diagonal_movement(DiagonalMovement::Always);
        grid.set_diagonal_multiplier(std::f64::consts::SQRT_2).unwrap();
        let mut astar = Astar::new(&grid);
        let path = astar.find_path(0, 8).unwrap();
        assert_eq!(path, vec![0, 4, 8]);
        let cost = grid.path_cost(&path).unwrap();
        assert!((cost - 2.0 * std::f64::consts::SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn zero_heuristic_matches_dijkstra_exactly() {
        // No coordinates, so h is identically zero.
        let g = Graph::with_edges(
            4,
            true,
            &[(0, 1, 1.0), (1, 2, 1.0), (0, 2, 3.0), (2, 3, 1.0)],
        )
        .unwrap();
        let mut astar = Astar::new(&g);
        let path = astar.find_path(0, 3).unwrap();
        assert_eq!(path, vec![0, 1, 2, 3]);
        assert_eq!(g.path_cost(&path).unwrap(), 3.0);
    }

    #[test]
    fn detours_around_a_wall() {
        // 5x5 with a wall through the middle row except the rightmost cell.
        let mut grid = Grid::new(5, 5).unwrap();
        for x in 0..4 {
            grid.add_obstacle(2 * 5 + x).unwrap();
        }
        let mut astar = Astar::new(&grid);
        let path = astar.find_path(0, 20).unwrap();
        assert!(grid.is_valid_path(&path));
        assert_eq!(path.first(), Some(&0));
        assert_eq!(path.last(), Some(&20));
        // Forced through the gap at (4, 2) = 14.
        assert!(path.contains(&14));
    }

    #[test]
    fn agrees_with_dijkstra_on_random_graphs() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..20 {
            let size = rng.random_range(5..30);
            let mut g = Graph::new(size, true);
            for _ in 0..size * 3 {
                let from = rng.random_range(0..size);
                let to = rng.random_range(0..size);
                let cost = rng.random_range(0.0..10.0);
                g.add_edge(from, to, cost).unwrap();
            }
            let mut astar = Astar::new(&g);
            let mut dijkstra = Dijkstra::new(&g);
            for _ in 0..5 {
                let start = rng.random_range(0..size);
                let goal = rng.random_range(0..size);
                let a = astar.find_path(start, goal).unwrap();
                let d = dijkstra.find_path(start, goal).unwrap();
                assert_eq!(a.is_empty(), d.is_empty());
                if !a.is_empty() {
                    let ca = g.path_cost(&a).unwrap();
                    let cd = g.path_cost(&d).unwrap();
                    assert!((ca - cd).abs() < 1e-9, "cost mismatch: {ca} vs {cd}");
                }
            }
        }
    }

    #[test]
    fn agrees_with_dijkstra_on_random_weighted_grids() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10 {
            let mut grid = Grid::new(8, 8).unwrap();
            grid.set_diagonal_movement(DiagonalMovement::IfAtMostOneObstacle);
            grid.set_diagonal_multiplier(std::f64::consts::SQRT_2).unwrap();
            for node in 1..63 {
                if rng.random_bool(0.2) {
                    grid.add_obstacle(node).unwrap();
                } else {
                    grid.update_weight(node, rng.random_range(0.5..4.0)).unwrap();
                }
            }
            let mut astar = Astar::new(&grid);
            let mut dijkstra = Dijkstra::new(&grid);
            let a = astar.find_path(0, 63).unwrap();
            let d = dijkstra.find_path(0, 63).unwrap();
            assert_eq!(a.is_empty(), d.is_empty());
            if !a.is_empty() {
                assert!(grid.is_valid_path(&a));
                let ca = grid.path_cost(&a).unwrap();
                let cd = grid.path_cost(&d).unwrap();
                assert!((ca - cd).abs() < 1e-9);
            }
        }
    }
}
