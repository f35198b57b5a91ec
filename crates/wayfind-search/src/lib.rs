//! **wayfind-search** — single-agent search engines for the wayfind
//! pathfinding library.
//!
//! Every engine binds to one graph for its lifetime and reuses its internal
//! state across queries:
//!
//! - [`Bfs`]: shortest paths by hop count
//! - [`Dijkstra`]: minimum-cost paths on weighted graphs
//! - [`Astar`]: minimum-cost paths guided by the graph heuristic
//! - [`ResumableBfs`] / [`ResumableDijkstra`]: persistent frontiers that
//!   amortize repeated queries from a fixed source
//!
//! All engines share the same contract: a returned path begins with `start`
//! and ends with `goal`, and an empty path means no path exists. Expansion
//! order is deterministic given the graph and query.

#![forbid(unsafe_code)]

mod astar;
mod bfs;
mod dijkstra;
mod frontier;
mod resumable;

pub use astar::Astar;
pub use bfs::Bfs;
pub use dijkstra::Dijkstra;
pub use resumable::{ResumableBfs, ResumableDijkstra, UNREACHABLE};

use wayfind_core::{NodeId, Path, Result};

/// Common interface of the single-agent engines.
pub trait PathFinder {
    /// Shortest path from `start` to `goal`. Returns the singleton
    /// `[start]` when `start == goal`, and an empty path when no path
    /// exists.
    fn find_path(&mut self, start: NodeId, goal: NodeId) -> Result<Path>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfind_core::Grid;

    #[test]
    fn engines_are_interchangeable_behind_the_trait() {
        let grid = Grid::new(3, 3).unwrap();
        let mut engines: Vec<Box<dyn PathFinder + '_>> = vec![
            Box::new(Bfs::new(&grid)),
            Box::new(Dijkstra::new(&grid)),
            Box::new(Astar::new(&grid)),
        ];
        for engine in &mut engines {
            let path = engine.find_path(0, 8).unwrap();
            assert_eq!(path.len(), 5);
            assert_eq!(path[0], 0);
            assert_eq!(path[4], 8);
        }
    }
}
