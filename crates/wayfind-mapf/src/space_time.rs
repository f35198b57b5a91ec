//! Space-time A*: single-agent planning in the `(vertex, time)` product
//! space, respecting a reservation table.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use tracing::debug;
use wayfind_core::{Edge, Error, NodeId, Path, PathGraph, Result};

use crate::reservation::ReservationTable;

/// A vertex occupied at a point in time.
type State = (NodeId, usize);

/// Open-list entry over space-time states. Orders as a min-heap on `f`,
/// breaking ties by lower `h` (deeper progress first), then by vertex id and
/// time, so expansion order is deterministic.
#[derive(Debug, Clone, Copy)]
struct StateEntry {
    f: f64,
    h: f64,
    g: f64,
    node: NodeId,
    time: usize,
}

impl PartialEq for StateEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for StateEntry {}

impl Ord for StateEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.node.cmp(&self.node))
            .then_with(|| other.time.cmp(&self.time))
    }
}

impl PartialOrd for StateEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct StateRecord {
    g: f64,
    parent: Option<State>,
}

/// Space-time A* engine bound to one graph.
///
/// Plans a single agent's time-indexed path from time 0, treating a
/// [`ReservationTable`] as dynamic obstacles. The state space is unbounded
/// in the time dimension, so per-state records live in a hash map rather
/// than a dense pool; determinism is preserved by the explicit open-list
/// tie-breaks.
pub struct SpaceTimeAstar<'a, G: PathGraph> {
    graph: &'a G,
    nbuf: Vec<Edge>,
    expansion_limit: Option<usize>,
}

impl<'a, G: PathGraph> SpaceTimeAstar<'a, G> {
    /// Create a space-time A* engine for `graph`.
    pub fn new(graph: &'a G) -> Self {
        Self {
            graph,
            nbuf: Vec::new(),
            expansion_limit: None,
        }
    }

    /// Cap the number of state expansions per query; exceeding the cap
    /// fails the query with [`Error::Timeout`]. `None` removes the cap.
    pub fn set_expansion_limit(&mut self, limit: Option<usize>) {
        self.expansion_limit = limit;
    }

    /// Minimum-cost path reaching `goal` at any time `t <= max_depth`, or
    /// an empty path if none exists.
    pub fn find_path_with_depth_limit(
        &mut self,
        start: NodeId,
        goal: NodeId,
        max_depth: usize,
        rt: &ReservationTable,
    ) -> Result<Path> {
        self.search(start, goal, max_depth, false, rt)
    }

    /// Minimum-cost path with exactly `length` entries (start included)
    /// ending at `goal`; pauses pad as needed. Empty if none exists.
    pub fn find_path_with_exact_length(
        &mut self,
        start: NodeId,
        goal: NodeId,
        length: usize,
        rt: &ReservationTable,
    ) -> Result<Path> {
        if length == 0 {
            return Err(Error::InvalidArgument(
                "path length must be positive".into(),
            ));
        }
        self.search(start, goal, length - 1, true, rt)
    }

    /// Minimum-cost path with at most `max_length` entries ending at
    /// `goal`, or an empty path if none exists.
    pub fn find_path_with_length_limit(
        &mut self,
        start: NodeId,
        goal: NodeId,
        max_length: usize,
        rt: &ReservationTable,
    ) -> Result<Path> {
        if max_length == 0 {
            return Err(Error::InvalidArgument(
                "maximum path length must be positive".into(),
            ));
        }
        self.search(start, goal, max_length - 1, false, rt)
    }

    fn search(
        &mut self,
        start: NodeId,
        goal: NodeId,
        max_time: usize,
        exact: bool,
        rt: &ReservationTable,
    ) -> Result<Path> {
        self.graph.ensure_node(start)?;
        self.graph.ensure_node(goal)?;
        if rt.graph_size() != self.graph.size() {
            return Err(Error::InvalidArgument(format!(
                "reservation table indexes {} vertices but the graph has {}",
                rt.graph_size(),
                self.graph.size()
            )));
        }
        if rt.is_reserved(0, start) {
            return Ok(Vec::new());
        }

        let mut records: HashMap<State, StateRecord> = HashMap::new();
        let mut open: BinaryHeap<StateEntry> = BinaryHeap::new();
        let h0 = self.graph.estimate(start, goal);
        records.insert((start, 0), StateRecord { g: 0.0, parent: None });
        open.push(StateEntry {
            f: h0,
            h: h0,
            g: 0.0,
            node: start,
            time: 0,
        });

        let edge_collision = self.graph.edge_collision();
        let mut nbuf = std::mem::take(&mut self.nbuf);
        let mut expanded = 0usize;
        let mut terminal: Option<State> = None;

        while let Some(entry) = open.pop() {
            let state = (entry.node, entry.time);
            // Lazy deletion: a cheaper entry for this state was expanded.
            if entry.g > records[&state].g {
                continue;
            }
            if let Some(limit) = self.expansion_limit {
                if expanded >= limit {
                    self.nbuf = nbuf;
                    return Err(Error::Timeout { limit });
                }
            }
            expanded += 1;

            if entry.node == goal
                && (!exact || entry.time == max_time)
                && Self::can_settle(rt, goal, entry.time)
            {
                terminal = Some(state);
                break;
            }
            if entry.time == max_time {
                continue;
            }

            let next_time = entry.time + 1;
            nbuf.clear();
            self.graph.neighbors_into(entry.node, false, &mut nbuf);
            for edge in &nbuf {
                if rt.is_reserved(next_time, edge.to) {
                    continue;
                }
                if edge_collision && rt.is_edge_reserved(next_time, entry.node, edge.to) {
                    continue;
                }
                let g = entry.g + edge.cost + rt.additional_weight(next_time, edge.to);
                Self::relax(&mut records, &mut open, self.graph, goal, (edge.to, next_time), g, state);
            }
            // Pause in place.
            if !rt.is_reserved(next_time, entry.node) {
                let g = entry.g + self.graph.pause_cost(entry.node);
                Self::relax(
                    &mut records,
                    &mut open,
                    self.graph,
                    goal,
                    (entry.node, next_time),
                    g,
                    state,
                );
            }
        }

        self.nbuf = nbuf;
        debug!(
            start,
            goal,
            max_time,
            exact,
            expanded,
            found = terminal.is_some(),
            "space-time astar complete"
        );
        let Some(mut state) = terminal else {
            return Ok(Vec::new());
        };

        let mut path = Vec::with_capacity(state.1 + 1);
        loop {
            path.push(state.0);
            match records[&state].parent {
                Some(parent) => state = parent,
                None => break,
            }
        }
        path.reverse();
        Ok(path)
    }

    // An agent settles at the goal only if nothing is reserved there at the
    // arrival time or later.
    fn can_settle(rt: &ReservationTable, goal: NodeId, time: usize) -> bool {
        rt.last_time_reserved(goal).is_none_or(|last| time > last)
    }

    fn relax(
        records: &mut HashMap<State, StateRecord>,
        open: &mut BinaryHeap<StateEntry>,
        graph: &G,
        goal: NodeId,
        state: State,
        g: f64,
        parent: State,
    ) {
        let improved = match records.get(&state) {
            Some(record) => g < record.g,
            None => true,
        };
        if !improved {
            return;
        }
        records.insert(
            state,
            StateRecord {
                g,
                parent: Some(parent),
            },
        );
        let h = graph.estimate(state.0, goal);
        open.push(StateEntry {
            f: g + h,
            h,
            g,
            node: state.0,
            time: state.1,
        });
    }
}
