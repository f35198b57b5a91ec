//! Time-indexed occupancy constraints for multi-agent planning.

use std::collections::{HashMap, HashSet};

use tracing::debug;
use wayfind_core::{Error, NodeId, Result};

/// Vertex and edge occupancy across time, shared by MAPF coordinators and
/// consumed by space-time A*.
///
/// Within a planning episode the table is append-only: constraints are
/// recorded as agents commit to paths and are never removed. The table is
/// not safe for concurrent mutation; a coordinator serializes updates and
/// lends the table to one space-time query at a time.
#[derive(Debug, Clone, Default)]
pub struct ReservationTable {
    size: usize,
    vertices: HashSet<(usize, NodeId)>,
    edges: HashSet<(usize, NodeId, NodeId)>,
    weights: HashMap<(usize, NodeId), f64>,
    // Per vertex: latest transiently reserved time, and the time from which
    // a destination reservation holds forever.
    last_transient: Vec<Option<usize>>,
    permanent: Vec<Option<usize>>,
}

impl ReservationTable {
    /// Create an empty table for a graph of `graph_size` vertices.
    pub fn new(graph_size: usize) -> Self {
        Self {
            size: graph_size,
            vertices: HashSet::new(),
            edges: HashSet::new(),
            weights: HashMap::new(),
            last_transient: vec![None; graph_size],
            permanent: vec![None; graph_size],
        }
    }

    /// Size of the graph the table is indexed against.
    pub fn graph_size(&self) -> usize {
        self.size
    }

    fn ensure_node(&self, node: NodeId) -> Result<()> {
        if node < self.size {
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!(
                "node {node} is out of range for a reservation table of size {}",
                self.size
            )))
        }
    }

    /// Whether `node` is occupied at `time`, either by a transient
    /// reservation or by a destination parked there from an earlier time.
    pub fn is_reserved(&self, time: usize, node: NodeId) -> bool {
        self.vertices.contains(&(time, node))
            || self.permanent.get(node).copied().flatten().is_some_and(|p| time >= p)
    }

    /// Whether the traversal `from -> to` completing at `time` is forbidden.
    pub fn is_edge_reserved(&self, time: usize, from: NodeId, to: NodeId) -> bool {
        self.edges.contains(&(time, from, to))
    }

    /// Additive weight charged for occupying `node` at `time`.
    pub fn additional_weight(&self, time: usize, node: NodeId) -> f64 {
        self.weights.get(&(time, node)).copied().unwrap_or(0.0)
    }

    /// The latest time at which `node` is known to be reserved, or `None`
    /// if it never is. If a destination is parked at `node`, the vertex
    /// also stays reserved at every later time.
    pub fn last_time_reserved(&self, node: NodeId) -> Option<usize> {
        match (self.last_transient[node], self.permanent[node]) {
            (Some(t), Some(p)) => Some(t.max(p)),
            (transient, permanent) => transient.or(permanent),
        }
    }

    /// Reserve `node` at `time`.
    pub fn add_vertex_constraint(&mut self, time: usize, node: NodeId) -> Result<()> {
        self.ensure_node(node)?;
        self.insert_vertex(time, node);
        Ok(())
    }

    /// Forbid the traversal `from -> to` completing at `time`.
    pub fn add_edge_constraint(&mut self, time: usize, from: NodeId, to: NodeId) -> Result<()> {
        self.ensure_node(from)?;
        self.ensure_node(to)?;
        self.edges.insert((time, from, to));
        Ok(())
    }

    /// Register an agent's committed path, reserving each vertex at its
    /// occupancy time and each traversed edge against head-on traversal.
    ///
    /// With `reserve_destination`, the final vertex stays reserved at every
    /// time from arrival onward. With `reversed`, the path is registered as
    /// if traversed from its last vertex to its first.
    pub fn add_path(
        &mut self,
        start_time: usize,
        path: &[NodeId],
        reserve_destination: bool,
        reversed: bool,
    ) -> Result<()> {
        for &node in path {
            self.ensure_node(node)?;
        }
        if path.is_empty() {
            return Ok(());
        }

        let mut steps = path.to_vec();
        if reversed {
            steps.reverse();
        }

        for (i, &node) in steps.iter().enumerate() {
            self.insert_vertex(start_time + i, node);
        }
        for (i, pair) in steps.windows(2).enumerate() {
            let (from, to) = (pair[0], pair[1]);
            if from != to {
                // Reserve the opposing direction at the arrival time, so a
                // head-on traversal of the same edge is rejected.
                self.edges.insert((start_time + i + 1, to, from));
            }
        }
        if reserve_destination {
            let destination = *steps.last().expect("path is non-empty");
            let arrival = start_time + steps.len() - 1;
            let parked = &mut self.permanent[destination];
            *parked = Some(parked.map_or(arrival, |p| p.min(arrival)));
        }
        debug!(
            start_time,
            steps = steps.len(),
            reserve_destination,
            "path registered"
        );
        Ok(())
    }

    /// Charge an additive cost for occupying each vertex of `path` at its
    /// occupancy time. Repeated registrations accumulate.
    pub fn add_weight_path(&mut self, start_time: usize, path: &[NodeId], extra: f64) -> Result<()> {
        if !extra.is_finite() || extra < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "additional weight must be finite and non-negative, got {extra}"
            )));
        }
        for &node in path {
            self.ensure_node(node)?;
        }
        for (i, &node) in path.iter().enumerate() {
            *self.weights.entry((start_time + i, node)).or_insert(0.0) += extra;
        }
        Ok(())
    }

    fn insert_vertex(&mut self, time: usize, node: NodeId) {
        self.vertices.insert((time, node));
        let last = &mut self.last_transient[node];
        *last = Some(last.map_or(time, |t| t.max(time)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_constraints() {
        let mut rt = ReservationTable::new(4);
        rt.add_vertex_constraint(2, 1).unwrap();
        assert!(rt.is_reserved(2, 1));
        assert!(!rt.is_reserved(1, 1));
        assert!(!rt.is_reserved(2, 0));
        assert!(rt.add_vertex_constraint(0, 9).is_err());
    }

    #[test]
    fn path_reserves_vertices_at_their_times() {
        let mut rt = ReservationTable::new(5);
        rt.add_path(3, &[0, 1, 2], false, false).unwrap();
        assert!(rt.is_reserved(3, 0));
        assert!(rt.is_reserved(4, 1));
        assert!(rt.is_reserved(5, 2));
        assert!(!rt.is_reserved(3, 1));
        // Without reserve_destination, the final cell frees up afterwards.
        assert!(!rt.is_reserved(6, 2));
    }

    #[test]
    fn path_reserves_opposing_edges() {
        let mut rt = ReservationTable::new(4);
        rt.add_path(0, &[0, 1, 2], false, false).unwrap();
        // The agent traverses 0->1 arriving at t=1, so 1->0 at t=1 would be
        // a head-on collision.
        assert!(rt.is_edge_reserved(1, 1, 0));
        assert!(rt.is_edge_reserved(2, 2, 1));
        // The direction the agent itself used is not blocked.
        assert!(!rt.is_edge_reserved(1, 0, 1));
    }

    #[test]
    fn pauses_do_not_reserve_edges() {
        let mut rt = ReservationTable::new(3);
        rt.add_path(0, &[1, 1, 2], false, false).unwrap();
        assert!(rt.is_reserved(0, 1));
        assert!(rt.is_reserved(1, 1));
        assert!(!rt.is_edge_reserved(1, 1, 1));
    }

    #[test]
    fn reversed_path_registration() {
        let mut rt = ReservationTable::new(4);
        rt.add_path(0, &[0, 1, 2], false, true).unwrap();
        // Registered as 2 -> 1 -> 0.
        assert!(rt.is_reserved(0, 2));
        assert!(rt.is_reserved(1, 1));
        assert!(rt.is_reserved(2, 0));
        assert!(rt.is_edge_reserved(1, 1, 2));
    }

    #[test]
    fn destination_reservation_is_permanent() {
        let mut rt = ReservationTable::new(4);
        rt.add_path(1, &[0, 1, 2], true, false).unwrap();
        // Arrival at t=3; the destination stays occupied from then on.
        assert!(rt.is_reserved(3, 2));
        assert!(rt.is_reserved(10, 2));
        assert!(!rt.is_reserved(2, 2));
        assert_eq!(rt.last_time_reserved(2), Some(3));
        assert_eq!(rt.last_time_reserved(0), Some(1));
        assert_eq!(rt.last_time_reserved(3), None);
    }

    #[test]
    fn last_time_reserved_tracks_transients() {
        let mut rt = ReservationTable::new(2);
        rt.add_vertex_constraint(4, 0).unwrap();
        rt.add_vertex_constraint(2, 0).unwrap();
        assert_eq!(rt.last_time_reserved(0), Some(4));
    }

    #[test]
    fn additional_weights_accumulate() {
        let mut rt = ReservationTable::new(3);
        rt.add_weight_path(0, &[0, 1, 2], 0.5).unwrap();
        rt.add_weight_path(1, &[1], 0.25).unwrap();
        assert_eq!(rt.additional_weight(0, 0), 0.5);
        assert_eq!(rt.additional_weight(1, 1), 0.75);
        assert_eq!(rt.additional_weight(2, 2), 0.5);
        assert_eq!(rt.additional_weight(5, 0), 0.0);
        assert!(rt.add_weight_path(0, &[0], -1.0).is_err());
    }

    #[test]
    fn empty_path_is_a_no_op() {
        let mut rt = ReservationTable::new(2);
        rt.add_path(0, &[], true, false).unwrap();
        assert_eq!(rt.last_time_reserved(0), None);
        assert_eq!(rt.last_time_reserved(1), None);
    }
}
