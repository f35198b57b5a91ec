//! Shared open-list machinery for the priority-queue engines.

use std::cmp::Ordering;

use wayfind_core::NodeId;

/// Sentinel parent for search roots.
pub(crate) const NO_PARENT: usize = usize::MAX;

/// Entry in the open list. Orders as a min-heap on `f`, breaking ties by
/// lower `h` and then lower vertex id, so expansion order is deterministic.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpenEntry {
    pub(crate) f: f64,
    pub(crate) h: f64,
    pub(crate) node: NodeId,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap (a max-heap) pops the smallest f first.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dense per-node search state. A pool of these is reused across queries;
/// bumping the generation counter invalidates every node at once.
#[derive(Clone)]
pub(crate) struct SearchNode {
    pub(crate) g: f64,
    pub(crate) parent: usize,
    pub(crate) generation: u32,
    pub(crate) open: bool,
}

impl Default for SearchNode {
    fn default() -> Self {
        Self {
            g: 0.0,
            parent: NO_PARENT,
            generation: 0,
            open: false,
        }
    }
}
