//! **wayfind-mapf** — multi-agent path finding primitives for the wayfind
//! pathfinding library.
//!
//! This crate provides the two building blocks that MAPF coordinators
//! (conflict-based search, windowed hierarchical planners, ...) compose:
//!
//! - [`ReservationTable`]: vertex and edge occupancy across time
//! - [`SpaceTimeAstar`]: single-agent planning in the `(vertex, time)`
//!   product space against a reservation table
//!
//! The coordinators themselves live outside this crate: they own the
//! reservation table, serialize its updates, and lend it to one space-time
//! query at a time.

#![forbid(unsafe_code)]

mod reservation;
mod space_time;

pub use reservation::ReservationTable;
pub use space_time::SpaceTimeAstar;

use wayfind_core::Path;

/// Pad `path` with pauses at its final vertex until it has `length`
/// entries. Paths already long enough, and empty paths, are left untouched.
pub fn ensure_path_length(path: &mut Path, length: usize) {
    if let Some(&last) = path.last() {
        while path.len() < length {
            path.push(last);
        }
    }
}
