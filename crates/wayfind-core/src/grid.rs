//! 2D grids with per-cell entry costs, obstacles and wrap-around borders.

use crate::error::{Error, Result};
use crate::traits::{Edge, NodeId, PathGraph};

/// Diagonal-movement policy for [`Grid`] neighbor enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagonalMovement {
    /// Only the 4-neighborhood is used.
    #[default]
    Never,
    /// A diagonal step is allowed iff both adjacent orthogonal cells are
    /// passable.
    OnlyWhenNoObstacle,
    /// A diagonal step is allowed iff at most one adjacent orthogonal cell
    /// is an obstacle.
    IfAtMostOneObstacle,
    /// A diagonal step is allowed whenever the target cell is passable.
    Always,
}

impl TryFrom<u8> for DiagonalMovement {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Never),
            1 => Ok(Self::OnlyWhenNoObstacle),
            2 => Ok(Self::IfAtMostOneObstacle),
            3 => Ok(Self::Always),
            other => Err(Error::InvalidArgument(format!(
                "diagonal movement policy must be 0..=3, got {other}"
            ))),
        }
    }
}

/// How a grid prices the pause action in space-time search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PauseCost {
    /// Every cell uses the configured fixed pause cost.
    #[default]
    Fixed,
    /// Pausing costs the weight of the occupied cell, clamped to zero.
    CellWeight,
}

impl TryFrom<u8> for PauseCost {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Fixed),
            1 => Ok(Self::CellWeight),
            other => Err(Error::InvalidArgument(format!(
                "pause cost policy must be 0 or 1, got {other}"
            ))),
        }
    }
}

// Orthogonal offsets first (N, E, S, W), then diagonals (NW, NE, SW, SE).
const ORTHOGONAL: [(isize, isize); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const DIAGONAL: [(isize, isize); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// A 2D grid of weighted cells with row-major ids `y * width + x`.
///
/// Entering a cell contributes its weight to path cost; the weight of the
/// starting cell is never charged. A weight of [`Grid::OBSTACLE`] marks the
/// cell impassable. Each border pair can independently be made passable, in
/// which case coordinates wrap modulo the relevant dimension.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    weights: Vec<f64>,
    min_weight: f64,
    diagonal_movement: DiagonalMovement,
    diagonal_multiplier: f64,
    wrap_x: bool,
    wrap_y: bool,
    pause_cost: f64,
    pause_cost_policy: PauseCost,
    edge_collision: bool,
}

impl Grid {
    /// Sentinel weight marking an impassable cell.
    pub const OBSTACLE: f64 = -1.0;

    /// Create a grid with every cell weight set to 1.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument(format!(
                "grid dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            weights: vec![1.0; width * height],
            min_weight: 1.0,
            diagonal_movement: DiagonalMovement::default(),
            diagonal_multiplier: 1.0,
            wrap_x: false,
            wrap_y: false,
            pause_cost: 1.0,
            pause_cost_policy: PauseCost::default(),
            edge_collision: false,
        })
    }

    /// Create a grid from a row-major weight vector.
    pub fn with_weights(width: usize, height: usize, weights: Vec<f64>) -> Result<Self> {
        let mut grid = Self::new(width, height)?;
        grid.set_weights(weights)?;
        Ok(grid)
    }

    /// Grid width.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major id of the cell at `(x, y)`, or `None` if out of bounds.
    #[inline]
    pub fn node_id(&self, x: usize, y: usize) -> Option<NodeId> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// `(x, y)` coordinates of `node`, or `None` if out of range.
    #[inline]
    pub fn coords(&self, node: NodeId) -> Option<(usize, usize)> {
        (node < self.weights.len()).then(|| (node % self.width, node / self.width))
    }

    /// Weight of a cell.
    pub fn weight(&self, node: NodeId) -> Result<f64> {
        self.ensure_node(node)?;
        Ok(self.weights[node])
    }

    /// All cell weights in row-major order.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Whether the cell is impassable. Out-of-range ids count as obstacles.
    #[inline]
    pub fn has_obstacle(&self, node: NodeId) -> bool {
        self.weights.get(node).is_none_or(|&w| w == Self::OBSTACLE)
    }

    /// Mark a cell impassable.
    pub fn add_obstacle(&mut self, node: NodeId) -> Result<()> {
        self.update_weight(node, Self::OBSTACLE)
    }

    /// Restore an impassable cell to weight 1.
    pub fn remove_obstacle(&mut self, node: NodeId) -> Result<()> {
        self.update_weight(node, 1.0)
    }

    /// Reset every cell to weight 1, clearing all obstacles.
    pub fn clear_weights(&mut self) {
        self.weights.fill(1.0);
        self.min_weight = 1.0;
    }

    /// Set the weight of one cell: non-negative, or [`Grid::OBSTACLE`].
    ///
    /// Resumable searches must be re-anchored after a weight change.
    pub fn update_weight(&mut self, node: NodeId, weight: f64) -> Result<()> {
        self.ensure_node(node)?;
        Self::check_weight(weight)?;
        self.weights[node] = weight;
        self.recompute_min_weight();
        Ok(())
    }

    /// Replace all cell weights. The vector length must equal `size()`.
    pub fn set_weights(&mut self, weights: Vec<f64>) -> Result<()> {
        if weights.len() != self.weights.len() {
            return Err(Error::InvalidArgument(format!(
                "expected {} weights, got {}",
                self.weights.len(),
                weights.len()
            )));
        }
        for &w in &weights {
            Self::check_weight(w)?;
        }
        self.weights = weights;
        self.recompute_min_weight();
        Ok(())
    }

    /// The active diagonal-movement policy.
    pub fn diagonal_movement(&self) -> DiagonalMovement {
        self.diagonal_movement
    }

    /// Select the diagonal-movement policy.
    pub fn set_diagonal_movement(&mut self, policy: DiagonalMovement) {
        self.diagonal_movement = policy;
    }

    /// Scale factor applied to the entry cost of diagonal moves.
    pub fn set_diagonal_multiplier(&mut self, multiplier: f64) -> Result<()> {
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "diagonal multiplier must be finite and non-negative, got {multiplier}"
            )));
        }
        self.diagonal_multiplier = multiplier;
        Ok(())
    }

    /// Make the left and right borders passable: x coordinates wrap modulo
    /// the width.
    pub fn set_wrap_x(&mut self, wrap: bool) {
        self.wrap_x = wrap;
    }

    /// Make the top and bottom borders passable: y coordinates wrap modulo
    /// the height.
    pub fn set_wrap_y(&mut self, wrap: bool) {
        self.wrap_y = wrap;
    }

    /// Set the fixed pause cost. Must be non-negative.
    pub fn set_pause_cost(&mut self, cost: f64) -> Result<()> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "pause cost must be finite and non-negative, got {cost}"
            )));
        }
        self.pause_cost = cost;
        Ok(())
    }

    /// Select how the pause action is priced.
    pub fn set_pause_cost_policy(&mut self, policy: PauseCost) {
        self.pause_cost_policy = policy;
    }

    /// Forbid two agents from traversing one edge in opposite directions at
    /// the same time step.
    pub fn set_edge_collision(&mut self, enabled: bool) {
        self.edge_collision = enabled;
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn check_weight(weight: f64) -> Result<()> {
        if weight == Self::OBSTACLE || (weight.is_finite() && weight >= 0.0) {
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!(
                "cell weight must be non-negative or -1 for an obstacle, got {weight}"
            )))
        }
    }

    fn recompute_min_weight(&mut self) {
        self.min_weight = self
            .weights
            .iter()
            .copied()
            .filter(|&w| w != Self::OBSTACLE)
            .min_by(f64::total_cmp)
            .unwrap_or(1.0);
    }

    // Apply an offset along one axis, wrapping when the border is passable.
    fn shift_axis(value: usize, delta: isize, extent: usize, wrap: bool) -> Option<usize> {
        let moved = value as isize + delta;
        if (0..extent as isize).contains(&moved) {
            Some(moved as usize)
        } else if wrap {
            Some(moved.rem_euclid(extent as isize) as usize)
        } else {
            None
        }
    }

    fn offset(&self, x: usize, y: usize, dx: isize, dy: isize) -> Option<NodeId> {
        let nx = Self::shift_axis(x, dx, self.width, self.wrap_x)?;
        let ny = Self::shift_axis(y, dy, self.height, self.wrap_y)?;
        Some(ny * self.width + nx)
    }

    // Wrap-aware absolute distance along one axis.
    fn axis_distance(a: usize, b: usize, extent: usize, wrap: bool) -> usize {
        let d = a.abs_diff(b);
        if wrap {
            d.min(extent - d)
        } else {
            d
        }
    }

    fn diagonal_allowed(&self, blocked_sides: u8) -> bool {
        match self.diagonal_movement {
            DiagonalMovement::Never => false,
            DiagonalMovement::OnlyWhenNoObstacle => blocked_sides == 0,
            DiagonalMovement::IfAtMostOneObstacle => blocked_sides <= 1,
            DiagonalMovement::Always => true,
        }
    }
}

impl PathGraph for Grid {
    fn size(&self) -> usize {
        self.weights.len()
    }

    fn neighbors_into(&self, node: NodeId, _reversed: bool, buf: &mut Vec<Edge>) {
        let (x, y) = (node % self.width, node / self.width);

        for (dx, dy) in ORTHOGONAL {
            if let Some(to) = self.offset(x, y, dx, dy) {
                if !self.has_obstacle(to) {
                    buf.push(Edge::new(to, self.weights[to]));
                }
            }
        }

        if self.diagonal_movement == DiagonalMovement::Never {
            return;
        }
        for (dx, dy) in DIAGONAL {
            let Some(to) = self.offset(x, y, dx, dy) else {
                continue;
            };
            if self.has_obstacle(to) {
                continue;
            }
            // Out-of-range orthogonal cells count as obstacles for the
            // policy test.
            let blocked = |node: Option<NodeId>| node.is_none_or(|n| self.has_obstacle(n));
            let blocked_sides = blocked(self.offset(x, y, dx, 0)) as u8
                + blocked(self.offset(x, y, 0, dy)) as u8;
            if self.diagonal_allowed(blocked_sides) {
                buf.push(Edge::new(to, self.weights[to] * self.diagonal_multiplier));
            }
        }
    }

    fn is_directed(&self) -> bool {
        false
    }

    fn has_coordinates(&self) -> bool {
        true
    }

    fn estimate(&self, from: NodeId, to: NodeId) -> f64 {
        let (x1, y1) = (from % self.width, from / self.width);
        let (x2, y2) = (to % self.width, to / self.width);
        let dx = Self::axis_distance(x1, x2, self.width, self.wrap_x);
        let dy = Self::axis_distance(y1, y2, self.height, self.wrap_y);

        if self.diagonal_movement == DiagonalMovement::Never {
            return self.min_weight * (dx + dy) as f64;
        }
        let (dmin, dmax) = (dx.min(dy), dx.max(dy));
        let m = self.diagonal_multiplier;
        if m < 1.0 {
            // Every step costs at least m per unit of weight, and at least
            // dmax steps are needed.
            self.min_weight * m * dmax as f64
        } else {
            // dmin diagonal steps plus straight steps for the remainder; a
            // diagonal pricier than two straight steps is never taken.
            self.min_weight * ((dmax - dmin) as f64 + dmin as f64 * m.min(2.0))
        }
    }

    fn min_weight(&self) -> f64 {
        self.min_weight
    }

    fn passable(&self, node: NodeId) -> bool {
        !self.has_obstacle(node)
    }

    fn pause_cost(&self, node: NodeId) -> f64 {
        match self.pause_cost_policy {
            PauseCost::Fixed => self.pause_cost,
            PauseCost::CellWeight => self.weights[node].max(0.0),
        }
    }

    fn edge_collision(&self) -> bool {
        self.edge_collision
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn policy_round_trip() {
        for policy in [
            DiagonalMovement::Never,
            DiagonalMovement::OnlyWhenNoObstacle,
            DiagonalMovement::IfAtMostOneObstacle,
            DiagonalMovement::Always,
        ] {
            let json = serde_json::to_string(&policy).unwrap();
            let back: DiagonalMovement = serde_json::from_str(&json).unwrap();
            assert_eq!(policy, back);
        }
        let json = serde_json::to_string(&PauseCost::CellWeight).unwrap();
        let back: PauseCost = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PauseCost::CellWeight);
    }
}
