use serde::{Deserialize, Serialize};

use crate::error::{GrreatError, Result};

/// A toroidal rectangular lattice of precincts stored as a flat arena.
///
/// Node `i` sits at `(i % width, i / width)`. Every node has exactly four
/// neighbors (left, right, up, down); neighbors of boundary nodes wrap to
/// the opposite side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
}

/// True when `value` is one plus a power of two, at least 3.
pub fn is_one_plus_power_of_two(value: usize) -> bool {
    value >= 3 && (value - 1).is_power_of_two()
}

impl Grid {
    /// Construct a grid, checking that both sides are of the form 2^n + 1.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if !is_one_plus_power_of_two(width) {
            return Err(GrreatError::InvalidGridDimension { axis: "width", value: width });
        }
        if !is_one_plus_power_of_two(height) {
            return Err(GrreatError::InvalidGridDimension { axis: "height", value: height });
        }
        Ok(Self { width, height })
    }

    #[inline] pub fn width(&self) -> usize { self.width }

    #[inline] pub fn height(&self) -> usize { self.height }

    /// Get the number of precincts in the grid.
    #[inline] pub fn node_count(&self) -> usize { self.width * self.height }

    /// Get the number of undirected adjacency edges (two per node on a torus).
    #[inline] pub fn edge_count(&self) -> usize { 2 * self.node_count() }

    /// Flat index of the precinct at `(x, y)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) out of range");
        y * self.width + x
    }

    /// Coordinates of the precinct at flat index `node`.
    #[inline]
    pub fn coords(&self, node: usize) -> (usize, usize) {
        debug_assert!(node < self.node_count(), "node {node} out of range");
        (node % self.width, node / self.width)
    }

    /// Flat index of `(x, y)` after wrapping both coordinates onto the torus.
    #[inline]
    pub fn wrapped_index(&self, x: isize, y: isize) -> usize {
        let x = x.rem_euclid(self.width as isize) as usize;
        let y = y.rem_euclid(self.height as isize) as usize;
        self.index(x, y)
    }

    /// The four grid-adjacent neighbors of `node`: left, right, up, down.
    #[inline]
    pub fn neighbors(&self, node: usize) -> [usize; 4] {
        let (x, y) = self.coords(node);
        let (x, y) = (x as isize, y as isize);
        [
            self.wrapped_index(x - 1, y),
            self.wrapped_index(x + 1, y),
            self.wrapped_index(x, y - 1),
            self.wrapped_index(x, y + 1),
        ]
    }

    /// Get an iterator over the neighbors of a given node.
    #[inline]
    pub fn edges(&self, node: usize) -> impl Iterator<Item = usize> + use<> {
        self.neighbors(node).into_iter()
    }

    /// The four corner precincts, in row-major order.
    pub fn corners(&self) -> [usize; 4] {
        let (w, h) = (self.width - 1, self.height - 1);
        [self.index(0, 0), self.index(w, 0), self.index(0, h), self.index(w, h)]
    }

    /// Wrap-aware per-axis offset between two real-valued positions.
    #[inline]
    pub fn axis_delta(a: f64, b: f64, period: usize) -> f64 {
        let period = period as f64;
        let d = (a - b).abs() % period;
        d.min(period - d)
    }

    /// Euclidean distance between two points on the torus.
    pub fn toroidal_distance_between(&self, a: (f64, f64), b: (f64, f64)) -> f64 {
        let dx = Self::axis_delta(a.0, b.0, self.width);
        let dy = Self::axis_delta(a.1, b.1, self.height);
        (dx * dx + dy * dy).sqrt()
    }

    /// Euclidean distance between two precincts on the torus.
    pub fn toroidal_distance(&self, a: usize, b: usize) -> f64 {
        let (ax, ay) = self.coords(a);
        let (bx, by) = self.coords(b);
        self.toroidal_distance_between((ax as f64, ay as f64), (bx as f64, by as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_sizes_not_one_plus_power_of_two() {
        assert!(matches!(Grid::new(4, 5), Err(GrreatError::InvalidGridDimension { axis: "width", value: 4 })));
        assert!(matches!(Grid::new(5, 2), Err(GrreatError::InvalidGridDimension { axis: "height", value: 2 })));
        assert!(Grid::new(1, 3).is_err());
        assert!(Grid::new(3, 3).is_ok());
        assert!(Grid::new(33, 9).is_ok());
    }

    #[test]
    fn index_coords_round_trip() {
        let grid = Grid::new(5, 9).unwrap();
        for node in 0..grid.node_count() {
            let (x, y) = grid.coords(node);
            assert_eq!(grid.index(x, y), node);
        }
    }

    #[test]
    fn every_node_has_four_wrapping_neighbors() {
        let grid = Grid::new(5, 5).unwrap();

        // Corner (0, 0) wraps left to (4, 0) and up to (0, 4).
        let n = grid.neighbors(grid.index(0, 0));
        assert_eq!(n, [grid.index(4, 0), grid.index(1, 0), grid.index(0, 4), grid.index(0, 1)]);

        // Adjacency is symmetric everywhere.
        for u in 0..grid.node_count() {
            for v in grid.edges(u) {
                assert!(grid.edges(v).any(|w| w == u), "{u} -> {v} not symmetric");
            }
        }
    }

    #[test]
    fn toroidal_distance_takes_the_short_way_round() {
        let grid = Grid::new(9, 9).unwrap();
        let a = grid.index(0, 0);
        assert_eq!(grid.toroidal_distance(a, grid.index(8, 0)), 1.0);
        assert_eq!(grid.toroidal_distance(a, grid.index(8, 8)), 2f64.sqrt());
        assert_eq!(grid.toroidal_distance(a, grid.index(3, 4)), 5.0);
    }

    #[test]
    fn corners_are_distinct() {
        let grid = Grid::new(3, 3).unwrap();
        let mut corners = grid.corners().to_vec();
        corners.dedup();
        assert_eq!(corners, vec![0, 2, 6, 8]);
    }
}
