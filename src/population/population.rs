use serde::Serialize;

use crate::{error::{GrreatError, Result}, grid::Grid};

/// Party counts of one precinct, addressed by its grid coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Precinct {
    pub x: usize,
    pub y: usize,
    pub red_count: u32,
    pub blue_count: u32,
}

/// Red/blue voter counts for every precinct of a grid.
///
/// Every precinct holds exactly `precinct_population` voters, so only the red
/// count is stored; blue is the complement. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Population {
    grid: Grid,
    precinct_population: u32,
    red: Vec<u32>,
}

impl Population {
    /// Build a population from per-precinct red counts (row-major).
    pub fn from_red_counts(grid: Grid, precinct_population: u32, red: Vec<u32>) -> Result<Self> {
        if precinct_population == 0 {
            return Err(GrreatError::config("precinct population must be at least 1"));
        }
        if red.len() != grid.node_count() {
            return Err(GrreatError::population_map(None, format!(
                "expected {} precinct counts, found {}", grid.node_count(), red.len()
            )));
        }
        if let Some(node) = red.iter().position(|&r| r > precinct_population) {
            let (x, y) = grid.coords(node);
            return Err(GrreatError::population_map(
                Some((x, y)),
                format!("red count {} exceeds precinct population {precinct_population}", red[node]),
            ));
        }
        Ok(Self { grid, precinct_population, red })
    }

    #[inline] pub fn grid(&self) -> Grid { self.grid }

    #[inline] pub fn precinct_population(&self) -> u32 { self.precinct_population }

    /// Red voters in the precinct at flat index `node`.
    #[inline] pub fn red(&self, node: usize) -> u32 { self.red[node] }

    /// Blue voters in the precinct at flat index `node`.
    #[inline] pub fn blue(&self, node: usize) -> u32 { self.precinct_population - self.red[node] }

    /// All red counts in row-major order.
    #[inline] pub fn red_counts(&self) -> &[u32] { &self.red }

    /// Get the precinct at `(x, y)`.
    pub fn precinct(&self, x: usize, y: usize) -> Precinct {
        let node = self.grid.index(x, y);
        Precinct { x, y, red_count: self.red(node), blue_count: self.blue(node) }
    }

    /// Iterate over every precinct in row-major order.
    pub fn precincts(&self) -> impl Iterator<Item = Precinct> + '_ {
        (0..self.grid.node_count()).map(|node| {
            let (x, y) = self.grid.coords(node);
            Precinct { x, y, red_count: self.red(node), blue_count: self.blue(node) }
        })
    }

    pub fn total_red(&self) -> u64 { self.red.iter().map(|&r| r as u64).sum() }

    pub fn total_blue(&self) -> u64 { self.total() - self.total_red() }

    /// Total voters in the world.
    pub fn total(&self) -> u64 { self.precinct_population as u64 * self.grid.node_count() as u64 }

    /// Fraction of all voters that are red.
    pub fn red_fraction(&self) -> f64 { self.total_red() as f64 / self.total() as f64 }
}
