use ahash::AHashSet;

use crate::{
    error::{GrreatError, Result},
    grid::Grid,
    partition::{Frontier, Rolls},
};

/// Mapping from every precinct of a grid to a district id in `1..=num_districts`.
///
/// District ids are fixed for the lifetime of the assignment; a district may be
/// transiently empty while the optimizer works, which is how the district count
/// is allowed to drift from its target.
#[derive(Clone, Debug)]
pub struct DistrictAssignment {
    grid: Grid,
    num_districts: u32,
    pub(super) rolls: Rolls,       // Precincts of each district
    pub(super) frontier: Frontier, // Precincts on the boundary of each district
}

impl DistrictAssignment {
    /// Build from district ids in row-major precinct order.
    pub fn from_assignments(grid: Grid, num_districts: u32, assignments: Vec<u32>) -> Result<Self> {
        if num_districts == 0 {
            return Err(GrreatError::config("an assignment needs at least one district"));
        }
        if assignments.len() != grid.node_count() {
            return Err(GrreatError::assignment(format!(
                "{} district ids given for {} precincts", assignments.len(), grid.node_count()
            )));
        }
        if let Some(node) = assignments.iter().position(|&d| d == 0 || d > num_districts) {
            let (x, y) = grid.coords(node);
            return Err(GrreatError::assignment_at(x, y, format!(
                "district {} outside 1..={num_districts}", assignments[node]
            )));
        }

        let mut assignment = Self {
            grid,
            num_districts,
            rolls: Rolls::enroll(num_districts, assignments),
            frontier: Frontier::new(num_districts as usize + 1, grid.node_count()),
        };
        assignment.rebuild_frontier();
        Ok(assignment)
    }

    /// Build from `((x, y), district)` pairs, rejecting missing or duplicated precincts.
    pub fn from_pairs<I>(grid: Grid, num_districts: u32, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = ((usize, usize), u32)>,
    {
        let mut assignments = vec![0u32; grid.node_count()];
        let mut seen = AHashSet::with_capacity(grid.node_count());
        for ((x, y), district) in pairs {
            if x >= grid.width() || y >= grid.height() {
                return Err(GrreatError::assignment_at(x, y, "precinct outside the grid"));
            }
            if !seen.insert((x, y)) {
                return Err(GrreatError::assignment_at(x, y, "precinct assigned more than once"));
            }
            assignments[grid.index(x, y)] = district;
        }
        if let Some(node) = (0..grid.node_count()).find(|&u| !seen.contains(&grid.coords(u))) {
            let (x, y) = grid.coords(node);
            return Err(GrreatError::assignment_at(x, y, "precinct missing from assignment"));
        }
        Self::from_assignments(grid, num_districts, assignments)
    }

    #[inline] pub fn grid(&self) -> Grid { self.grid }

    /// Target number of districts (ids run `1..=num_districts`).
    #[inline] pub fn num_districts(&self) -> u32 { self.num_districts }

    /// District id of the precinct at flat index `node`.
    #[inline] pub fn assignment(&self, node: usize) -> u32 { self.rolls.district_of(node) }

    /// District id of the precinct at `(x, y)`.
    #[inline] pub fn district_at(&self, x: usize, y: usize) -> u32 { self.assignment(self.grid.index(x, y)) }

    /// District id of every precinct in row-major order.
    #[inline] pub fn assignments(&self) -> &[u32] { self.rolls.ids() }

    /// Precincts currently in `district`.
    #[inline] pub fn precincts(&self, district: u32) -> &[usize] { self.rolls.roll(district) }

    #[inline] pub fn district_size(&self, district: u32) -> usize { self.rolls.roll(district).len() }

    /// Iterator over the real district ids.
    #[inline] pub fn districts(&self) -> impl Iterator<Item = u32> + use<> { 1..=self.num_districts }

    /// Number of district ids that currently hold no precincts.
    pub fn empty_districts(&self) -> usize {
        self.districts().filter(|&d| self.district_size(d) == 0).count()
    }

    /// Number of districts that hold at least one precinct.
    pub fn occupied_districts(&self) -> usize {
        self.num_districts as usize - self.empty_districts()
    }

    /// Boundary precincts of `district`.
    #[inline] pub(crate) fn frontier(&self, district: u32) -> &[usize] { self.frontier.get(district) }

    /// Check that every precinct belongs to exactly one real district.
    pub fn validate(&self) -> Result<()> {
        if let Some(node) = self.assignments().iter().position(|&d| d == 0 || d > self.num_districts) {
            let (x, y) = self.grid.coords(node);
            return Err(GrreatError::assignment_at(x, y, "precinct has no district"));
        }
        let counted = self.districts().map(|d| self.district_size(d)).sum::<usize>();
        if counted != self.grid.node_count() {
            return Err(GrreatError::assignment(format!(
                "{counted} district memberships for {} precincts", self.grid.node_count()
            )));
        }
        Ok(())
    }

    /// Recompute boundary membership of every precinct from scratch.
    pub(crate) fn rebuild_frontier(&mut self) {
        self.frontier.clear();
        for u in 0..self.grid.node_count() {
            let district = self.assignment(u);
            if self.grid.edges(u).any(|v| self.assignment(v) != district) {
                self.frontier.insert(u, district);
            }
        }
    }
}
