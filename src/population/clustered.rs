use rand::{Rng, seq::{IndexedRandom, SliceRandom}};
use rand_distr::{Binomial, Distribution};
use tracing::{debug, info};

use crate::{
    error::{GrreatError, Result},
    grid::Grid,
    population::Population,
};

/// A precinct waiting to be interpolated, with the four already-set
/// precincts its value is averaged from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Dependency {
    pub(crate) node: usize,
    pub(crate) sources: [usize; 4],
}

/// Wrap a lattice coordinate across the seam of a `2^n + 1` side.
///
/// The first and last rows (columns) play the role of one shared seam, so the
/// lattice period is `len - 1`.
#[inline]
fn lattice_wrap(v: isize, len: usize) -> usize {
    let period = (len - 1) as isize;
    if v < 0 { (v + period) as usize } else if v > period { (v - period) as usize } else { v as usize }
}

/// Build the diamond-square readiness rounds for a grid.
///
/// Every precinct of round `k` depends only on the corners and on precincts of
/// rounds `< k`, so processing rounds in order (in any order within a round)
/// always finds the four sources already set. Grids whose sides differ refine
/// the longer axis alone once the shorter one reaches unit spacing.
pub(crate) fn readiness_rounds(grid: &Grid) -> Vec<Vec<Dependency>> {
    let (w, h) = (grid.width(), grid.height());
    let (mut sx, mut sy) = (w - 1, h - 1);
    let mut rounds = Vec::new();

    while sx > 1 || sy > 1 {
        let hx = if sx > 1 { sx / 2 } else { 0 };
        let hy = if sy > 1 { sy / 2 } else { 0 };
        let at = |x: usize, y: usize| grid.index(x, y);

        match (hx > 0, hy > 0) {
            (true, true) => {
                // Square step: cell centers from their four corners.
                let mut square = Vec::new();
                for y in (hy..h).step_by(sy) {
                    for x in (hx..w).step_by(sx) {
                        square.push(Dependency {
                            node: at(x, y),
                            sources: [at(x - hx, y - hy), at(x + hx, y - hy), at(x - hx, y + hy), at(x + hx, y + hy)],
                        });
                    }
                }
                rounds.push(square);

                // Diamond step: edge midpoints from the two lattice ends and the two cell centers.
                let diamond_sources = |x: usize, y: usize| {
                    let (xi, yi) = (x as isize, y as isize);
                    [
                        at(lattice_wrap(xi - hx as isize, w), y),
                        at(lattice_wrap(xi + hx as isize, w), y),
                        at(x, lattice_wrap(yi - hy as isize, h)),
                        at(x, lattice_wrap(yi + hy as isize, h)),
                    ]
                };
                let mut diamond = Vec::new();
                for y in (0..h).step_by(sy) {
                    for x in (hx..w).step_by(sx) {
                        diamond.push(Dependency { node: at(x, y), sources: diamond_sources(x, y) });
                    }
                }
                for y in (hy..h).step_by(sy) {
                    for x in (0..w).step_by(sx) {
                        diamond.push(Dependency { node: at(x, y), sources: diamond_sources(x, y) });
                    }
                }
                rounds.push(diamond);
            }
            (true, false) => {
                // Columns are complete; fill the midway columns from the set columns either side.
                let mut strip = Vec::new();
                for x in (hx..w).step_by(sx) {
                    for y in 0..h {
                        let (up, down) = ((y + h - 1) % h, (y + 1) % h);
                        strip.push(Dependency {
                            node: at(x, y),
                            sources: [at(x - hx, up), at(x + hx, up), at(x - hx, down), at(x + hx, down)],
                        });
                    }
                }
                rounds.push(strip);
            }
            (false, true) => {
                let mut strip = Vec::new();
                for y in (hy..h).step_by(sy) {
                    for x in 0..w {
                        let (left, right) = ((x + w - 1) % w, (x + 1) % w);
                        strip.push(Dependency {
                            node: at(x, y),
                            sources: [at(left, y - hy), at(left, y + hy), at(right, y - hy), at(right, y + hy)],
                        });
                    }
                }
                rounds.push(strip);
            }
            (false, false) => unreachable!("loop condition guarantees one axis still refines"),
        }

        if hx > 0 { sx = hx }
        if hy > 0 { sy = hy }
    }

    rounds
}

/// Running state of one generation pass: which precincts are set and how many
/// voters of each party remain to be placed.
struct Generator {
    grid: Grid,
    precinct_population: u64,
    red: Vec<Option<u32>>,
    red_remaining: u64,
    blue_remaining: u64,
}

impl Generator {
    fn error(&self, node: usize, reason: impl Into<String>) -> GrreatError {
        let (x, y) = self.grid.coords(node);
        GrreatError::GenerationError {
            x, y,
            red_remaining: self.red_remaining,
            blue_remaining: self.blue_remaining,
            reason: reason.into(),
        }
    }

    #[inline] fn is_set(&self, node: usize) -> bool { self.red[node].is_some() }

    /// Clamp a proposed red count so both remainders stay non-negative.
    fn clamp(&self, node: usize, proposed: u64) -> Result<u64> {
        let lo = self.precinct_population.saturating_sub(self.blue_remaining);
        let hi = self.precinct_population.min(self.red_remaining);
        if lo > hi {
            return Err(self.error(node, "remaining voters cannot fill this precinct"));
        }
        Ok(proposed.clamp(lo, hi))
    }

    /// Binomial draw of a precinct's red count against the current remainders.
    fn draw<R: Rng + ?Sized>(&self, node: usize, rng: &mut R) -> Result<u64> {
        let remaining = self.red_remaining + self.blue_remaining;
        if remaining == 0 {
            return Err(self.error(node, "no voters remain"));
        }
        let p = self.red_remaining as f64 / remaining as f64;
        let binomial = Binomial::new(self.precinct_population, p)
            .map_err(|e| self.error(node, format!("binomial({}, {p}): {e}", self.precinct_population)))?;
        Ok(binomial.sample(rng))
    }

    fn assign(&mut self, node: usize, red: u64) {
        debug_assert!(!self.is_set(node), "node {node} assigned twice");
        let blue = self.precinct_population - red;
        self.red_remaining -= red;
        self.blue_remaining -= blue;
        self.red[node] = Some(red as u32);
    }

    /// Assign `node` from a pure random draw (corner and random-fill steps).
    fn assign_random<R: Rng + ?Sized>(&mut self, node: usize, rng: &mut R) -> Result<()> {
        let red = self.clamp(node, self.draw(node, rng)?)?;
        self.assign(node, red);
        Ok(())
    }

    /// Assign `node` by blending the average of its sources with a random draw.
    fn assign_interpolated<R: Rng + ?Sized>(&mut self, dep: &Dependency, weight: f64, rng: &mut R) -> Result<()> {
        let mut sum = 0u64;
        for &source in &dep.sources {
            match self.red[source] {
                Some(red) => sum += red as u64,
                None => return Err(self.error(dep.node, format!("source precinct {:?} is not set yet", self.grid.coords(source)))),
            }
        }
        let average = sum as f64 / 4.0;
        let random = self.draw(dep.node, rng)? as f64;
        let blended = (average * weight + random * (1.0 - weight)).round() as u64;
        let red = self.clamp(dep.node, blended)?;
        self.assign(dep.node, red);
        Ok(())
    }
}

/// Generate a clustered population with exactly `red_total` red and
/// `blue_total` blue voters.
///
/// - `random_steps` (>= 4) is the number of precincts drawn purely at random
///   before interpolation starts: the four corners plus `random_steps - 4`
///   uniformly chosen precincts.
/// - `neighbor_weight` in `[0, 1]` is the share of each interpolated precinct
///   taken from the average of its sources; the rest is a fresh binomial draw.
///
/// The per-precinct population is `(red_total + blue_total) / node_count`,
/// which must divide evenly.
pub fn generate<R: Rng + ?Sized>(
    grid: Grid,
    red_total: u64,
    blue_total: u64,
    random_steps: usize,
    neighbor_weight: f64,
    rng: &mut R,
) -> Result<Population> {
    if random_steps < 4 {
        return Err(GrreatError::config(format!("geo_random_steps must be at least 4, got {random_steps}")));
    }
    if !(0.0..=1.0).contains(&neighbor_weight) {
        return Err(GrreatError::config(format!("geo_neighbor_weight must be in [0, 1], got {neighbor_weight}")));
    }

    let nodes = grid.node_count();
    let total = red_total + blue_total;
    let mut state = Generator {
        grid,
        precinct_population: total / nodes as u64,
        red: vec![None; nodes],
        red_remaining: red_total,
        blue_remaining: blue_total,
    };

    if total == 0 || total % nodes as u64 != 0 {
        return Err(state.error(0, format!("{total} voters do not divide evenly into {nodes} precincts")));
    }
    if state.precinct_population > u32::MAX as u64 {
        return Err(state.error(0, "precinct population does not fit in 32 bits"));
    }
    if random_steps > nodes {
        return Err(state.error(0, format!("{random_steps} random steps exceed {nodes} precincts")));
    }

    info!(width = grid.width(), height = grid.height(), red_total, blue_total, random_steps, neighbor_weight,
        "[generate] clustered population");

    // Seed step: the four corners in random order.
    let mut corners = grid.corners();
    corners.shuffle(rng);
    for node in corners {
        state.assign_random(node, rng)?;
    }

    // Random-fill step: uniformly chosen unset precincts.
    let mut unset = (0..nodes).filter(|&u| !state.is_set(u)).collect::<Vec<_>>();
    for _ in 4..random_steps {
        let Some(&node) = unset.choose(rng) else { break };
        unset.retain(|&u| u != node);
        state.assign_random(node, rng)?;
    }

    // Diamond-square rounds, shuffled within each round.
    for (level, mut round) in readiness_rounds(&grid).into_iter().enumerate() {
        round.shuffle(rng);
        for dep in &round {
            if state.is_set(dep.node) { continue }
            state.assign_interpolated(dep, neighbor_weight, rng)?;
        }
        debug!(level, size = round.len(), red_remaining = state.red_remaining,
            blue_remaining = state.blue_remaining, "[generate] round complete");
    }

    if let Some(node) = state.red.iter().position(Option::is_none) {
        return Err(state.error(node, "precinct left unset after all rounds"));
    }
    if state.red_remaining != 0 || state.blue_remaining != 0 {
        return Err(state.error(nodes - 1, "voters left over after every precinct was set"));
    }

    let precinct_population = state.precinct_population as u32;
    let red = state.red.into_iter().flatten().collect();
    Population::from_red_counts(grid, precinct_population, red)
}
