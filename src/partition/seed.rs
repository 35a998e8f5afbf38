use rand::{Rng, seq::index::sample};
use tracing::info;

use crate::{
    error::{GrreatError, Result},
    grid::Grid,
    partition::DistrictAssignment,
};

/// Seed a starting assignment by Voronoi tessellation.
///
/// `num_districts` seed precincts are drawn uniformly without replacement;
/// seed `i` founds district `i + 1`. Every precinct joins the district of its
/// nearest seed under wrap-aware Euclidean distance, ties going to the lower
/// district id. Districts are usually, but not necessarily, contiguous.
pub fn seed<R: Rng + ?Sized>(grid: Grid, num_districts: u32, rng: &mut R) -> Result<DistrictAssignment> {
    let nodes = grid.node_count();
    if num_districts == 0 || num_districts as usize > nodes {
        return Err(GrreatError::config(format!(
            "num_districts must be in 1..={nodes}, got {num_districts}"
        )));
    }

    let seeds = sample(rng, nodes, num_districts as usize).into_vec();

    let assignments = (0..nodes)
        .map(|u| {
            let (nearest, _) = seeds.iter().enumerate()
                .map(|(i, &s)| (i, grid.toroidal_distance(u, s)))
                .fold((0, f64::INFINITY), |best, (i, d)| if d < best.1 { (i, d) } else { best });
            nearest as u32 + 1
        })
        .collect::<Vec<_>>();

    let assignment = DistrictAssignment::from_assignments(grid, num_districts, assignments)?;
    info!(num_districts, pieces = assignment.disconnected_pieces(), "[seed] voronoi assignment");
    Ok(assignment)
}
