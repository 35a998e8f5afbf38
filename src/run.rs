//! Single entry point tying generation, seeding and search together.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::{Distribution, RunConfig},
    error::Result,
    objective::MetricSnapshot,
    optimize::{Optimizer, OptimizerState, Step},
    partition::{DistrictAssignment, seed},
    population::{Population, checkerboard, generate, uniform},
};

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Termination {
    /// Every district id is occupied and every district is contiguous.
    Converged,
    /// The step budget ran out with constraints still violated.
    NonConvergence { empty_districts: usize, disconnected_pieces: usize },
}

#[derive(Debug)]
pub struct RunOutcome {
    pub population: Population,
    pub assignment: DistrictAssignment,
    pub snapshot: MetricSnapshot,
    pub termination: Termination,
    pub steps: usize,
}

/// Build the world population described by `config`, drawing from a stream
/// seeded with `config.seed`.
pub fn generate_population(config: &RunConfig) -> Result<Population> {
    config.validate()?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let grid = config.grid()?;
    let world = &config.world;
    let red_total = config.red_total();
    let share = |fraction: f64| (fraction * world.precinct_population as f64).round() as u32;

    let population = match config.population.distribution {
        Distribution::Clustered { geo_random_steps, geo_neighbor_weight } => generate(
            grid,
            red_total,
            config.total_population() - red_total,
            geo_random_steps,
            geo_neighbor_weight,
            &mut rng,
        )?,
        Distribution::Uniform => uniform(grid, world.precinct_population, red_total)?,
        Distribution::Checkerboard { block_width, block_height, even_red_fraction, odd_red_fraction } => checkerboard(
            grid,
            world.precinct_population,
            block_width,
            block_height,
            share(even_red_fraction),
            share(odd_red_fraction),
        )?,
    };

    info!(
        width = grid.width(),
        height = grid.height(),
        red = population.total_red(),
        blue = population.total_blue(),
        "[run] population ready"
    );
    Ok(population)
}

/// Generate a population, seed districts and optimize.
///
/// Generation and search each draw from their own stream seeded with
/// `config.seed`, so a run over a saved population map replays exactly.
pub fn run(config: &RunConfig) -> Result<RunOutcome> {
    let population = generate_population(config)?;
    run_with_population(config, population, |_| {})
}

/// Seed districts and optimize over an existing population, reporting every
/// step to `observer`.
///
/// The world section of `config` is replaced by the population's own
/// dimensions.
pub fn run_with_population<F>(config: &RunConfig, population: Population, mut observer: F) -> Result<RunOutcome>
where
    F: FnMut(&Step),
{
    let mut config = config.clone();
    config.world.width = population.grid().width();
    config.world.height = population.grid().height();
    config.world.precinct_population = population.precinct_population();
    config.validate()?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let objective = config.objective()?;
    let strategy = config.optimizer.strategy.build()?;
    let initial = seed(population.grid(), config.districts.num_districts, &mut rng)?;

    let mut optimizer = Optimizer::new(&population, &objective, initial, strategy, config.optimizer.params, rng)?;
    for step in optimizer.by_ref() {
        observer(&step?);
    }

    let steps = optimizer.steps();
    let state = optimizer.state();
    let (assignment, snapshot) = optimizer.into_parts();

    let termination = match state {
        OptimizerState::Converged => Termination::Converged,
        _ => {
            warn!(
                steps,
                empty_districts = snapshot.empty_districts,
                disconnected_pieces = snapshot.disconnected_pieces,
                "[run] step budget exhausted before constraints were met"
            );
            Termination::NonConvergence {
                empty_districts: snapshot.empty_districts,
                disconnected_pieces: snapshot.disconnected_pieces,
            }
        }
    };

    info!(steps, objective = snapshot.objective, red_seats = snapshot.red_seats, blue_seats = snapshot.blue_seats, "[run] done");
    Ok(RunOutcome { population, assignment, snapshot, termination, steps })
}
