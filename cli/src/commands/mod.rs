pub mod generate;
pub mod simulate;

use anyhow::{Context, Result};
use grreat::RunConfig;

use crate::cli::WorldArgs;

/// Load the configuration file (if any) and apply flag overrides on top.
pub(crate) fn world_config(args: &WorldArgs) -> Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => RunConfig::default(),
    };

    let world = &mut config.world;
    if let Some(width) = args.world_width { world.width = width }
    if let Some(height) = args.world_height { world.height = height }
    if let Some(population) = args.precinct_population { world.precinct_population = population }
    if let Some(fraction) = args.red_fraction { world.red_fraction = fraction }
    if let Some(seed) = args.seed { config.seed = seed }

    if args.geo_random_steps.is_some() || args.geo_neighbor_weight.is_some() {
        config.population.distribution = config.population.distribution
            .with_clustering(args.geo_random_steps, args.geo_neighbor_weight);
    }

    Ok(config)
}
