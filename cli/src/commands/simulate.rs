use anyhow::{Context, Result};
use grreat::{Population, RunConfig, Termination, generate_population, run_with_population};
use tracing::info;

use crate::{
    cli::{Cli, SimulateArgs},
    commands::world_config,
    output::{Checkpoint, RunResult, district_rows, ensure_dir_exists, output_dir, write_json},
};

pub fn run(_cli: &Cli, args: &SimulateArgs) -> Result<()> {
    let mut config = world_config(&args.world)?;
    if let Some(n) = args.num_districts { config.districts.num_districts = n }
    if let Some(seats) = args.num_delegates_per_district { config.districts.seats_per_district = seats }
    if let Some(steps) = args.max_steps { config.optimizer.params.max_steps = steps }

    let population = match &args.load_pop_map {
        Some(path) => {
            info!("[simulate] loading population map from {}", path.display());
            Population::read_json(path)
                .with_context(|| format!("Failed to load population map from {}", path.display()))?
        }
        None => generate_population(&config)?,
    };

    let out_dir = output_dir(args.world.output_directory.as_deref());
    ensure_dir_exists(&out_dir)?;
    write_json(&out_dir, "population.json", &population.to_map())?;

    let mut checkpoints = Vec::new();
    let every = args.checkpoint_every;
    let outcome = run_with_population(&config, population, |step| {
        if every > 0 && (step.index % every == 0 || step.state.is_terminal()) {
            checkpoints.push(Checkpoint {
                step: step.index,
                state: step.state,
                districts: district_rows(&step.assignment),
                snapshot: step.snapshot.clone(),
            });
        }
    })?;

    let effective = RunConfig {
        world: grreat::WorldConfig {
            width: outcome.population.grid().width(),
            height: outcome.population.grid().height(),
            precinct_population: outcome.population.precinct_population(),
            red_fraction: outcome.population.red_fraction(),
        },
        ..config
    };
    write_json(&out_dir, "config.json", &effective)?;
    write_json(&out_dir, "checkpoints.json", &checkpoints)?;
    let result_path = write_json(&out_dir, "result.json", &RunResult {
        termination: outcome.termination,
        steps: outcome.steps,
        districts: district_rows(&outcome.assignment),
        snapshot: &outcome.snapshot,
    })?;

    let snapshot = &outcome.snapshot;
    match outcome.termination {
        Termination::Converged => println!("[simulate] converged after {} steps", outcome.steps),
        Termination::NonConvergence { empty_districts, disconnected_pieces } => println!(
            "[simulate] did not converge after {} steps ({} empty districts, {} disconnected pieces)",
            outcome.steps, empty_districts, disconnected_pieces
        ),
    }
    println!(
        "[simulate] seats red {} / blue {} | population {:.6} | gerrymander {:.6} | {} {:.4}",
        snapshot.red_seats,
        snapshot.blue_seats,
        snapshot.population_score,
        snapshot.gerrymander_score,
        snapshot.compactness_name,
        snapshot.compactness_score,
    );
    println!("[simulate] results written to {}", result_path.display());

    Ok(())
}
