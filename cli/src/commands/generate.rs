use anyhow::Result;
use grreat::generate_population;

use crate::{
    cli::{Cli, GenerateArgs},
    commands::world_config,
    output::{ensure_dir_exists, output_dir, write_json},
};

pub fn run(_cli: &Cli, args: &GenerateArgs) -> Result<()> {
    let config = world_config(&args.world)?;
    let population = generate_population(&config)?;

    let out_dir = output_dir(args.world.output_directory.as_deref());
    ensure_dir_exists(&out_dir)?;
    let path = write_json(&out_dir, "population.json", &population.to_map())?;
    write_json(&out_dir, "config.json", &config)?;

    println!(
        "[generate] {}x{} precincts, {} red / {} blue, written to {}",
        population.grid().width(),
        population.grid().height(),
        population.total_red(),
        population.total_blue(),
        path.display(),
    );
    Ok(())
}
