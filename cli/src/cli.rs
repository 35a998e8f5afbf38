use std::path::PathBuf;

/// Gerrymandering simulator CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "grreat", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate a population, draw districts and optimize them
    Simulate(SimulateArgs),

    /// Generate a population map only
    Generate(GenerateArgs),
}

/// Settings shared by every command that builds a world.
#[derive(clap::Args, Debug)]
pub struct WorldArgs {
    /// JSON run configuration; flags below override its values
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Width of the world in precincts (one plus a power of two, at least 3)
    #[arg(long)]
    pub world_width: Option<usize>,

    /// Height of the world in precincts (one plus a power of two, at least 3)
    #[arg(long)]
    pub world_height: Option<usize>,

    /// Number of voters in each precinct (at least 1)
    #[arg(long)]
    pub precinct_population: Option<u32>,

    /// Fraction of red voters in the world, in [0, 1]
    #[arg(long)]
    pub red_fraction: Option<f64>,

    /// Number of purely random precincts drawn before neighbors are taken into account (at least 4)
    #[arg(long)]
    pub geo_random_steps: Option<usize>,

    /// Share of each precinct taken from the average of its neighbors, in [0, 1]
    #[arg(long)]
    pub geo_neighbor_weight: Option<f64>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory for output files, defaults to "./output-<unix time>"
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output_directory: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub world: WorldArgs,

    /// Population map to load instead of generating one; generation settings are ignored
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub load_pop_map: Option<PathBuf>,

    /// Number of districts
    #[arg(long)]
    pub num_districts: Option<u32>,

    /// Number of delegates elected in each district
    #[arg(long)]
    pub num_delegates_per_district: Option<u32>,

    /// Optimizer step budget
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Record a checkpoint every N steps (0 disables)
    #[arg(long, default_value_t = 1000)]
    pub checkpoint_every: usize,
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub world: WorldArgs,
}
