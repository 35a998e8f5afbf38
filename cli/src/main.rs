mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::{generate, simulate};
use tracing_subscriber::EnvFilter;

/// Map `-v` counts onto a default filter; `RUST_LOG` wins when set.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match &cli.command {
        Commands::Simulate(args) => simulate::run(&cli, args),
        Commands::Generate(args) => generate::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
