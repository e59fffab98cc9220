use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    demo::{self, DemoArgs},
    run::{self, RunArgs},
    version::{self, VersionArgs},
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod population;

#[derive(Parser, Debug)]
#[command(name = "minim-sim", about = "Minimisation randomisation harness")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Randomise a synthetic population using the four-factor worked example.
    Demo(DemoArgs),
    /// Randomise subjects from a CSV file against a YAML trial definition.
    Run(RunArgs),
    /// Print the harness version.
    Version(VersionArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Demo(args) => demo::run(&args),
        Command::Run(args) => run::run(&args),
        Command::Version(args) => version::run(&args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
