use std::error::Error;
use std::io;

use clap::{Parser, Subcommand};
use commands::{
    collect::{self, CollectArgs},
    generate::{self, GenerateArgs},
    invoke::{self, InvokeArgs},
    plan::{self, PlanArgs},
    run::{self, RunArgs},
    version::{self, VersionArgs},
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "degbench",
    about = "Benchmark harness for degenerate-string analysis tools"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate inputs, invoke the tool on every bucket and collect stats.
    Run(RunArgs),
    /// Write the input file of every length bucket.
    Generate(GenerateArgs),
    /// Invoke the tool on existing input files.
    Invoke(InvokeArgs),
    /// Parse existing output files into a fresh stats table.
    Collect(CollectArgs),
    /// Print the resolved configuration and the bucket plan.
    Plan(PlanArgs),
    /// Print version information.
    Version(VersionArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Generate(args) => generate::run(&args),
        Command::Invoke(args) => invoke::run(&args),
        Command::Collect(args) => collect::run(&args),
        Command::Plan(args) => plan::run(&args),
        Command::Version(args) => version::run(&args),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Prints `value` to stdout as pretty JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
