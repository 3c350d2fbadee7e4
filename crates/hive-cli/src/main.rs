// crates/hive-cli/src/main.rs
//
// CLI entrypoint for the Hive staking ledger developer tools.
//
// Provides subcommands for replaying staking scenarios against an in-memory
// ledger and for inspecting the emission schedule.

mod commands;
mod output;
mod scenario;

use clap::{Parser, Subcommand};
use commands::schedule::ScheduleCmd;
use commands::simulate::SimulateCmd;
use output::OutputFormat;
use tracing_subscriber::EnvFilter;

/// Hive CLI: staking ledger simulation and schedule tools.
#[derive(Parser, Debug)]
#[command(
    name = "hive",
    version = "0.1.0",
    about = "Hive CLI for the HONEY staking ledger"
)]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a scenario file against a fresh ledger.
    Simulate(SimulateCmd),

    /// Show emission over a block range.
    Schedule(ScheduleCmd),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Simulate(cmd) => commands::simulate::run(cmd, cli.format)?,
        Commands::Schedule(cmd) => commands::schedule::run(cmd, cli.format)?,
    }

    Ok(())
}
