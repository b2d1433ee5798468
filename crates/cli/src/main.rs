//! LinkPulse CLI
//!
//! A command-line simulator for the interface health pipeline: drives the
//! deterministic scenarios through the agent at 1 Hz and renders per-tick
//! state, transitions and the end-of-run ranking.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::run::Strategy;

/// LinkPulse interface health simulator
#[derive(Parser)]
#[command(name = "lp")]
#[command(author, version, about = "LinkPulse network interface health simulator", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    /// Suppress the per-tick state tables
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a scenario through the health pipeline
    Run {
        /// Scenario to run: A, B, C, D or all
        #[arg(long, default_value = "all")]
        scenario: String,

        /// Scoring strategy to drive the state machine with
        #[arg(long, value_enum, default_value = "both")]
        strategy: Strategy,

        /// Number of simulated seconds
        #[arg(long, default_value_t = linkpulse_lib::SCENARIO_TICKS)]
        ticks: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario,
            strategy,
            ticks,
        } => commands::run::run(&scenario, strategy, ticks, cli.format, cli.quiet),
    }
}
