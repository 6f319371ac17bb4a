//! Tailrisk CLI - Command-line interface for portfolio tail-risk analytics.
//!
//! # Usage
//!
//! ```bash
//! # Generate a synthetic return file
//! tailrisk sample --output returns.csv --days 756 --seed 7
//!
//! # Full assessment with a config file and a benchmark
//! tailrisk analyze --returns returns.csv --config analysis.toml --benchmark urth.csv
//!
//! # 99% historical VaR at 1 and 10 days
//! tailrisk var --returns returns.csv --method historical --confidence 0.99 --horizons 1,10
//!
//! # Expected shortfall as JSON
//! tailrisk --format json cvar --returns returns.csv --method parametric
//!
//! # Write and check a config file
//! tailrisk config init analysis.toml
//! tailrisk config validate analysis.toml
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod data;
mod error;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let format = cli.format;

    match cli.command {
        Commands::Analyze(args) => commands::analyze::execute(args, format)?,
        Commands::Var(args) => commands::var::execute(args, format)?,
        Commands::Cvar(args) => commands::cvar::execute(args, format)?,
        Commands::Sample(args) => commands::sample::execute(args, format)?,
        Commands::Config(args) => commands::config::execute(args, format)?,
    }

    Ok(())
}

/// Installs the stderr subscriber. `RUST_LOG` wins over the flags.
fn init_logging(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
