//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{AnalyzeArgs, ConfigArgs, MeasureArgs, SampleArgs};

/// Tailrisk - Portfolio tail-risk and performance analytics CLI
#[derive(Parser)]
#[command(name = "tailrisk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the full risk assessment (dispersion, VaR, CVaR, performance)
    Analyze(AnalyzeArgs),

    /// Value at Risk for one method over a list of horizons
    Var(MeasureArgs),

    /// Conditional VaR (expected shortfall) for one method over a list of horizons
    Cvar(MeasureArgs),

    /// Write a reproducible synthetic return file
    Sample(SampleArgs),

    /// Manage analysis config files
    Config(ConfigArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}
