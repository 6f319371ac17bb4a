//! Config command implementation.
//!
//! Creates, displays and validates analysis config files.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use tailrisk_config::{AnalysisConfig, Validate};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output::{print_error, print_header, print_info, print_json, print_output, print_success, KeyValue};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a config file with default values
    Init(InitArgs),

    /// Show a config file, or the defaults when no file is given
    Show(ShowArgs),

    /// Check a config file for invalid values
    Validate(ValidateArgs),
}

/// Arguments for init subcommand.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Target path; the extension picks the format
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for show subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Config file
    pub path: Option<PathBuf>,
}

/// Arguments for validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Config file
    pub path: PathBuf,
}

/// Execute the config command.
pub fn execute(args: ConfigArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        ConfigCommand::Init(args) => init(args),
        ConfigCommand::Show(args) => show(args, format),
        ConfigCommand::Validate(args) => validate(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        return Err(CliError::FileExists(args.path).into());
    }
    AnalysisConfig::default().save(&args.path)?;
    print_success(&format!("Wrote default config to {}", args.path.display()));
    Ok(())
}

fn show(args: ShowArgs, format: OutputFormat) -> Result<()> {
    let config = match &args.path {
        Some(path) => AnalysisConfig::load(path)?,
        None => {
            if format == OutputFormat::Table {
                print_info("No config file given; showing defaults");
            }
            AnalysisConfig::default()
        }
    };

    if format == OutputFormat::Json {
        return print_json(&config);
    }
    if format == OutputFormat::Table {
        print_header("Analysis Config");
    }
    print_output(&entries(&config), format)
}

fn validate(args: ValidateArgs) -> Result<()> {
    let config = AnalysisConfig::load(&args.path)?;
    let errors = config.validate();
    if errors.is_empty() {
        print_success(&format!("{} is valid", args.path.display()));
        return Ok(());
    }
    for err in &errors {
        print_error(&err.to_string());
    }
    anyhow::bail!(
        "{} has {} invalid value(s)",
        args.path.display(),
        errors.len()
    )
}

fn entries(config: &AnalysisConfig) -> Vec<KeyValue> {
    let optional = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
    let list = |items: Vec<String>| items.join(", ");

    let mut rows = vec![
        KeyValue::new("start_date", optional(config.start_date.map(|d| d.to_string()))),
        KeyValue::new("end_date", optional(config.end_date.map(|d| d.to_string()))),
        KeyValue::new("benchmark", config.benchmark.clone()),
        KeyValue::new("frequency", config.frequency.to_string()),
        KeyValue::new("report_frequency", config.report_frequency.to_string()),
        KeyValue::new("confidence_level", config.confidence_level.to_string()),
        KeyValue::new(
            "horizons",
            list(config.horizons.iter().map(ToString::to_string).collect()),
        ),
        KeyValue::new(
            "var_methods",
            list(config.var_methods.iter().map(ToString::to_string).collect()),
        ),
        KeyValue::new(
            "monte_carlo_simulations",
            config.monte_carlo_simulations.to_string(),
        ),
        KeyValue::new(
            "monte_carlo_seed",
            optional(config.monte_carlo_seed.map(|s| s.to_string())),
        ),
        KeyValue::new("rolling_window", config.rolling_window.to_string()),
        KeyValue::new("risk_free_rate", config.risk_free_rate.to_string()),
        KeyValue::new(
            "min_historical_observations",
            config.min_historical_observations.to_string(),
        ),
    ];
    if config.portfolio_assets.is_empty() {
        rows.push(KeyValue::new("portfolio_assets", "equal weights"));
    } else {
        rows.extend(
            config
                .portfolio_assets
                .iter()
                .map(|(asset, w)| KeyValue::new(format!("portfolio_assets.{asset}"), w.to_string())),
        );
    }
    rows
}
