//! CLI command implementations.

pub mod analyze;
pub mod config;
pub mod cvar;
pub mod sample;
pub mod var;

// Re-export argument types for the parser
pub use analyze::AnalyzeArgs;
pub use config::ConfigArgs;
pub use sample::SampleArgs;
pub use var::MeasureArgs;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use tailrisk_config::{AnalysisConfig, Validate};
use tailrisk_core::{Frequency, Portfolio, ReturnKind};

use crate::data;
use crate::error::{CliError, CliResult};

/// Parses a date string in YYYY-MM-DD format.
pub fn parse_date(s: &str) -> CliResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| CliError::InvalidDate(s.to_string()))
}

/// Parses an `ASSET=WEIGHT` pair.
fn parse_weight(s: &str) -> CliResult<(String, f64)> {
    let (name, weight) = s
        .split_once('=')
        .ok_or_else(|| CliError::invalid_argument("--weights", format!("'{s}' is not ASSET=WEIGHT")))?;
    let weight = weight
        .trim()
        .parse()
        .map_err(|_| CliError::invalid_argument("--weights", format!("'{weight}' is not a number")))?;
    Ok((name.trim().to_string(), weight))
}

/// Input data and config options shared by the analysis commands.
#[derive(Args, Debug)]
pub struct DataArgs {
    /// CSV file with a date column and one column per asset
    #[arg(short, long)]
    pub returns: PathBuf,

    /// The file holds prices; convert them to returns
    #[arg(long)]
    pub prices: bool,

    /// Use log returns when converting prices
    #[arg(long, requires = "prices")]
    pub log_returns: bool,

    /// Analysis config file (.json, .toml, .yaml)
    #[arg(short, long, env = "TAILRISK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Sampling frequency of the data (daily, monthly, yearly)
    #[arg(long)]
    pub frequency: Option<Frequency>,

    /// First date to include (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Last date to include (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,

    /// Portfolio weights as ASSET=WEIGHT, comma separated. Defaults to equal weights.
    #[arg(short, long, value_delimiter = ',')]
    pub weights: Vec<String>,
}

impl DataArgs {
    /// How prices are turned into returns, `None` when the file holds returns.
    pub fn price_kind(&self) -> Option<ReturnKind> {
        match (self.prices, self.log_returns) {
            (false, _) => None,
            (true, false) => Some(ReturnKind::Simple),
            (true, true) => Some(ReturnKind::Log),
        }
    }

    /// Loads the config file (or defaults) and applies the command-line
    /// overrides.
    pub fn analysis_config(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AnalysisConfig::default(),
        };
        if let Some(frequency) = self.frequency {
            config.frequency = frequency;
        }
        if let Some(start) = &self.start {
            config.start_date = Some(parse_date(start)?);
        }
        if let Some(end) = &self.end {
            config.end_date = Some(parse_date(end)?);
        }
        if !self.weights.is_empty() {
            config.portfolio_assets = self
                .weights
                .iter()
                .map(|s| parse_weight(s))
                .collect::<CliResult<_>>()?;
        }
        Ok(config)
    }
}

/// Validates `config` and builds the portfolio it describes.
pub fn load_portfolio(args: &DataArgs, config: &AnalysisConfig) -> anyhow::Result<Portfolio> {
    config.validate_or_error()?;
    let series = data::load_returns(&args.returns, config.frequency, args.price_kind(), |d| {
        config.includes(d)
    })?;
    let weights = config.weights_for(series.assets())?;
    tracing::info!(
        "loaded {} assets over {} observations ({} to {})",
        series.n_assets(),
        series.len(),
        series.dates().first().map(ToString::to_string).unwrap_or_default(),
        series.dates().last().map(ToString::to_string).unwrap_or_default(),
    );
    Ok(Portfolio::new(Arc::new(series), weights)?)
}
