//! VaR command implementation.
//!
//! Also defines the arguments and row layout shared with `cvar`.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use tailrisk_config::AnalysisConfig;
use tailrisk_core::Portfolio;
use tailrisk_risk::var::{HistoricalVaR, VaREngine, VaRMethod};
use tailrisk_risk::EntityValues;

use crate::cli::OutputFormat;
use crate::commands::{load_portfolio, DataArgs};
use crate::output::{print_header, print_json, print_output};

/// Arguments for the var and cvar commands.
#[derive(Args, Debug)]
pub struct MeasureArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Estimation method (historical, parametric, monte-carlo)
    #[arg(short, long, default_value = "historical")]
    pub method: VaRMethod,

    /// Confidence level in (0, 1). Overrides the config.
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Horizons in periods, comma separated. Overrides the config.
    #[arg(long, value_delimiter = ',')]
    pub horizons: Vec<u32>,

    /// Monte Carlo seed. Overrides the config.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Monte Carlo paths. Overrides the config.
    #[arg(long)]
    pub simulations: Option<usize>,
}

impl MeasureArgs {
    /// Config with this command's overrides applied.
    pub fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = self.data.analysis_config()?;
        if let Some(confidence) = self.confidence {
            config.confidence_level = confidence;
        }
        if !self.horizons.is_empty() {
            config.horizons.clone_from(&self.horizons);
        }
        if let Some(seed) = self.seed {
            config.monte_carlo_seed = Some(seed);
        }
        if let Some(simulations) = self.simulations {
            config.monte_carlo_simulations = simulations;
        }
        Ok(config)
    }
}

/// One entity's loss at one horizon.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct MeasureRow {
    #[tabled(rename = "Entity")]
    pub entity: String,
    #[tabled(rename = "Horizon")]
    pub horizon: u32,
    #[tabled(rename = "Loss")]
    pub loss: String,
}

/// Flattens per-horizon results into rows, entity-major.
pub fn measure_rows<'a>(results: impl IntoIterator<Item = (u32, &'a EntityValues)>) -> Vec<MeasureRow> {
    let mut rows: Vec<MeasureRow> = results
        .into_iter()
        .flat_map(|(horizon, values)| {
            values.iter().map(move |(entity, loss)| MeasureRow {
                entity: entity.clone(),
                horizon,
                loss: format!("{loss:.6}"),
            })
        })
        .collect();
    rows.sort_by(|a, b| a.entity.cmp(&b.entity).then(a.horizon.cmp(&b.horizon)));
    rows
}

/// Builds the VaR engine `config` describes.
pub fn var_engine<'a>(portfolio: &'a Portfolio, config: &AnalysisConfig) -> Result<VaREngine<'a>> {
    Ok(VaREngine::new(portfolio)
        .with_historical(HistoricalVaR::new(config.min_historical_observations)?)
        .with_monte_carlo(config.monte_carlo()))
}

/// Execute the var command.
pub fn execute(args: MeasureArgs, format: OutputFormat) -> Result<()> {
    let config = args.analysis_config()?;
    let portfolio = load_portfolio(&args.data, &config)?;
    let confidence = config.confidence()?;

    let engine = var_engine(&portfolio, &config)?;
    let results = engine.estimate_horizons(args.method, confidence, &config.horizons)?;

    match format {
        OutputFormat::Json => print_json(&results)?,
        OutputFormat::Table | OutputFormat::Csv => {
            let rows = measure_rows(results.iter().map(|r| (r.horizon, &r.values)));
            if format == OutputFormat::Table {
                print_header(&format!("{} VaR at {}", args.method, confidence));
            }
            print_output(&rows, format)?;
        }
    }

    Ok(())
}
