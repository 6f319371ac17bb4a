//! CVaR command implementation.

use anyhow::Result;

use tailrisk_risk::cvar::CVaREngine;

use crate::cli::OutputFormat;
use crate::commands::load_portfolio;
use crate::commands::var::{measure_rows, var_engine, MeasureArgs};
use crate::output::{print_header, print_json, print_output};

/// Execute the cvar command.
pub fn execute(args: MeasureArgs, format: OutputFormat) -> Result<()> {
    let config = args.analysis_config()?;
    let portfolio = load_portfolio(&args.data, &config)?;
    let confidence = config.confidence()?;

    let engine = CVaREngine::new(var_engine(&portfolio, &config)?);
    let results = engine.estimate_horizons(args.method, confidence, &config.horizons)?;

    match format {
        OutputFormat::Json => print_json(&results)?,
        OutputFormat::Table | OutputFormat::Csv => {
            let rows = measure_rows(results.iter().map(|r| (r.horizon, &r.values)));
            if format == OutputFormat::Table {
                print_header(&format!("{} CVaR at {}", args.method, confidence));
            }
            print_output(&rows, format)?;
        }
    }

    Ok(())
}
