//! Sample command implementation.
//!
//! Writes synthetic business-day returns for three assets driven by a common
//! market factor, and optionally a benchmark file tracking that factor.

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Weekday};
use clap::Args;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::commands::parse_date;
use crate::data::{write_columns, DatedColumns};
use crate::error::CliError;
use crate::output::{print_json, print_success};

/// Daily mean, daily volatility and market loading per synthetic asset.
const ASSETS: [(&str, f64, f64, f64); 3] = [
    ("EQUITY", 0.0004, 0.012, 0.85),
    ("BONDS", 0.00015, 0.004, -0.25),
    ("GOLD", 0.0002, 0.009, 0.10),
];

/// Arguments for the sample command.
#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Output CSV path
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of business days to generate
    #[arg(short, long, default_value = "756")]
    pub days: usize,

    /// RNG seed
    #[arg(short, long, default_value = "42")]
    pub seed: u64,

    /// First business day (YYYY-MM-DD)
    #[arg(long, default_value = "2020-01-01")]
    pub start: String,

    /// Also write a market benchmark column to this path
    #[arg(long)]
    pub benchmark_output: Option<PathBuf>,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct SampleSummary {
    output: PathBuf,
    benchmark: Option<PathBuf>,
    days: usize,
    seed: u64,
    assets: Vec<&'static str>,
}

/// Execute the sample command.
pub fn execute(args: SampleArgs, format: OutputFormat) -> Result<()> {
    if args.days < 2 {
        return Err(CliError::invalid_argument("--days", "at least 2 days are required").into());
    }
    ensure_writable(&args.output, args.force)?;
    if let Some(path) = &args.benchmark_output {
        ensure_writable(path, args.force)?;
    }

    let start = parse_date(&args.start)?;
    let (assets, benchmark) = generate(start, args.days, args.seed);
    write_columns(&args.output, &assets)?;
    if let Some(path) = &args.benchmark_output {
        write_columns(path, &benchmark)?;
    }
    tracing::debug!("wrote {} synthetic rows with seed {}", args.days, args.seed);

    let summary = SampleSummary {
        output: args.output,
        benchmark: args.benchmark_output,
        days: args.days,
        seed: args.seed,
        assets: ASSETS.iter().map(|a| a.0).collect(),
    };
    match format {
        OutputFormat::Json => print_json(&summary)?,
        OutputFormat::Table | OutputFormat::Csv => print_success(&format!(
            "Wrote {} days of returns for {} to {}",
            summary.days,
            summary.assets.join(", "),
            summary.output.display()
        )),
    }
    Ok(())
}

fn ensure_writable(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::FileExists(path.to_path_buf()));
    }
    Ok(())
}

/// Generates asset and benchmark returns on `days` business days from `start`.
fn generate(start: NaiveDate, days: usize, seed: u64) -> (DatedColumns, DatedColumns) {
    let mut rng = StdRng::seed_from_u64(seed);
    let dates = business_days(start).take(days).collect::<Vec<_>>();

    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(days); ASSETS.len()];
    let mut market = Vec::with_capacity(days);
    for _ in 0..days {
        let factor: f64 = rng.sample(StandardNormal);
        market.push(0.0003 + 0.01 * factor);
        for ((_, mu, sigma, loading), column) in ASSETS.iter().zip(columns.iter_mut()) {
            let noise: f64 = rng.sample(StandardNormal);
            let z = loading * factor + (1.0 - loading * loading).sqrt() * noise;
            column.push(mu + sigma * z);
        }
    }

    let assets = DatedColumns {
        dates: dates.clone(),
        columns: ASSETS
            .iter()
            .map(|a| a.0.to_string())
            .zip(columns)
            .collect(),
    };
    let benchmark = DatedColumns {
        dates,
        columns: vec![("URTH".to_string(), market)],
    };
    (assets, benchmark)
}

fn business_days(start: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start
        .iter_days()
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_reproducible() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let (a, b) = generate(start, 30, 9);
        let (a2, _) = generate(start, 30, 9);
        let (a3, _) = generate(start, 30, 10);
        assert_eq!(a, a2);
        assert_ne!(a, a3);
        assert_eq!(a.columns.len(), 3);
        assert_eq!(b.columns[0].1.len(), 30);
    }

    #[test]
    fn test_business_days_skip_weekends() {
        // 2024-01-05 is a Friday
        let start = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let days: Vec<_> = business_days(start).take(2).collect();
        assert_eq!(days[1], NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
    }
}
