//! Analyze command implementation.
//!
//! Runs the full risk assessment over a return file.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

use tailrisk_risk::assessment::{AssessmentReport, RiskAssessment};
use tailrisk_risk::cvar::CVaRResult;
use tailrisk_risk::performance::PerformanceMetric;
use tailrisk_risk::var::VaRResult;

use crate::cli::OutputFormat;
use crate::commands::{load_portfolio, DataArgs};
use crate::data;
use crate::output::{
    format_optional, format_percent, print_csv, print_header, print_json, print_matrix,
    print_output, print_warning, KeyValue,
};

/// Arguments for the analyze command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Benchmark CSV with a date column and one value column
    #[arg(short, long)]
    pub benchmark: Option<PathBuf>,

    /// The benchmark file holds prices
    #[arg(long)]
    pub benchmark_prices: bool,
}

/// Execute the analyze command.
pub fn execute(args: AnalyzeArgs, format: OutputFormat) -> Result<()> {
    let config = args.data.analysis_config()?;
    let portfolio = load_portfolio(&args.data, &config)?;

    let benchmark = match &args.benchmark {
        Some(path) => {
            let kind = args
                .benchmark_prices
                .then(|| args.data.price_kind().unwrap_or_default());
            let bench = data::load_benchmark(path, config.frequency, kind, |d| config.includes(d))?;
            if bench.name() != config.benchmark {
                tracing::debug!(
                    "benchmark column '{}' differs from configured name '{}'",
                    bench.name(),
                    config.benchmark
                );
            }
            Some(bench)
        }
        None => None,
    };

    let mut assessment = RiskAssessment::new(&portfolio, config.assessment_settings()?);
    if let Some(bench) = &benchmark {
        assessment = assessment.with_benchmark(bench);
    }
    let report = assessment.run()?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Csv => print_csv(&flatten(&report))?,
        OutputFormat::Table => print_report(&report)?,
    }

    Ok(())
}

/// One number of the report in long format.
#[derive(Debug, Clone, Serialize)]
struct FlatRow {
    section: &'static str,
    metric: String,
    horizon: Option<u32>,
    entity: String,
    value: f64,
}

impl FlatRow {
    fn new(section: &'static str, metric: impl Into<String>, entity: &str, value: f64) -> Self {
        Self {
            section,
            metric: metric.into(),
            horizon: None,
            entity: entity.to_string(),
            value,
        }
    }
}

fn flatten(report: &AssessmentReport) -> Vec<FlatRow> {
    let mut rows = Vec::new();

    if let Some(d) = &report.dispersion.value {
        for (metric, values) in [
            ("mean", &d.mean),
            ("volatility", &d.volatility),
            ("variance", &d.variance),
            ("downside_deviation", &d.downside_deviation),
        ] {
            rows.extend(values.iter().map(|(e, v)| FlatRow::new("dispersion", metric, e, *v)));
        }
        if let Some(latest) = &d.latest_rolling_volatility {
            rows.extend(
                latest
                    .iter()
                    .map(|(e, v)| FlatRow::new("dispersion", "rolling_volatility", e, *v)),
            );
        }
        for (entity, lb) in d.serial_correlation.value.iter().flatten() {
            rows.push(FlatRow::new("dispersion", "ljung_box_q", entity, lb.statistic));
            rows.push(FlatRow::new("dispersion", "ljung_box_p", entity, lb.p_value));
        }
    }

    for section in &report.var {
        for result in section.results.value.iter().flatten() {
            rows.extend(horizon_rows("var", result.method.as_str(), result.horizon, &result.values));
        }
    }
    for section in &report.cvar {
        for result in section.results.value.iter().flatten() {
            rows.extend(horizon_rows("cvar", result.method.as_str(), result.horizon, &result.values));
        }
    }

    for summary in &report.breaches {
        let metric = format!("{}_breaches", summary.method.as_str());
        rows.extend(summary.counts.iter().map(|(e, n)| FlatRow {
            horizon: Some(1),
            ..FlatRow::new("backtest", metric.as_str(), e, *n as f64)
        }));
    }

    if let Some(perf) = &report.performance.value {
        for (entity, metrics) in &perf.metrics {
            for metric in PerformanceMetric::ALL {
                if let Some(v) = metrics.get(metric) {
                    rows.push(FlatRow::new("performance", metric.as_str(), entity, v));
                }
            }
        }
    }

    rows
}

fn horizon_rows<'a>(
    section: &'static str,
    method: &'a str,
    horizon: u32,
    values: &'a tailrisk_risk::EntityValues,
) -> impl Iterator<Item = FlatRow> + 'a {
    values.iter().map(move |(entity, v)| FlatRow {
        horizon: Some(horizon),
        ..FlatRow::new(section, method, entity, *v)
    })
}

#[derive(Debug, Serialize, Tabled)]
struct DispersionRow {
    #[tabled(rename = "Entity")]
    entity: String,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Volatility")]
    volatility: String,
    #[tabled(rename = "Downside Dev")]
    downside: String,
    #[tabled(rename = "Rolling Vol")]
    rolling: String,
}

#[derive(Debug, Serialize, Tabled)]
struct TailRow {
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Horizon")]
    horizon: u32,
    #[tabled(rename = "Entity")]
    entity: String,
    #[tabled(rename = "VaR")]
    var: String,
    #[tabled(rename = "CVaR")]
    cvar: String,
}

#[derive(Debug, Serialize, Tabled)]
struct SerialRow {
    #[tabled(rename = "Entity")]
    entity: String,
    #[tabled(rename = "Lags")]
    lags: usize,
    #[tabled(rename = "Q")]
    statistic: String,
    #[tabled(rename = "p-value")]
    p_value: String,
}

#[derive(Debug, Serialize, Tabled)]
struct BreachRow {
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Entity")]
    entity: String,
    #[tabled(rename = "Breaches")]
    count: usize,
    #[tabled(rename = "Expected")]
    expected: String,
}

#[derive(Debug, Serialize, Tabled)]
struct PerformanceRow {
    #[tabled(rename = "Entity")]
    entity: String,
    #[tabled(rename = "Sharpe")]
    sharpe: String,
    #[tabled(rename = "Sortino")]
    sortino: String,
    #[tabled(rename = "Beta")]
    beta: String,
    #[tabled(rename = "Alpha")]
    alpha: String,
    #[tabled(rename = "Treynor")]
    treynor: String,
    #[tabled(rename = "Info Ratio")]
    information_ratio: String,
    #[tabled(rename = "Max DD")]
    max_drawdown: String,
}

fn print_report(report: &AssessmentReport) -> Result<()> {
    let table = OutputFormat::Table;

    print_header("Portfolio");
    let mut summary = vec![
        KeyValue::new("Observations", report.observations.to_string()),
        KeyValue::new("Period", format!("{} to {}", report.start, report.end)),
        KeyValue::new("Frequency", report.frequency.to_string()),
        KeyValue::new("Confidence", report.settings.confidence.to_string()),
    ];
    summary.extend(
        report
            .weights
            .iter()
            .map(|(asset, w)| KeyValue::from_percent(format!("Weight {asset}"), w)),
    );
    print_output(&summary, table)?;

    match (&report.dispersion.value, &report.dispersion.error) {
        (Some(d), _) => {
            print_header(&format!("Dispersion ({})", d.frequency));
            let rows: Vec<DispersionRow> = d
                .mean
                .iter()
                .map(|(entity, mean)| DispersionRow {
                    entity: entity.clone(),
                    mean: format_percent(*mean),
                    volatility: d.volatility.get(entity).map_or_else(String::new, |v| format_percent(*v)),
                    downside: d
                        .downside_deviation
                        .get(entity)
                        .map_or_else(String::new, |v| format_percent(*v)),
                    rolling: d
                        .latest_rolling_volatility
                        .as_ref()
                        .and_then(|l| l.get(entity))
                        .map_or_else(|| "-".to_string(), |v| format_percent(*v)),
                })
                .collect();
            print_output(&rows, table)?;

            match (&d.correlation.value, &d.correlation.error) {
                (Some(corr), _) => {
                    print_header("Correlation");
                    print_matrix(&corr.assets, &corr.values, 3);
                }
                (None, Some(err)) => print_warning(&format!("correlation: {err}")),
                (None, None) => {}
            }

            match (&d.serial_correlation.value, &d.serial_correlation.error) {
                (Some(tests), _) => {
                    print_header("Serial Correlation (Ljung-Box)");
                    let rows: Vec<SerialRow> = tests
                        .iter()
                        .map(|(entity, lb)| SerialRow {
                            entity: entity.clone(),
                            lags: lb.lags,
                            statistic: format!("{:.3}", lb.statistic),
                            p_value: format!("{:.4}", lb.p_value),
                        })
                        .collect();
                    print_output(&rows, table)?;
                }
                (None, Some(err)) => print_warning(&format!("serial correlation: {err}")),
                (None, None) => {}
            }
        }
        (None, Some(err)) => print_warning(&format!("dispersion: {err}")),
        (None, None) => {}
    }

    print_header(&format!("Tail Risk at {}", report.settings.confidence));
    let mut rows = Vec::new();
    for (var_section, cvar_section) in report.var.iter().zip(&report.cvar) {
        if let Some(err) = &var_section.results.error {
            print_warning(&format!("{} VaR: {err}", var_section.method));
        }
        if let Some(err) = &cvar_section.results.error {
            print_warning(&format!("{} CVaR: {err}", cvar_section.method));
        }
        let vars = var_section.results.value.as_deref().unwrap_or_default();
        let cvars = cvar_section.results.value.as_deref().unwrap_or_default();
        rows.extend(tail_rows(vars, cvars));
    }
    print_output(&rows, table)?;

    if !report.breaches.is_empty() {
        print_header("One-Period VaR Breaches");
        let rows: Vec<BreachRow> = report
            .breaches
            .iter()
            .flat_map(|b| {
                b.counts.iter().map(|(entity, count)| BreachRow {
                    method: b.method.to_string(),
                    entity: entity.clone(),
                    count: *count,
                    expected: format!("{:.1}", b.expected),
                })
            })
            .collect();
        print_output(&rows, table)?;
    }

    match (&report.performance.value, &report.performance.error) {
        (Some(perf), _) => {
            print_header("Performance");
            let rows: Vec<PerformanceRow> = perf
                .metrics
                .iter()
                .map(|(entity, m)| PerformanceRow {
                    entity: entity.clone(),
                    sharpe: format_optional(m.sharpe),
                    sortino: format_optional(m.sortino),
                    beta: format_optional(m.beta),
                    alpha: format_optional(m.alpha),
                    treynor: format_optional(m.treynor),
                    information_ratio: format_optional(m.information_ratio),
                    max_drawdown: m.max_drawdown.map_or_else(|| "-".to_string(), format_percent),
                })
                .collect();
            print_output(&rows, table)?;
            if let Some(b) = &perf.benchmark {
                print_output(
                    &[
                        KeyValue::new("Benchmark", b.name.clone()),
                        KeyValue::from_percent("Benchmark Mean", b.mean),
                        KeyValue::from_percent("Benchmark Volatility", b.volatility),
                        KeyValue::new("Benchmark Observations", b.observations.to_string()),
                    ],
                    table,
                )?;
            }
            for skip in &perf.skipped {
                tracing::debug!("{} {} skipped: {}", skip.entity, skip.metric.as_str(), skip.reason);
            }
        }
        (None, Some(err)) => print_warning(&format!("performance: {err}")),
        (None, None) => {}
    }

    Ok(())
}

/// Pairs each VaR value with the CVaR of the same method, horizon and entity.
fn tail_rows(vars: &[VaRResult], cvars: &[CVaRResult]) -> Vec<TailRow> {
    let mut rows = Vec::new();
    for var in vars {
        let cvar = cvars.iter().find(|c| c.horizon == var.horizon);
        for (entity, value) in &var.values {
            rows.push(TailRow {
                method: var.method.to_string(),
                horizon: var.horizon,
                entity: entity.clone(),
                var: format_percent(*value),
                cvar: cvar
                    .and_then(|c| c.get(entity))
                    .map_or_else(|| "-".to_string(), format_percent),
            });
        }
    }
    rows
}
