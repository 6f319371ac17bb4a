//! CSV input and output.
//!
//! Return and price files share one layout: a `date` column with ISO dates
//! followed by one numeric column per asset. A benchmark file has exactly one
//! value column, whose header names the benchmark.

use anyhow::Context;
use chrono::NaiveDate;
use std::path::Path;

use tailrisk_core::{BenchmarkSeries, Frequency, ReturnKind, ReturnSeries};

use crate::commands::parse_date;
use crate::error::{CliError, CliResult};

/// Dated columns read from a CSV file.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedColumns {
    /// Row dates in file order.
    pub dates: Vec<NaiveDate>,
    /// Column name and values, one value per date.
    pub columns: Vec<(String, Vec<f64>)>,
}

/// Reads a `date,<name>...` file, keeping the rows whose date passes
/// `include`.
///
/// Rows with an empty cell are dropped with a warning; any other unparsable
/// value is an error.
pub fn read_columns(path: &Path, include: impl Fn(NaiveDate) -> bool) -> CliResult<DatedColumns> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let mut names = headers.iter();
    match names.next() {
        Some(first) if first.eq_ignore_ascii_case("date") => {}
        _ => {
            return Err(CliError::InvalidData {
                path: path.to_path_buf(),
                line: 1,
                reason: "first column must be 'date'".to_string(),
            })
        }
    }
    let names: Vec<String> = names.map(str::to_string).collect();
    if names.is_empty() {
        return Err(CliError::EmptyData {
            path: path.to_path_buf(),
            reason: "no value columns".to_string(),
        });
    }

    let mut dates = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    let mut dropped = 0usize;

    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        let invalid = |reason: String| CliError::InvalidData {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let date = parse_date(record.get(0).unwrap_or_default())
            .map_err(|e| invalid(e.to_string()))?;
        if !include(date) {
            continue;
        }

        if record.len() != names.len() + 1 {
            return Err(invalid(format!(
                "expected {} fields, found {}",
                names.len() + 1,
                record.len()
            )));
        }
        if record.iter().skip(1).any(str::is_empty) {
            dropped += 1;
            continue;
        }

        let mut row = Vec::with_capacity(names.len());
        for (name, cell) in names.iter().zip(record.iter().skip(1)) {
            let value: f64 = cell
                .parse()
                .map_err(|_| invalid(format!("'{cell}' is not a number in column '{name}'")))?;
            row.push(value);
        }
        dates.push(date);
        for (column, value) in values.iter_mut().zip(row) {
            column.push(value);
        }
    }

    if dropped > 0 {
        tracing::warn!("{}: dropped {} rows with missing values", path.display(), dropped);
    }
    if dates.is_empty() {
        return Err(CliError::EmptyData {
            path: path.to_path_buf(),
            reason: "no rows in the selected date range".to_string(),
        });
    }
    tracing::debug!(
        "{}: read {} rows for {} columns",
        path.display(),
        dates.len(),
        names.len()
    );

    Ok(DatedColumns {
        dates,
        columns: names.into_iter().zip(values).collect(),
    })
}

/// Loads an asset return series, converting prices when `prices` is set.
pub fn load_returns(
    path: &Path,
    frequency: Frequency,
    prices: Option<ReturnKind>,
    include: impl Fn(NaiveDate) -> bool,
) -> anyhow::Result<ReturnSeries> {
    let table = read_columns(path, include)?;
    let series = match prices {
        Some(kind) => ReturnSeries::from_prices(frequency, table.dates, table.columns, kind),
        None => ReturnSeries::new(frequency, table.dates, table.columns),
    }
    .with_context(|| format!("building return series from {}", path.display()))?;
    Ok(series)
}

/// Loads a single-column benchmark file.
pub fn load_benchmark(
    path: &Path,
    frequency: Frequency,
    prices: Option<ReturnKind>,
    include: impl Fn(NaiveDate) -> bool,
) -> anyhow::Result<BenchmarkSeries> {
    let table = read_columns(path, include)?;
    let mut columns = table.columns.into_iter();
    let (name, values) = match (columns.next(), columns.next()) {
        (Some(column), None) => column,
        _ => {
            return Err(CliError::InvalidData {
                path: path.to_path_buf(),
                line: 1,
                reason: "a benchmark file has exactly one value column".to_string(),
            }
            .into())
        }
    };
    let benchmark = match prices {
        Some(kind) => BenchmarkSeries::from_prices(name, frequency, table.dates, &values, kind),
        None => BenchmarkSeries::new(name, frequency, table.dates, values),
    }
    .with_context(|| format!("building benchmark from {}", path.display()))?;
    Ok(benchmark)
}

/// Writes dated columns in the input layout.
pub fn write_columns(path: &Path, data: &DatedColumns) -> CliResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(
        std::iter::once("date").chain(data.columns.iter().map(|(name, _)| name.as_str())),
    )?;
    for (t, date) in data.dates.iter().enumerate() {
        let mut record = vec![date.format("%Y-%m-%d").to_string()];
        record.extend(data.columns.iter().map(|(_, values)| format!("{:.10}", values[t])));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
