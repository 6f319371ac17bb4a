//! Benchmark return series.

use chrono::NaiveDate;
use serde::Serialize;

use super::{Frequency, ReturnKind};
use crate::error::{CoreError, CoreResult};

/// A single dated return column used as the market reference for
/// benchmark-relative metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkSeries {
    name: String,
    frequency: Frequency,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

/// Two return columns restricted to their common dates.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    /// Common dates, strictly increasing.
    pub dates: Vec<NaiveDate>,
    /// Values of the first series on the common dates.
    pub left: Vec<f64>,
    /// Values of the benchmark on the common dates.
    pub right: Vec<f64>,
}

impl AlignedPair {
    /// Number of aligned observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns true when the two series share no date.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl BenchmarkSeries {
    /// Creates a benchmark from dated returns.
    pub fn new(
        name: impl Into<String>,
        frequency: Frequency,
        dates: Vec<NaiveDate>,
        values: Vec<f64>,
    ) -> CoreResult<Self> {
        let name = name.into();
        if dates.len() != values.len() {
            return Err(CoreError::invalid_series(format!(
                "benchmark '{}' has {} returns for {} dates",
                name,
                values.len(),
                dates.len()
            )));
        }
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(CoreError::invalid_series(format!(
                "benchmark dates must be strictly increasing ({} is followed by {})",
                pair[0], pair[1]
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CoreError::invalid_series(format!(
                "benchmark '{name}' contains non-finite returns"
            )));
        }
        Ok(Self {
            name,
            frequency,
            dates,
            values,
        })
    }

    /// Creates a benchmark from a price column.
    pub fn from_prices(
        name: impl Into<String>,
        frequency: Frequency,
        dates: Vec<NaiveDate>,
        prices: &[f64],
        kind: ReturnKind,
    ) -> CoreResult<Self> {
        if prices.len() != dates.len() || prices.len() < 2 {
            return Err(CoreError::invalid_series(
                "benchmark prices must match dates and contain at least two points",
            ));
        }
        if prices.iter().any(|p| !(p.is_finite() && *p > 0.0)) {
            return Err(CoreError::invalid_series("benchmark prices must be positive"));
        }
        let values = prices
            .windows(2)
            .map(|w| match kind {
                ReturnKind::Simple => w[1] / w[0] - 1.0,
                ReturnKind::Log => (w[1] / w[0]).ln(),
            })
            .collect();
        Self::new(name, frequency, dates[1..].to_vec(), values)
    }

    /// Benchmark name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sampling frequency.
    #[must_use]
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Observation dates.
    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Benchmark returns.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Inner-joins `values` observed on `dates` with this benchmark.
    ///
    /// Both date vectors are strictly increasing, so a single merge pass is
    /// enough.
    #[must_use]
    pub fn align_with(&self, dates: &[NaiveDate], values: &[f64]) -> AlignedPair {
        let mut out = AlignedPair {
            dates: Vec::new(),
            left: Vec::new(),
            right: Vec::new(),
        };
        let (mut i, mut j) = (0, 0);
        while i < dates.len().min(values.len()) && j < self.dates.len() {
            match dates[i].cmp(&self.dates[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    out.dates.push(dates[i]);
                    out.left.push(values[i]);
                    out.right.push(self.values[j]);
                    i += 1;
                    j += 1;
                }
            }
        }
        out
    }
}
