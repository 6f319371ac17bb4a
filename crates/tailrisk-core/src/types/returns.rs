//! Date-aligned asset return columns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use uuid::Uuid;

use super::{Frequency, Weights};
use crate::error::{CoreError, CoreResult};

/// Entity name reserved for the weighted portfolio.
pub const PORTFOLIO: &str = "portfolio";

/// Minimum number of observations a series must carry.
pub const MIN_OBSERVATIONS: usize = 2;

/// Identity of one constructed [`ReturnSeries`].
///
/// Every construction yields a fresh id; result caches compare ids to decide
/// whether their contents still describe the current input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesId(Uuid);

impl SeriesId {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How periodic returns are derived from prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReturnKind {
    /// `p[t] / p[t-1] - 1`
    #[default]
    Simple,
    /// `ln(p[t] / p[t-1])`
    Log,
}

/// Immutable matrix of periodic asset returns on a common, strictly
/// increasing set of dates.
///
/// Every column has the same length (at least two) and holds only finite
/// values. Upstream collaborators are responsible for filling or dropping
/// missing data before construction.
#[derive(Debug, Clone, Serialize)]
pub struct ReturnSeries {
    #[serde(skip)]
    id: SeriesId,
    frequency: Frequency,
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl ReturnSeries {
    /// Builds a series from columns already aligned to `dates`.
    pub fn new(
        frequency: Frequency,
        dates: Vec<NaiveDate>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> CoreResult<Self> {
        if columns.is_empty() {
            return Err(CoreError::invalid_series("at least one asset is required"));
        }
        if dates.len() < MIN_OBSERVATIONS {
            return Err(CoreError::insufficient_data(MIN_OBSERVATIONS, dates.len()));
        }
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(CoreError::invalid_series(format!(
                "dates must be strictly increasing ({} is followed by {})",
                pair[0], pair[1]
            )));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        let mut assets = Vec::with_capacity(columns.len());
        let mut values = Vec::with_capacity(columns.len());
        for (name, column) in columns {
            if name.is_empty() {
                return Err(CoreError::invalid_series("asset names cannot be empty"));
            }
            if name == PORTFOLIO {
                return Err(CoreError::invalid_series(format!(
                    "asset name '{PORTFOLIO}' is reserved for the weighted portfolio"
                )));
            }
            if !seen.insert(name.clone()) {
                return Err(CoreError::invalid_series(format!("duplicate asset '{name}'")));
            }
            if column.len() != dates.len() {
                return Err(CoreError::invalid_series(format!(
                    "asset '{}' has {} returns for {} dates",
                    name,
                    column.len(),
                    dates.len()
                )));
            }
            if let Some(pos) = column.iter().position(|r| !r.is_finite()) {
                return Err(CoreError::invalid_series(format!(
                    "asset '{}' has a non-finite return on {}",
                    name, dates[pos]
                )));
            }
            assets.push(name);
            values.push(column);
        }

        Ok(Self {
            id: SeriesId::fresh(),
            frequency,
            dates,
            assets,
            columns: values,
        })
    }

    /// Inner-joins individually dated asset columns onto their common dates.
    ///
    /// A date is kept only when every asset reports a return for it.
    pub fn align(
        frequency: Frequency,
        columns: Vec<(String, Vec<(NaiveDate, f64)>)>,
    ) -> CoreResult<Self> {
        let mut indexed: Vec<(String, BTreeMap<NaiveDate, f64>)> = Vec::with_capacity(columns.len());
        for (name, observations) in columns {
            let mut by_date = BTreeMap::new();
            for (date, value) in observations {
                if by_date.insert(date, value).is_some() {
                    return Err(CoreError::invalid_series(format!(
                        "asset '{name}' has more than one return on {date}"
                    )));
                }
            }
            indexed.push((name, by_date));
        }

        let common: BTreeSet<NaiveDate> = match indexed.split_first() {
            Some(((_, first), rest)) => first
                .keys()
                .filter(|d| rest.iter().all(|(_, other)| other.contains_key(*d)))
                .copied()
                .collect(),
            None => BTreeSet::new(),
        };

        let dates: Vec<NaiveDate> = common.into_iter().collect();
        let aligned = indexed
            .into_iter()
            .map(|(name, by_date)| {
                let column = dates.iter().filter_map(|d| by_date.get(d).copied()).collect();
                (name, column)
            })
            .collect();

        Self::new(frequency, dates, aligned)
    }

    /// Converts aligned price columns into returns.
    ///
    /// The first date is consumed by differencing, so `n` prices yield `n - 1`
    /// returns. Prices must be finite and strictly positive.
    pub fn from_prices(
        frequency: Frequency,
        dates: Vec<NaiveDate>,
        prices: Vec<(String, Vec<f64>)>,
        kind: ReturnKind,
    ) -> CoreResult<Self> {
        if dates.len() < MIN_OBSERVATIONS + 1 {
            return Err(CoreError::insufficient_data(MIN_OBSERVATIONS + 1, dates.len()));
        }

        let mut columns = Vec::with_capacity(prices.len());
        for (name, column) in prices {
            if column.len() != dates.len() {
                return Err(CoreError::invalid_series(format!(
                    "asset '{}' has {} prices for {} dates",
                    name,
                    column.len(),
                    dates.len()
                )));
            }
            if let Some(bad) = column.iter().find(|p| !(p.is_finite() && **p > 0.0)) {
                return Err(CoreError::invalid_series(format!(
                    "asset '{name}' has a non-positive or non-finite price {bad}"
                )));
            }
            let returns = column
                .windows(2)
                .map(|w| match kind {
                    ReturnKind::Simple => w[1] / w[0] - 1.0,
                    ReturnKind::Log => (w[1] / w[0]).ln(),
                })
                .collect();
            columns.push((name, returns));
        }

        Self::new(frequency, dates[1..].to_vec(), columns)
    }

    /// Identity of this construction.
    #[must_use]
    pub fn id(&self) -> SeriesId {
        self.id
    }

    /// Sampling frequency of the returns.
    #[must_use]
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Observation dates, strictly increasing.
    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Asset names in column order.
    #[must_use]
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Number of observations per asset.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false for a constructed series; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of assets.
    #[must_use]
    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    /// Returns the column for `asset`, if present.
    #[must_use]
    pub fn column(&self, asset: &str) -> Option<&[f64]> {
        self.assets
            .iter()
            .position(|a| a == asset)
            .map(|i| self.columns[i].as_slice())
    }

    /// Returns the column at position `index`.
    #[must_use]
    pub fn column_at(&self, index: usize) -> Option<&[f64]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    /// Iterates `(asset, returns)` pairs in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.assets
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    /// Weighted aggregation: `sum_a w[a] * r[a][t]` for every date.
    pub fn weighted(&self, weights: &Weights) -> CoreResult<Vec<f64>> {
        let vector = weights.aligned_to(self)?;
        let mut out = vec![0.0; self.len()];
        for (column, w) in self.columns.iter().zip(&vector) {
            for (acc, r) in out.iter_mut().zip(column) {
                *acc += w * r;
            }
        }
        Ok(out)
    }
}

impl PartialEq for ReturnSeries {
    /// Two series are equal when their data is equal, regardless of identity.
    fn eq(&self, other: &Self) -> bool {
        self.frequency == other.frequency
            && self.dates == other.dates
            && self.assets == other.assets
            && self.columns == other.columns
    }
}
