//! Fixed-weight portfolio over a shared return series.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::error::CoreResult;
use crate::types::{Frequency, ReturnSeries, SeriesId, Weights, PORTFOLIO};

/// A return series paired with validated weights and the derived portfolio
/// return column.
///
/// The portfolio column is produced once, at construction, and never mutated.
/// Changing weights produces a new `Portfolio` via [`Portfolio::with_weights`].
#[derive(Debug, Clone)]
pub struct Portfolio {
    series: Arc<ReturnSeries>,
    weights: Weights,
    weight_vector: Vec<f64>,
    returns: Vec<f64>,
}

impl Portfolio {
    /// Combines a series with weights whose keys match its assets exactly.
    pub fn new(series: Arc<ReturnSeries>, weights: Weights) -> CoreResult<Self> {
        let weight_vector = weights.aligned_to(&series)?;
        let returns = series.weighted(&weights)?;
        log::debug!(
            "built portfolio over {} assets and {} observations (series {})",
            series.n_assets(),
            series.len(),
            series.id()
        );
        Ok(Self {
            series,
            weights,
            weight_vector,
            returns,
        })
    }

    /// Re-weights the same series.
    pub fn with_weights(&self, weights: Weights) -> CoreResult<Self> {
        Self::new(Arc::clone(&self.series), weights)
    }

    /// The underlying asset return series.
    #[must_use]
    pub fn series(&self) -> &ReturnSeries {
        &self.series
    }

    /// Shared handle to the underlying series.
    #[must_use]
    pub fn shared_series(&self) -> Arc<ReturnSeries> {
        Arc::clone(&self.series)
    }

    /// Identity of the underlying series.
    #[must_use]
    pub fn series_id(&self) -> SeriesId {
        self.series.id()
    }

    /// Portfolio weights.
    #[must_use]
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Weights in series column order.
    #[must_use]
    pub fn weight_vector(&self) -> &[f64] {
        &self.weight_vector
    }

    /// Weighted portfolio returns.
    #[must_use]
    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    /// Observation dates.
    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        self.series.dates()
    }

    /// Sampling frequency.
    #[must_use]
    pub fn frequency(&self) -> Frequency {
        self.series.frequency()
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    /// Always false for a constructed portfolio.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Entity names: every asset followed by [`PORTFOLIO`].
    #[must_use]
    pub fn entities(&self) -> Vec<&str> {
        self.series
            .assets()
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(PORTFOLIO))
            .collect()
    }

    /// Iterates `(entity, returns)` for every asset and the portfolio.
    pub fn entity_returns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.series
            .columns()
            .chain(std::iter::once((PORTFOLIO, self.returns.as_slice())))
    }

    /// Returns for a single entity.
    #[must_use]
    pub fn returns_of(&self, entity: &str) -> Option<&[f64]> {
        if entity == PORTFOLIO {
            Some(&self.returns)
        } else {
            self.series.column(entity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use approx::assert_relative_eq;

    fn two_asset_series() -> Arc<ReturnSeries> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..5).map(|i| start + chrono::Days::new(i)).collect();
        Arc::new(
            ReturnSeries::new(
                Frequency::Daily,
                dates,
                vec![
                    ("A".into(), vec![0.01, -0.02, 0.015, -0.01, 0.005]),
                    ("B".into(), vec![-0.005, 0.01, -0.015, 0.02, 0.0]),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_weighted_returns() {
        let portfolio =
            Portfolio::new(two_asset_series(), Weights::new([("A", 0.5), ("B", 0.5)]).unwrap())
                .unwrap();
        let expected = [0.0025, -0.005, 0.0, 0.005, 0.0025];
        for (got, want) in portfolio.returns().iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-15);
        }
        assert_eq!(portfolio.entities(), vec!["A", "B", PORTFOLIO]);
    }

    #[test]
    fn test_with_weights_shares_series() {
        let portfolio =
            Portfolio::new(two_asset_series(), Weights::new([("A", 0.5), ("B", 0.5)]).unwrap())
                .unwrap();
        let reweighted = portfolio
            .with_weights(Weights::new([("A", 1.0), ("B", 0.0)]).unwrap())
            .unwrap();
        assert_eq!(portfolio.series_id(), reweighted.series_id());
        assert_eq!(reweighted.returns(), portfolio.series().column("A").unwrap());
    }

    #[test]
    fn test_mismatched_weights() {
        let err = Portfolio::new(two_asset_series(), Weights::new([("A", 1.0)]).unwrap())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidWeights { .. }));
    }
}
