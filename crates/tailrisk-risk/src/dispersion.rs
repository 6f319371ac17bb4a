//! Dispersion statistics: moments, rolling volatility, downside deviation,
//! covariance and correlation matrices, distribution shape, serial
//! correlation.
//!
//! Statistics are computed at the series' native frequency and rescaled to
//! the requested one: means and variances linearly, standard deviations
//! with the square root of time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use tailrisk_core::scaling::{rescale_mean, rescale_variance, rescale_vol};
use tailrisk_core::{Frequency, Portfolio};
use tailrisk_math::linear_algebra::{correlation_from_covariance, covariance_matrix};
use tailrisk_math::statistics::{
    self, excess_kurtosis, ljung_box, quantile_sorted, rolling_std, skewness,
};

use crate::cache::ResultCache;
use crate::error::{RiskError, RiskResult};
use crate::EntityValues;

/// Square matrix over assets, keyed by asset pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMatrix {
    /// Row and column labels.
    pub assets: Vec<String>,
    /// Row-major values.
    pub values: Vec<Vec<f64>>,
}

impl AssetMatrix {
    fn from_dmatrix(assets: &[String], m: &nalgebra::DMatrix<f64>) -> Self {
        let values = (0..m.nrows())
            .map(|i| (0..m.ncols()).map(|j| m[(i, j)]).collect())
            .collect();
        Self {
            assets: assets.to_vec(),
            values,
        }
    }

    /// Entry for an asset pair.
    #[must_use]
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.assets.iter().position(|a| a == row)?;
        let j = self.assets.iter().position(|a| a == col)?;
        Some(self.values[i][j])
    }

    /// Number of assets.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.assets.len()
    }

    /// Iterates `(row, col, value)` over every cell.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.assets.iter().enumerate().flat_map(move |(i, a)| {
            self.assets
                .iter()
                .enumerate()
                .map(move |(j, b)| (a.as_str(), b.as_str(), self.values[i][j]))
        })
    }
}

/// Shape of one entity's return distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionStats {
    /// Adjusted Fisher-Pearson skewness.
    pub skewness: f64,
    /// Adjusted excess kurtosis.
    pub excess_kurtosis: f64,
    /// 5th percentile.
    pub p05: f64,
    /// Median.
    pub p50: f64,
    /// 95th percentile.
    pub p95: f64,
}

/// Lags tested by the report's Ljung-Box diagnostic.
pub const DEFAULT_LJUNG_BOX_LAGS: usize = 10;

/// Ljung-Box test of one entity's returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerialCorrelation {
    /// Lags tested.
    pub lags: usize,
    /// Q statistic.
    pub statistic: f64,
    /// Chi-squared p-value; small values indicate autocorrelation.
    pub p_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum MatrixKind {
    Covariance,
    Correlation,
}

/// Dispersion statistics for every asset and the portfolio.
#[derive(Debug)]
pub struct DispersionEngine<'a> {
    portfolio: &'a Portfolio,
    matrices: ResultCache<MatrixKind, AssetMatrix>,
}

impl<'a> DispersionEngine<'a> {
    /// Creates an engine over `portfolio`.
    #[must_use]
    pub fn new(portfolio: &'a Portfolio) -> Self {
        Self {
            portfolio,
            matrices: ResultCache::new(),
        }
    }

    fn per_entity<F>(&self, f: F) -> RiskResult<EntityValues>
    where
        F: Fn(&[f64]) -> RiskResult<f64>,
    {
        self.portfolio
            .entity_returns()
            .map(|(entity, returns)| Ok((entity.to_string(), f(returns)?)))
            .collect()
    }

    /// Mean return at `frequency`.
    pub fn mean(&self, frequency: Frequency) -> RiskResult<EntityValues> {
        let native = self.portfolio.frequency();
        self.per_entity(|r| Ok(rescale_mean(statistics::mean(r)?, native, frequency)))
    }

    /// Sample standard deviation at `frequency`.
    pub fn std(&self, frequency: Frequency) -> RiskResult<EntityValues> {
        let native = self.portfolio.frequency();
        self.per_entity(|r| Ok(rescale_vol(statistics::std_dev(r)?, native, frequency)))
    }

    /// Sample variance at `frequency`.
    pub fn variance(&self, frequency: Frequency) -> RiskResult<EntityValues> {
        let native = self.portfolio.frequency();
        self.per_entity(|r| Ok(rescale_variance(statistics::variance(r)?, native, frequency)))
    }

    /// Lazy rolling standard deviation of one entity, at native frequency.
    ///
    /// Each item is the date closing a full window and the sample standard
    /// deviation over that window. The first `window - 1` dates yield
    /// nothing. Requires `2 <= window <= n`.
    pub fn rolling_volatility(
        &self,
        entity: &str,
        window: usize,
    ) -> RiskResult<impl Iterator<Item = (NaiveDate, f64)> + 'a> {
        let portfolio = self.portfolio;
        let returns = portfolio
            .returns_of(entity)
            .ok_or_else(|| RiskError::unknown_entity(entity))?;
        let dates = portfolio.dates();
        Ok(rolling_std(returns, window)?.map(move |(i, s)| (dates[i], s)))
    }

    /// Downside deviation below `threshold` at native frequency.
    pub fn downside_deviation(&self, threshold: f64) -> RiskResult<EntityValues> {
        self.per_entity(|r| Ok(statistics::downside_deviation(r, threshold)?))
    }

    /// Sample covariance matrix of the assets at native frequency.
    pub fn covariance_matrix(&self) -> RiskResult<AssetMatrix> {
        self.matrices.get_or_try_insert_with(
            self.portfolio.series_id(),
            MatrixKind::Covariance,
            || {
                let series = self.portfolio.series();
                let columns: Vec<&[f64]> = series.columns().map(|(_, c)| c).collect();
                let cov = covariance_matrix(&columns)?;
                Ok(AssetMatrix::from_dmatrix(series.assets(), &cov))
            },
        )
    }

    /// Correlation matrix of the assets. The diagonal is exactly 1.0.
    ///
    /// Fails with `DivisionByZero` if some asset has zero variance.
    pub fn correlation_matrix(&self) -> RiskResult<AssetMatrix> {
        self.matrices.get_or_try_insert_with(
            self.portfolio.series_id(),
            MatrixKind::Correlation,
            || {
                let series = self.portfolio.series();
                let columns: Vec<&[f64]> = series.columns().map(|(_, c)| c).collect();
                let corr = correlation_from_covariance(&covariance_matrix(&columns)?)?;
                Ok(AssetMatrix::from_dmatrix(series.assets(), &corr))
            },
        )
    }

    /// Skewness, excess kurtosis and 5/50/95th percentiles per entity.
    ///
    /// Percentiles use the same interpolation rule as historical VaR.
    pub fn distribution_stats(&self) -> RiskResult<BTreeMap<String, DistributionStats>> {
        self.portfolio
            .entity_returns()
            .map(|(entity, returns)| {
                let sorted = statistics::sorted(returns);
                let stats = DistributionStats {
                    skewness: skewness(returns)?,
                    excess_kurtosis: excess_kurtosis(returns)?,
                    p05: quantile_sorted(&sorted, 0.05)?,
                    p50: quantile_sorted(&sorted, 0.50)?,
                    p95: quantile_sorted(&sorted, 0.95)?,
                };
                Ok((entity.to_string(), stats))
            })
            .collect()
    }

    /// Ljung-Box test for serial correlation up to `lags`, per entity.
    ///
    /// Fails with `InsufficientData` unless every series is longer than
    /// `lags`, and with `DivisionByZero` if some entity is constant.
    pub fn ljung_box(&self, lags: usize) -> RiskResult<BTreeMap<String, SerialCorrelation>> {
        self.portfolio
            .entity_returns()
            .map(|(entity, returns)| {
                let lb = ljung_box(returns, lags)?;
                Ok((
                    entity.to_string(),
                    SerialCorrelation {
                        lags: lb.lags,
                        statistic: lb.statistic,
                        p_value: lb.p_value,
                    },
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ar1_portfolio, five_point_portfolio, ramp_portfolio};
    use approx::assert_relative_eq;
    use tailrisk_core::PORTFOLIO;

    #[test]
    fn test_mean_scaling() {
        let portfolio = five_point_portfolio();
        let engine = DispersionEngine::new(&portfolio);
        let daily = engine.mean(Frequency::Daily).unwrap();
        let yearly = engine.mean(Frequency::Yearly).unwrap();
        assert_relative_eq!(daily["A"], 0.0, epsilon = 1e-15);
        assert_relative_eq!(daily["B"], 0.002, epsilon = 1e-15);
        assert_relative_eq!(yearly["B"], 0.002 * 252.0, epsilon = 1e-12);
        assert_relative_eq!(daily[PORTFOLIO], 0.001, epsilon = 1e-15);
    }

    #[test]
    fn test_std_scaling() {
        let portfolio = five_point_portfolio();
        let engine = DispersionEngine::new(&portfolio);
        let daily = engine.std(Frequency::Daily).unwrap();
        let yearly = engine.std(Frequency::Yearly).unwrap();
        let var = engine.variance(Frequency::Daily).unwrap();
        assert_relative_eq!(yearly["B"], daily["B"] * 252f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(var["B"], daily["B"].powi(2), epsilon = 1e-15);
    }

    #[test]
    fn test_rolling_volatility_skips_incomplete_windows() {
        let portfolio = five_point_portfolio();
        let engine = DispersionEngine::new(&portfolio);
        let rolled: Vec<_> = engine.rolling_volatility("A", 3).unwrap().collect();
        assert_eq!(rolled.len(), 3);
        assert_eq!(rolled[0].0, portfolio.dates()[2]);

        assert!(engine.rolling_volatility("A", 6).is_err());
        assert!(engine.rolling_volatility("A", 1).is_err());
        assert!(engine.rolling_volatility("Z", 3).is_err());
    }

    #[test]
    fn test_downside_deviation() {
        let portfolio = five_point_portfolio();
        let engine = DispersionEngine::new(&portfolio);
        let dd = engine.downside_deviation(0.0).unwrap();
        // A below zero: -0.02, -0.01
        assert_relative_eq!(dd["A"], (0.0005f64 / 2.0).sqrt(), epsilon = 1e-12);
        let none = engine.downside_deviation(-1.0).unwrap();
        assert_relative_eq!(none[PORTFOLIO], 0.0);
    }

    #[test]
    fn test_matrices() {
        let portfolio = ramp_portfolio(60);
        let engine = DispersionEngine::new(&portfolio);
        let corr = engine.correlation_matrix().unwrap();
        assert_eq!(corr.get("A", "A"), Some(1.0));
        assert_eq!(corr.get("B", "B"), Some(1.0));
        assert_eq!(corr.get("A", "B"), corr.get("B", "A"));
        assert_eq!(corr.pairs().count(), 4);

        let cov = engine.covariance_matrix().unwrap();
        let std = engine.std(Frequency::Daily).unwrap();
        assert_relative_eq!(cov.get("A", "A").unwrap(), std["A"].powi(2), epsilon = 1e-15);
        assert_eq!(cov.dim(), 2);
    }

    #[test]
    fn test_distribution_stats() {
        let portfolio = ramp_portfolio(60);
        let engine = DispersionEngine::new(&portfolio);
        let stats = engine.distribution_stats().unwrap();
        let p = stats[PORTFOLIO];
        assert!(p.p05 <= p.p50 && p.p50 <= p.p95);
        assert_eq!(stats.len(), 3);
    }

    #[test]
    fn test_ljung_box_separates_ar1_from_noise() {
        let portfolio = ar1_portfolio(500, 0.6);
        let engine = DispersionEngine::new(&portfolio);
        let tests = engine.ljung_box(DEFAULT_LJUNG_BOX_LAGS).unwrap();
        assert_eq!(tests.len(), 3);

        let ar = tests["A"];
        assert_eq!(ar.lags, 10);
        assert!(ar.statistic > 100.0, "Q = {}", ar.statistic);
        assert!(ar.p_value < 1e-6);

        let noise = tests["B"];
        assert!(noise.p_value > 0.001, "p = {}", noise.p_value);
        assert!(noise.statistic < ar.statistic);
    }

    #[test]
    fn test_ljung_box_needs_more_observations_than_lags() {
        let portfolio = five_point_portfolio();
        let engine = DispersionEngine::new(&portfolio);
        assert!(matches!(
            engine.ljung_box(5),
            Err(RiskError::InsufficientData { required: 6, actual: 5 })
        ));
        assert!(engine.ljung_box(2).is_ok());
    }
}
