//! Risk-adjusted performance metrics.
//!
//! Ratios are annualized from the series frequency: excess means scale
//! linearly, standard deviations with the square root of time. The
//! risk-free rate is held per period. Benchmark-relative metrics (beta,
//! alpha, Treynor, information ratio) use only the dates shared with the
//! benchmark and need at least [`MIN_BENCHMARK_OVERLAP`] of them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use tailrisk_core::scaling::{annualize_return, annualize_vol};
use tailrisk_core::types::AlignedPair;
use tailrisk_core::{BenchmarkSeries, Frequency, Portfolio};
use tailrisk_math::statistics::{
    covariance, downside_deviation, max_drawdown, mean, std_dev, variance, ZERO_TOLERANCE,
};

use crate::cache::ResultCache;
use crate::error::{RiskError, RiskResult};
use crate::EntityValues;

/// Minimum number of dates shared with the benchmark.
pub const MIN_BENCHMARK_OVERLAP: usize = 10;

/// Performance metric identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceMetric {
    /// Sharpe ratio
    Sharpe,
    /// Sortino ratio
    Sortino,
    /// CAPM beta
    Beta,
    /// CAPM alpha (periodic)
    Alpha,
    /// Treynor ratio
    Treynor,
    /// Information ratio
    InformationRatio,
    /// Maximum drawdown
    MaxDrawdown,
}

impl PerformanceMetric {
    /// All metrics, in reporting order.
    pub const ALL: [PerformanceMetric; 7] = [
        PerformanceMetric::Sharpe,
        PerformanceMetric::Sortino,
        PerformanceMetric::Beta,
        PerformanceMetric::Alpha,
        PerformanceMetric::Treynor,
        PerformanceMetric::InformationRatio,
        PerformanceMetric::MaxDrawdown,
    ];

    /// Stable snake_case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceMetric::Sharpe => "sharpe",
            PerformanceMetric::Sortino => "sortino",
            PerformanceMetric::Beta => "beta",
            PerformanceMetric::Alpha => "alpha",
            PerformanceMetric::Treynor => "treynor",
            PerformanceMetric::InformationRatio => "information_ratio",
            PerformanceMetric::MaxDrawdown => "max_drawdown",
        }
    }

    /// True for metrics measured against the benchmark.
    #[must_use]
    pub fn needs_benchmark(&self) -> bool {
        matches!(
            self,
            PerformanceMetric::Beta
                | PerformanceMetric::Alpha
                | PerformanceMetric::Treynor
                | PerformanceMetric::InformationRatio
        )
    }
}

impl fmt::Display for PerformanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All metrics of one entity; `None` where the metric was skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityPerformance {
    /// Annualized Sharpe ratio.
    pub sharpe: Option<f64>,
    /// Annualized Sortino ratio.
    pub sortino: Option<f64>,
    /// Beta against the benchmark.
    pub beta: Option<f64>,
    /// Periodic alpha against the benchmark.
    pub alpha: Option<f64>,
    /// Annualized Treynor ratio.
    pub treynor: Option<f64>,
    /// Annualized information ratio.
    pub information_ratio: Option<f64>,
    /// Maximum drawdown as a positive fraction.
    pub max_drawdown: Option<f64>,
}

impl EntityPerformance {
    fn set(&mut self, metric: PerformanceMetric, value: f64) {
        let slot = match metric {
            PerformanceMetric::Sharpe => &mut self.sharpe,
            PerformanceMetric::Sortino => &mut self.sortino,
            PerformanceMetric::Beta => &mut self.beta,
            PerformanceMetric::Alpha => &mut self.alpha,
            PerformanceMetric::Treynor => &mut self.treynor,
            PerformanceMetric::InformationRatio => &mut self.information_ratio,
            PerformanceMetric::MaxDrawdown => &mut self.max_drawdown,
        };
        *slot = Some(value);
    }

    /// Value of one metric.
    #[must_use]
    pub fn get(&self, metric: PerformanceMetric) -> Option<f64> {
        match metric {
            PerformanceMetric::Sharpe => self.sharpe,
            PerformanceMetric::Sortino => self.sortino,
            PerformanceMetric::Beta => self.beta,
            PerformanceMetric::Alpha => self.alpha,
            PerformanceMetric::Treynor => self.treynor,
            PerformanceMetric::InformationRatio => self.information_ratio,
            PerformanceMetric::MaxDrawdown => self.max_drawdown,
        }
    }
}

/// A metric that could not be computed for an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedMetric {
    /// Asset name or "portfolio".
    pub entity: String,
    /// The metric.
    pub metric: PerformanceMetric,
    /// Error message.
    pub reason: String,
}

/// Benchmark mean and volatility at native frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkStats {
    /// Benchmark name.
    pub name: String,
    /// Mean periodic return.
    pub mean: f64,
    /// Sample standard deviation of periodic returns.
    pub volatility: f64,
    /// Number of observations.
    pub observations: usize,
}

/// Every metric for every entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceResult {
    /// Series frequency the ratios were annualized from.
    pub frequency: Frequency,
    /// Per-period risk-free rate.
    pub risk_free_rate: f64,
    /// Metrics keyed by entity.
    pub metrics: BTreeMap<String, EntityPerformance>,
    /// Benchmark statistics, if a benchmark was supplied.
    pub benchmark: Option<BenchmarkStats>,
    /// Metrics that failed, with the reason.
    pub skipped: Vec<SkippedMetric>,
}

/// Computes risk-adjusted performance for every asset and the portfolio.
#[derive(Debug)]
pub struct PerformanceEngine<'a> {
    portfolio: &'a Portfolio,
    benchmark: Option<&'a BenchmarkSeries>,
    risk_free: f64,
    summaries: ResultCache<u64, PerformanceResult>,
}

impl<'a> PerformanceEngine<'a> {
    /// Creates an engine with a zero risk-free rate and no benchmark.
    #[must_use]
    pub fn new(portfolio: &'a Portfolio) -> Self {
        Self {
            portfolio,
            benchmark: None,
            risk_free: 0.0,
            summaries: ResultCache::new(),
        }
    }

    /// Sets the benchmark series.
    #[must_use]
    pub fn with_benchmark(mut self, benchmark: &'a BenchmarkSeries) -> Self {
        self.benchmark = Some(benchmark);
        self.summaries.clear();
        self
    }

    /// Sets the risk-free rate per period of the series frequency.
    #[must_use]
    pub fn with_risk_free_rate(mut self, per_period: f64) -> Self {
        self.risk_free = per_period;
        self
    }

    /// Sets the risk-free rate from an annual rate, dividing by
    /// periods-per-year.
    #[must_use]
    pub fn with_annual_risk_free_rate(self, annual: f64) -> Self {
        let ppy = self.portfolio.frequency().periods_per_year();
        self.with_risk_free_rate(annual / f64::from(ppy))
    }

    /// Per-period risk-free rate.
    #[must_use]
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free
    }

    fn periods_per_year(&self) -> u32 {
        self.portfolio.frequency().periods_per_year()
    }

    fn returns(&self, entity: &str) -> RiskResult<&'a [f64]> {
        self.portfolio
            .returns_of(entity)
            .ok_or_else(|| RiskError::unknown_entity(entity))
    }

    fn annualized_excess(&self, returns: &[f64]) -> RiskResult<f64> {
        Ok(annualize_return(
            mean(returns)? - self.risk_free,
            self.periods_per_year(),
        ))
    }

    fn aligned(&self, entity: &str) -> RiskResult<AlignedPair> {
        let benchmark = self
            .benchmark
            .ok_or_else(|| RiskError::invalid_input("no benchmark series supplied"))?;
        if benchmark.frequency() != self.portfolio.frequency() {
            return Err(RiskError::invalid_input(format!(
                "benchmark '{}' is {} but the portfolio is {}",
                benchmark.name(),
                benchmark.frequency(),
                self.portfolio.frequency()
            )));
        }
        let pair = benchmark.align_with(self.portfolio.dates(), self.returns(entity)?);
        if pair.len() < MIN_BENCHMARK_OVERLAP {
            return Err(RiskError::insufficient_overlap(
                MIN_BENCHMARK_OVERLAP,
                pair.len(),
            ));
        }
        Ok(pair)
    }

    /// Annualized mean excess return over annualized volatility.
    ///
    /// Fails with `DivisionByZero` when the volatility is zero.
    pub fn sharpe(&self, entity: &str) -> RiskResult<f64> {
        let returns = self.returns(entity)?;
        let sd = std_dev(returns)?;
        if sd < ZERO_TOLERANCE {
            return Err(RiskError::division_by_zero(format!(
                "sharpe ratio of '{entity}' (zero volatility)"
            )));
        }
        Ok(self.annualized_excess(returns)? / annualize_vol(sd, self.periods_per_year()))
    }

    /// Annualized mean excess return over annualized downside deviation
    /// below 0.
    pub fn sortino(&self, entity: &str) -> RiskResult<f64> {
        let returns = self.returns(entity)?;
        let dd = downside_deviation(returns, 0.0)?;
        if dd < ZERO_TOLERANCE {
            return Err(RiskError::division_by_zero(format!(
                "sortino ratio of '{entity}' (no downside)"
            )));
        }
        Ok(self.annualized_excess(returns)? / annualize_vol(dd, self.periods_per_year()))
    }

    /// OLS slope against the benchmark: `Cov(r, b) / Var(b)`.
    pub fn beta(&self, entity: &str) -> RiskResult<f64> {
        let pair = self.aligned(entity)?;
        beta_of(&pair)
    }

    /// OLS intercept against the benchmark: `mean(r) - beta * mean(b)`,
    /// per period.
    pub fn alpha(&self, entity: &str) -> RiskResult<f64> {
        let pair = self.aligned(entity)?;
        let beta = beta_of(&pair)?;
        Ok(mean(&pair.left)? - beta * mean(&pair.right)?)
    }

    /// Annualized excess return over beta.
    pub fn treynor(&self, entity: &str) -> RiskResult<f64> {
        let beta = self.beta(entity)?;
        if beta.abs() < ZERO_TOLERANCE {
            return Err(RiskError::division_by_zero(format!(
                "treynor ratio of '{entity}' (zero beta)"
            )));
        }
        Ok(self.annualized_excess(self.returns(entity)?)? / beta)
    }

    /// Annualized mean active return over annualized tracking error.
    pub fn information_ratio(&self, entity: &str) -> RiskResult<f64> {
        let pair = self.aligned(entity)?;
        let active: Vec<f64> = pair
            .left
            .iter()
            .zip(&pair.right)
            .map(|(r, b)| r - b)
            .collect();
        let tracking = std_dev(&active)?;
        if tracking < ZERO_TOLERANCE {
            return Err(RiskError::division_by_zero(format!(
                "information ratio of '{entity}' (zero tracking error)"
            )));
        }
        let ppy = self.periods_per_year();
        Ok(annualize_return(mean(&active)?, ppy) / annualize_vol(tracking, ppy))
    }

    /// Maximum drawdown of the compounded path, as a positive fraction.
    pub fn max_drawdown(&self, entity: &str) -> RiskResult<f64> {
        Ok(max_drawdown(self.returns(entity)?)?)
    }

    /// Computes one metric for one entity.
    pub fn metric(&self, metric: PerformanceMetric, entity: &str) -> RiskResult<f64> {
        match metric {
            PerformanceMetric::Sharpe => self.sharpe(entity),
            PerformanceMetric::Sortino => self.sortino(entity),
            PerformanceMetric::Beta => self.beta(entity),
            PerformanceMetric::Alpha => self.alpha(entity),
            PerformanceMetric::Treynor => self.treynor(entity),
            PerformanceMetric::InformationRatio => self.information_ratio(entity),
            PerformanceMetric::MaxDrawdown => self.max_drawdown(entity),
        }
    }

    /// One metric for every entity; fails on the first entity that fails.
    pub fn metric_for_all(&self, metric: PerformanceMetric) -> RiskResult<EntityValues> {
        self.portfolio
            .entities()
            .into_iter()
            .map(|e| Ok((e.to_string(), self.metric(metric, e)?)))
            .collect()
    }

    /// Sharpe ratio for every entity.
    pub fn sharpe_ratio(&self) -> RiskResult<EntityValues> {
        self.metric_for_all(PerformanceMetric::Sharpe)
    }

    /// Sortino ratio for every entity.
    pub fn sortino_ratio(&self) -> RiskResult<EntityValues> {
        self.metric_for_all(PerformanceMetric::Sortino)
    }

    /// Beta for every entity.
    pub fn betas(&self) -> RiskResult<EntityValues> {
        self.metric_for_all(PerformanceMetric::Beta)
    }

    /// Alpha for every entity.
    pub fn alphas(&self) -> RiskResult<EntityValues> {
        self.metric_for_all(PerformanceMetric::Alpha)
    }

    /// Treynor ratio for every entity.
    pub fn treynor_ratio(&self) -> RiskResult<EntityValues> {
        self.metric_for_all(PerformanceMetric::Treynor)
    }

    /// Information ratio for every entity.
    pub fn information_ratios(&self) -> RiskResult<EntityValues> {
        self.metric_for_all(PerformanceMetric::InformationRatio)
    }

    /// Maximum drawdown for every entity.
    pub fn max_drawdowns(&self) -> RiskResult<EntityValues> {
        self.metric_for_all(PerformanceMetric::MaxDrawdown)
    }

    /// Benchmark mean and volatility at native frequency.
    pub fn benchmark_stats(&self) -> RiskResult<BenchmarkStats> {
        let benchmark = self
            .benchmark
            .ok_or_else(|| RiskError::invalid_input("no benchmark series supplied"))?;
        Ok(BenchmarkStats {
            name: benchmark.name().to_string(),
            mean: mean(benchmark.values())?,
            volatility: std_dev(benchmark.values())?,
            observations: benchmark.values().len(),
        })
    }

    /// Every metric for every entity.
    ///
    /// A metric that fails for an entity is recorded in
    /// [`PerformanceResult::skipped`] instead of failing the summary.
    pub fn summary(&self) -> RiskResult<PerformanceResult> {
        self.summaries.get_or_try_insert_with(
            self.portfolio.series_id(),
            self.risk_free.to_bits(),
            || Ok(self.compute_summary()),
        )
    }

    fn compute_summary(&self) -> PerformanceResult {
        let mut metrics = BTreeMap::new();
        let mut skipped = Vec::new();
        for entity in self.portfolio.entities() {
            let mut row = EntityPerformance::default();
            for metric in PerformanceMetric::ALL {
                match self.metric(metric, entity) {
                    Ok(value) => row.set(metric, value),
                    Err(err) => {
                        log::warn!("skipping {metric} for '{entity}': {err}");
                        skipped.push(SkippedMetric {
                            entity: entity.to_string(),
                            metric,
                            reason: err.to_string(),
                        });
                    }
                }
            }
            metrics.insert(entity.to_string(), row);
        }

        PerformanceResult {
            frequency: self.portfolio.frequency(),
            risk_free_rate: self.risk_free,
            metrics,
            benchmark: self.benchmark_stats().ok(),
            skipped,
        }
    }
}

fn beta_of(pair: &AlignedPair) -> RiskResult<f64> {
    let var_b = variance(&pair.right)?;
    if var_b < ZERO_TOLERANCE * ZERO_TOLERANCE {
        return Err(RiskError::division_by_zero("beta (zero benchmark variance)"));
    }
    Ok(covariance(&pair.left, &pair.right)? / var_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{constant_portfolio, dated, ramp_portfolio};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tailrisk_core::{ReturnSeries, Weights, PORTFOLIO};

    fn benchmark_for(portfolio: &Portfolio, scale: f64, shift: f64) -> BenchmarkSeries {
        let values = portfolio.returns().iter().map(|r| r * scale + shift).collect();
        BenchmarkSeries::new("BENCH", Frequency::Daily, portfolio.dates().to_vec(), values)
            .unwrap()
    }

    #[test]
    fn test_sharpe_zero_std() {
        let portfolio = constant_portfolio(30, 0.001);
        let engine = PerformanceEngine::new(&portfolio);
        assert!(matches!(
            engine.sharpe(PORTFOLIO),
            Err(RiskError::DivisionByZero { .. })
        ));
        assert!(engine.sharpe_ratio().is_err());
    }

    #[test]
    fn test_sharpe_annualization() {
        let portfolio = ramp_portfolio(60);
        let engine = PerformanceEngine::new(&portfolio).with_risk_free_rate(0.0001);
        let r = portfolio.returns();
        let expected = (mean(r).unwrap() - 0.0001) * 252.0 / (std_dev(r).unwrap() * 252f64.sqrt());
        assert_relative_eq!(engine.sharpe(PORTFOLIO).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_annual_risk_free_rate() {
        let portfolio = ramp_portfolio(30);
        let engine = PerformanceEngine::new(&portfolio).with_annual_risk_free_rate(0.0252);
        assert_relative_eq!(engine.risk_free_rate(), 0.0001, epsilon = 1e-15);
    }

    #[test]
    fn test_beta_alpha_of_linear_benchmark() {
        // portfolio = (bench - 0.001) / 2  =>  beta 0.5, alpha -0.0005
        let portfolio = ramp_portfolio(60);
        let bench = benchmark_for(&portfolio, 2.0, 0.001);
        let engine = PerformanceEngine::new(&portfolio).with_benchmark(&bench);
        assert_relative_eq!(engine.beta(PORTFOLIO).unwrap(), 0.5, epsilon = 1e-10);
        assert_relative_eq!(engine.alpha(PORTFOLIO).unwrap(), -0.0005, epsilon = 1e-10);

        let treynor = engine.treynor(PORTFOLIO).unwrap();
        let expected = mean(portfolio.returns()).unwrap() * 252.0 / 0.5;
        assert_relative_eq!(treynor, expected, epsilon = 1e-10);
    }

    #[test]
    fn test_insufficient_overlap() {
        let portfolio = ramp_portfolio(60);
        let dates: Vec<NaiveDate> = portfolio.dates()[..9].to_vec();
        let bench =
            BenchmarkSeries::new("BENCH", Frequency::Daily, dates, vec![0.001; 9]).unwrap();
        let engine = PerformanceEngine::new(&portfolio).with_benchmark(&bench);
        assert_eq!(
            engine.beta("A").unwrap_err(),
            RiskError::insufficient_overlap(10, 9)
        );
    }

    #[test]
    fn test_missing_benchmark() {
        let portfolio = ramp_portfolio(30);
        let engine = PerformanceEngine::new(&portfolio);
        assert!(matches!(
            engine.information_ratio(PORTFOLIO),
            Err(RiskError::InvalidInput { .. })
        ));
        assert!(engine.benchmark_stats().is_err());
    }

    #[test]
    fn test_information_ratio() {
        let portfolio = ramp_portfolio(60);
        let bench = benchmark_for(&portfolio, 1.0, 0.0);
        let engine = PerformanceEngine::new(&portfolio).with_benchmark(&bench);
        // identical series: zero tracking error
        assert!(matches!(
            engine.information_ratio(PORTFOLIO),
            Err(RiskError::DivisionByZero { .. })
        ));
        assert!(engine.information_ratio("A").is_ok());
    }

    #[test]
    fn test_max_drawdown_reference_path() {
        let prices = [100.0, 110.0, 90.0, 95.0, 120.0];
        let returns: Vec<f64> = prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        let series = ReturnSeries::new(
            Frequency::Daily,
            dated(returns.len()),
            vec![("X".into(), returns)],
        )
        .unwrap();
        let portfolio = Portfolio::new(Arc::new(series), Weights::new([("X", 1.0)]).unwrap())
            .unwrap();
        let engine = PerformanceEngine::new(&portfolio);
        assert_relative_eq!(
            engine.max_drawdown(PORTFOLIO).unwrap(),
            (110.0 - 90.0) / 110.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_summary_records_skips() {
        let portfolio = ramp_portfolio(60);
        let engine = PerformanceEngine::new(&portfolio);
        let summary = engine.summary().unwrap();
        assert_eq!(summary.metrics.len(), 3);
        assert!(summary.metrics[PORTFOLIO].sharpe.is_some());
        assert!(summary.metrics[PORTFOLIO].beta.is_none());
        // four benchmark metrics for each of three entities
        assert_eq!(summary.skipped.len(), 12);
        assert!(summary.benchmark.is_none());
    }

    #[test]
    fn test_summary_with_benchmark() {
        let portfolio = ramp_portfolio(60);
        let bench = benchmark_for(&portfolio, 2.0, 0.001);
        let summary = PerformanceEngine::new(&portfolio)
            .with_benchmark(&bench)
            .summary()
            .unwrap();
        assert!(summary.skipped.is_empty(), "{:?}", summary.skipped);
        assert_eq!(summary.benchmark.as_ref().unwrap().observations, 60);
    }
}
