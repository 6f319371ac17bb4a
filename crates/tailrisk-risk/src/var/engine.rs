//! VaR engine: strategy dispatch, caching, horizon scaling and breaches.

use chrono::NaiveDate;
use std::sync::Arc;

use tailrisk_core::scaling::scale_to_horizon;
use tailrisk_core::{ConfidenceLevel, Portfolio};

use super::{
    ensure_horizon, HistoricalVaR, MonteCarloConfig, MonteCarloVaR, ParametricVaR, TailModel,
    VaREstimator, VaRMethod, VaRResult,
};
use crate::cache::ResultCache;
use crate::error::{RiskError, RiskResult};

type TailKey = (VaRMethod, u64);
type ResultKey = (VaRMethod, u64, u32);

/// Computes VaR for every entity of a portfolio.
///
/// Tail models are computed once per `(method, confidence)` and scaled to
/// any horizon with the square-root-of-time rule,
/// `VaR(h) = VaR(1) * sqrt(h)`. This assumes i.i.d. returns and is not
/// refined for long horizons.
#[derive(Debug)]
pub struct VaREngine<'a> {
    portfolio: &'a Portfolio,
    historical: HistoricalVaR,
    parametric: ParametricVaR,
    monte_carlo: MonteCarloVaR,
    tails: ResultCache<TailKey, Arc<TailModel>>,
    results: ResultCache<ResultKey, VaRResult>,
}

impl<'a> VaREngine<'a> {
    /// Creates an engine with default estimator settings.
    #[must_use]
    pub fn new(portfolio: &'a Portfolio) -> Self {
        Self {
            portfolio,
            historical: HistoricalVaR::default(),
            parametric: ParametricVaR,
            monte_carlo: MonteCarloVaR::default(),
            tails: ResultCache::new(),
            results: ResultCache::new(),
        }
    }

    /// Replaces the historical estimator (e.g. to change its minimum sample).
    #[must_use]
    pub fn with_historical(mut self, historical: HistoricalVaR) -> Self {
        self.historical = historical;
        self.clear_cache();
        self
    }

    /// Replaces the Monte Carlo settings.
    #[must_use]
    pub fn with_monte_carlo(mut self, config: MonteCarloConfig) -> Self {
        self.monte_carlo = MonteCarloVaR::new(config);
        self.clear_cache();
        self
    }

    /// The portfolio being measured.
    #[must_use]
    pub fn portfolio(&self) -> &'a Portfolio {
        self.portfolio
    }

    /// Points the engine at another portfolio and drops every cached result.
    pub fn rebind(&mut self, portfolio: &'a Portfolio) {
        self.portfolio = portfolio;
        self.clear_cache();
    }

    /// Drops every cached tail model and result.
    pub fn clear_cache(&self) {
        self.tails.clear();
        self.results.clear();
    }

    /// The estimator behind `method`.
    #[must_use]
    pub fn estimator(&self, method: VaRMethod) -> &dyn VaREstimator {
        match method {
            VaRMethod::Historical => &self.historical,
            VaRMethod::Parametric => &self.parametric,
            VaRMethod::MonteCarlo => &self.monte_carlo,
        }
    }

    /// One-period tail model for `(method, confidence)`, cached.
    pub fn tail_model(
        &self,
        method: VaRMethod,
        confidence: ConfidenceLevel,
    ) -> RiskResult<Arc<TailModel>> {
        self.tails.get_or_try_insert_with(
            self.portfolio.series_id(),
            (method, confidence.key()),
            || {
                log::debug!("computing {method} tail model at {confidence}");
                self.estimator(method)
                    .tail_model(self.portfolio, confidence)
                    .map(Arc::new)
            },
        )
    }

    /// VaR for every entity at `confidence`, scaled to `horizon` periods.
    pub fn estimate(
        &self,
        method: VaRMethod,
        confidence: ConfidenceLevel,
        horizon: u32,
    ) -> RiskResult<VaRResult> {
        ensure_horizon(horizon)?;
        self.results.get_or_try_insert_with(
            self.portfolio.series_id(),
            (method, confidence.key(), horizon),
            || {
                let model = self.tail_model(method, confidence)?;
                let values = model
                    .entries()
                    .iter()
                    .map(|e| (e.entity.clone(), scale_to_horizon(e.var, horizon)))
                    .collect();
                Ok(VaRResult {
                    method,
                    confidence,
                    horizon,
                    values,
                })
            },
        )
    }

    /// One result per horizon, in the order given.
    pub fn estimate_horizons(
        &self,
        method: VaRMethod,
        confidence: ConfidenceLevel,
        horizons: &[u32],
    ) -> RiskResult<Vec<VaRResult>> {
        horizons
            .iter()
            .map(|&h| self.estimate(method, confidence, h))
            .collect()
    }

    /// Dates on which `entity`'s realized return fell below `-var`.
    ///
    /// `var` is a loss magnitude; its sign is ignored. The result is in date
    /// order and may be empty.
    pub fn breaches(&self, entity: &str, var: f64) -> RiskResult<Vec<NaiveDate>> {
        let returns = self
            .portfolio
            .returns_of(entity)
            .ok_or_else(|| RiskError::unknown_entity(entity))?;
        let threshold = -var.abs();
        Ok(self
            .portfolio
            .dates()
            .iter()
            .zip(returns)
            .filter(|(_, r)| **r < threshold)
            .map(|(d, _)| *d)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{five_point_portfolio, ramp_portfolio};
    use approx::assert_relative_eq;
    use tailrisk_core::PORTFOLIO;

    fn lenient(portfolio: &Portfolio) -> VaREngine<'_> {
        VaREngine::new(portfolio).with_historical(HistoricalVaR::new(2).unwrap())
    }

    #[test]
    fn test_horizon_scaling() {
        let portfolio = ramp_portfolio(80);
        let engine = VaREngine::new(&portfolio)
            .with_monte_carlo(MonteCarloConfig::new(2000).with_seed(3));
        for method in VaRMethod::ALL {
            let one = engine.estimate(method, ConfidenceLevel::P95, 1).unwrap();
            let ten = engine.estimate(method, ConfidenceLevel::P95, 10).unwrap();
            for (entity, v) in &one.values {
                assert_relative_eq!(ten.values[entity], v * 10f64.sqrt(), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_estimate_horizons_order() {
        let portfolio = ramp_portfolio(40);
        let engine = VaREngine::new(&portfolio);
        let results = engine
            .estimate_horizons(VaRMethod::Parametric, ConfidenceLevel::P95, &[1, 21, 252])
            .unwrap();
        let horizons: Vec<u32> = results.iter().map(|r| r.horizon).collect();
        assert_eq!(horizons, vec![1, 21, 252]);
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let portfolio = ramp_portfolio(40);
        let engine = VaREngine::new(&portfolio);
        assert!(engine
            .estimate(VaRMethod::Historical, ConfidenceLevel::P95, 0)
            .is_err());
    }

    #[test]
    fn test_results_are_cached() {
        let portfolio = ramp_portfolio(40);
        let engine = VaREngine::new(&portfolio)
            .with_monte_carlo(MonteCarloConfig::new(500));
        let first = engine
            .estimate(VaRMethod::MonteCarlo, ConfidenceLevel::P95, 1)
            .unwrap();
        let again = engine
            .estimate(VaRMethod::MonteCarlo, ConfidenceLevel::P95, 1)
            .unwrap();
        // unseeded simulation: equality only holds because of the cache
        assert_eq!(first, again);
    }

    #[test]
    fn test_rebind_invalidates() {
        let five = five_point_portfolio();
        let ramp = ramp_portfolio(40);
        let mut engine = lenient(&five);
        let before = engine
            .estimate(VaRMethod::Historical, ConfidenceLevel::P95, 1)
            .unwrap();
        engine.rebind(&ramp);
        let after = engine
            .estimate(VaRMethod::Historical, ConfidenceLevel::P95, 1)
            .unwrap();
        assert_ne!(before.values.len(), 0);
        assert!(after.get("A").is_some());
        assert_ne!(before.portfolio(), after.portfolio());
    }

    #[test]
    fn test_breaches() {
        let portfolio = five_point_portfolio();
        let engine = lenient(&portfolio);
        let var = engine
            .estimate(VaRMethod::Historical, ConfidenceLevel::P95, 1)
            .unwrap()
            .portfolio()
            .unwrap();
        // only the -0.005 day lies below -0.004
        let breaches = engine.breaches(PORTFOLIO, var).unwrap();
        assert_eq!(breaches, vec![portfolio.dates()[1]]);

        assert!(engine.breaches(PORTFOLIO, 1.0).unwrap().is_empty());
        assert!(engine.breaches("missing", var).is_err());
    }
}
