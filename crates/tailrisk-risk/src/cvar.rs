//! Conditional VaR (Expected Shortfall).
//!
//! CVaR is the average loss on the observations that lie strictly beyond the
//! VaR threshold of a chosen method. The threshold and the sample come from
//! the same [`TailModel`](crate::var::TailModel): realized returns for the
//! historical and parametric methods, simulated returns for Monte Carlo.
//! Because every averaged return is strictly below `-VaR`, the result is
//! always strictly greater than the matching VaR.

use serde::{Deserialize, Serialize};
use std::fmt;

use tailrisk_core::scaling::scale_to_horizon;
use tailrisk_core::{ConfidenceLevel, PORTFOLIO};

use crate::cache::ResultCache;
use crate::error::{RiskError, RiskResult};
use crate::var::{ensure_horizon, TailEntry, VaREngine, VaRMethod};
use crate::EntityValues;

/// Expected Shortfall result, shaped like [`VaRResult`](crate::var::VaRResult).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CVaRResult {
    /// VaR method the threshold came from.
    pub method: VaRMethod,
    /// Confidence level.
    pub confidence: ConfidenceLevel,
    /// Horizon in periods.
    pub horizon: u32,
    /// Expected loss beyond VaR per entity.
    pub values: EntityValues,
    /// The VaR thresholds used, at the same horizon.
    pub var: EntityValues,
}

impl CVaRResult {
    /// CVaR for one entity.
    #[must_use]
    pub fn get(&self, entity: &str) -> Option<f64> {
        self.values.get(entity).copied()
    }

    /// CVaR for the portfolio.
    #[must_use]
    pub fn portfolio(&self) -> Option<f64> {
        self.get(PORTFOLIO)
    }
}

impl fmt::Display for CVaRResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CVaR({:.0}%, {}, {}p): {:.6}",
            self.confidence.value() * 100.0,
            self.method,
            self.horizon,
            self.portfolio().unwrap_or(f64::NAN)
        )
    }
}

/// Mean loss of the samples strictly below the entry's threshold.
fn tail_mean_loss(entry: &TailEntry) -> RiskResult<f64> {
    let threshold = entry.threshold();
    let (sum, count) = entry
        .samples
        .iter()
        .filter(|r| **r < threshold)
        .fold((0.0, 0usize), |(s, c), r| (s + r, c + 1));
    if count == 0 {
        return Err(RiskError::empty_tail(&entry.entity));
    }
    Ok(-(sum / count as f64))
}

/// Derives Expected Shortfall from a [`VaREngine`] by delegation.
#[derive(Debug)]
pub struct CVaREngine<'a> {
    var: VaREngine<'a>,
    results: ResultCache<(VaRMethod, u64, u32), CVaRResult>,
}

impl<'a> CVaREngine<'a> {
    /// Wraps a VaR engine; its estimator settings and cache are reused.
    #[must_use]
    pub fn new(var: VaREngine<'a>) -> Self {
        Self {
            var,
            results: ResultCache::new(),
        }
    }

    /// The underlying VaR engine.
    #[must_use]
    pub fn var_engine(&self) -> &VaREngine<'a> {
        &self.var
    }

    /// Expected Shortfall for every entity, scaled to `horizon` periods.
    ///
    /// Fails with `EmptyTailSet` when no sample of some entity lies strictly
    /// below its VaR threshold.
    pub fn estimate(
        &self,
        method: VaRMethod,
        confidence: ConfidenceLevel,
        horizon: u32,
    ) -> RiskResult<CVaRResult> {
        ensure_horizon(horizon)?;
        let portfolio = self.var.portfolio();
        self.results.get_or_try_insert_with(
            portfolio.series_id(),
            (method, confidence.key(), horizon),
            || {
                let model = self.var.tail_model(method, confidence)?;
                let mut values = EntityValues::new();
                let mut var = EntityValues::new();
                for entry in model.entries() {
                    let cvar = tail_mean_loss(entry)?;
                    values.insert(entry.entity.clone(), scale_to_horizon(cvar, horizon));
                    var.insert(entry.entity.clone(), scale_to_horizon(entry.var, horizon));
                }
                Ok(CVaRResult {
                    method,
                    confidence,
                    horizon,
                    values,
                    var,
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
    ) -> RiskResult<Vec<CVaRResult>> {
        horizons
            .iter()
            .map(|&h| self.estimate(method, confidence, h))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{five_point_portfolio, ramp_portfolio};
    use crate::var::{HistoricalVaR, MonteCarloConfig};
    use approx::assert_relative_eq;

    #[test]
    fn test_five_point_cvar() {
        let portfolio = five_point_portfolio();
        let engine = CVaREngine::new(
            VaREngine::new(&portfolio).with_historical(HistoricalVaR::new(2).unwrap()),
        );
        let result = engine
            .estimate(VaRMethod::Historical, ConfidenceLevel::P95, 1)
            .unwrap();
        // only -0.005 lies below -0.004
        assert_relative_eq!(result.portfolio().unwrap(), 0.005, epsilon = 1e-12);
        assert_relative_eq!(result.var[PORTFOLIO], 0.004, epsilon = 1e-9);
    }

    #[test]
    fn test_cvar_exceeds_var_every_method() {
        let portfolio = ramp_portfolio(120);
        let engine = CVaREngine::new(
            VaREngine::new(&portfolio).with_monte_carlo(MonteCarloConfig::new(4000).with_seed(5)),
        );
        for method in VaRMethod::ALL {
            for horizon in [1, 5, 21] {
                let result = engine
                    .estimate(method, ConfidenceLevel::P95, horizon)
                    .unwrap();
                for (entity, cvar) in &result.values {
                    assert!(*cvar > result.var[entity], "{method} {entity} h={horizon}");
                }
            }
        }
    }

    #[test]
    fn test_empty_tail() {
        // a flat positive series floors VaR at 0 and has no negative return
        let portfolio = crate::test_support::constant_portfolio(30, 0.001);
        let engine = CVaREngine::new(VaREngine::new(&portfolio));
        let err = engine
            .estimate(VaRMethod::Historical, ConfidenceLevel::P95, 1)
            .unwrap_err();
        assert!(matches!(err, RiskError::EmptyTailSet { .. }));
    }

    #[test]
    fn test_horizon_scaling() {
        let portfolio = ramp_portfolio(60);
        let engine = CVaREngine::new(VaREngine::new(&portfolio));
        let one = engine
            .estimate(VaRMethod::Historical, ConfidenceLevel::P95, 1)
            .unwrap();
        let many = engine
            .estimate_horizons(VaRMethod::Historical, ConfidenceLevel::P95, &[4])
            .unwrap();
        assert_relative_eq!(
            many[0].portfolio().unwrap(),
            2.0 * one.portfolio().unwrap(),
            epsilon = 1e-12
        );
    }
}
