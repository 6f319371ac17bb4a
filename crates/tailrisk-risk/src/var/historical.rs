//! Historical VaR calculation.

use tailrisk_core::{ConfidenceLevel, Portfolio};

use super::{empirical_loss, TailEntry, TailModel, VaREstimator, VaRMethod};
use crate::error::{RiskError, RiskResult};

/// Historical simulation: the loss is the negated empirical quantile of
/// realized one-period returns at `alpha = 1 - confidence`.
///
/// The quantile interpolates linearly between the order statistics around
/// rank `(n - 1) * alpha`. A short history gives a noisy tail, so the
/// estimator refuses samples smaller than `min_observations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoricalVaR {
    min_observations: usize,
}

impl HistoricalVaR {
    /// Default minimum sample size.
    pub const DEFAULT_MIN_OBSERVATIONS: usize = 20;

    /// Creates an estimator with a custom minimum sample size (at least 2).
    pub fn new(min_observations: usize) -> RiskResult<Self> {
        if min_observations < 2 {
            return Err(RiskError::invalid_input(format!(
                "historical VaR needs a minimum sample of at least 2, got {min_observations}"
            )));
        }
        Ok(Self { min_observations })
    }

    /// Minimum sample size.
    #[must_use]
    pub fn min_observations(&self) -> usize {
        self.min_observations
    }
}

impl Default for HistoricalVaR {
    fn default() -> Self {
        Self {
            min_observations: Self::DEFAULT_MIN_OBSERVATIONS,
        }
    }
}

impl VaREstimator for HistoricalVaR {
    fn method(&self) -> VaRMethod {
        VaRMethod::Historical
    }

    fn tail_model(
        &self,
        portfolio: &Portfolio,
        confidence: ConfidenceLevel,
    ) -> RiskResult<TailModel> {
        if portfolio.len() < self.min_observations {
            return Err(RiskError::insufficient_data(
                self.min_observations,
                portfolio.len(),
            ));
        }

        let alpha = confidence.alpha();
        let entries = portfolio
            .entity_returns()
            .map(|(entity, returns)| {
                Ok(TailEntry {
                    entity: entity.to_string(),
                    var: empirical_loss(returns, alpha)?,
                    samples: returns.to_vec(),
                })
            })
            .collect::<RiskResult<Vec<_>>>()?;

        Ok(TailModel::new(VaRMethod::Historical, confidence, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{five_point_portfolio, ramp_portfolio};
    use approx::assert_relative_eq;
    use tailrisk_core::PORTFOLIO;

    #[test]
    fn test_five_point_scenario() {
        let portfolio = five_point_portfolio();
        let model = HistoricalVaR::new(5)
            .unwrap()
            .tail_model(&portfolio, ConfidenceLevel::P95)
            .unwrap();

        // sorted portfolio: [-0.005, 0, 0.0025, 0.0025, 0.005]; h = 0.2
        let expected = -(-0.005 + 0.2 * (0.0 - -0.005));
        assert_relative_eq!(
            model.entry(PORTFOLIO).unwrap().var,
            expected,
            epsilon = 1e-9
        );
        // A sorted: [-0.02, -0.01, 0.005, 0.01, 0.015]
        assert_relative_eq!(
            model.entry("A").unwrap().var,
            0.02 - 0.2 * 0.01,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_default_minimum() {
        let err = HistoricalVaR::default()
            .tail_model(&five_point_portfolio(), ConfidenceLevel::P95)
            .unwrap_err();
        assert_eq!(err, RiskError::insufficient_data(20, 5));
        assert!(HistoricalVaR::new(1).is_err());
    }

    #[test]
    fn test_samples_are_realized_returns() {
        let portfolio = ramp_portfolio(40);
        let model = HistoricalVaR::default()
            .tail_model(&portfolio, ConfidenceLevel::P95)
            .unwrap();
        assert_eq!(model.entry(PORTFOLIO).unwrap().samples, portfolio.returns());
        assert_eq!(model.entries().len(), 3);
    }
}
