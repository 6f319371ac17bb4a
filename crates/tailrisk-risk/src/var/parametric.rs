//! Parametric (variance-covariance) VaR.

use tailrisk_core::{ConfidenceLevel, Portfolio};
use tailrisk_math::distributions::standard_normal_quantile;
use tailrisk_math::statistics::{mean, std_dev};

use super::{TailEntry, TailModel, VaREstimator, VaRMethod};
use crate::error::RiskResult;

/// Normal approximation: `VaR = -(mu + z_alpha * sigma)`, floored at 0.
///
/// `mu` and `sigma` are the sample mean and Bessel-corrected standard
/// deviation of each entity's returns; `z_alpha` is the standard normal
/// quantile at `alpha = 1 - confidence`. The realized returns are kept as
/// the tail sample for Expected Shortfall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParametricVaR;

impl ParametricVaR {
    /// Creates the estimator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// One-period loss for given moments.
    pub fn loss(mu: f64, sigma: f64, confidence: ConfidenceLevel) -> RiskResult<f64> {
        let z = standard_normal_quantile(confidence.alpha())?;
        Ok((-(mu + z * sigma)).max(0.0))
    }
}

impl VaREstimator for ParametricVaR {
    fn method(&self) -> VaRMethod {
        VaRMethod::Parametric
    }

    fn tail_model(
        &self,
        portfolio: &Portfolio,
        confidence: ConfidenceLevel,
    ) -> RiskResult<TailModel> {
        let entries = portfolio
            .entity_returns()
            .map(|(entity, returns)| {
                let var = Self::loss(mean(returns)?, std_dev(returns)?, confidence)?;
                Ok(TailEntry {
                    entity: entity.to_string(),
                    var,
                    samples: returns.to_vec(),
                })
            })
            .collect::<RiskResult<Vec<_>>>()?;

        Ok(TailModel::new(VaRMethod::Parametric, confidence, entries))
    }
}
