//! Value at Risk (VaR) calculations.
//!
//! VaR is the loss not exceeded with probability `confidence` over one
//! period. Three interchangeable estimators implement [`VaREstimator`]:
//!
//! - [`HistoricalVaR`]: empirical quantile of realized returns
//! - [`ParametricVaR`]: normal approximation `-(mu + z_alpha * sigma)`
//! - [`MonteCarloVaR`]: empirical quantile of a simulated multivariate
//!   normal sample
//!
//! Each estimator produces a [`TailModel`]: the one-period loss per entity
//! plus the sample the tail was read from. [`VaREngine`] caches tail models,
//! scales them to a horizon and detects breaches. Expected Shortfall reuses
//! the same tail models (see [`crate::cvar`]).

mod engine;
mod historical;
mod monte_carlo;
mod parametric;

pub use engine::VaREngine;
pub use historical::HistoricalVaR;
pub use monte_carlo::{MonteCarloConfig, MonteCarloVaR};
pub use parametric::ParametricVaR;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use tailrisk_core::{ConfidenceLevel, Portfolio, PORTFOLIO};
use tailrisk_math::statistics::quantile;

use crate::error::{RiskError, RiskResult};
use crate::EntityValues;

/// VaR calculation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaRMethod {
    /// Historical simulation
    Historical,
    /// Parametric (variance-covariance)
    Parametric,
    /// Monte Carlo simulation
    MonteCarlo,
}

impl VaRMethod {
    /// All methods, in reporting order.
    pub const ALL: [VaRMethod; 3] = [
        VaRMethod::Historical,
        VaRMethod::Parametric,
        VaRMethod::MonteCarlo,
    ];

    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            VaRMethod::Historical => "historical",
            VaRMethod::Parametric => "parametric",
            VaRMethod::MonteCarlo => "monte_carlo",
        }
    }
}

impl fmt::Display for VaRMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VaRMethod {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "historical" => Ok(VaRMethod::Historical),
            "parametric" => Ok(VaRMethod::Parametric),
            "monte_carlo" | "montecarlo" => Ok(VaRMethod::MonteCarlo),
            other => Err(RiskError::invalid_input(format!(
                "unknown VaR method '{other}' (expected historical, parametric or monte_carlo)"
            ))),
        }
    }
}

/// Value at Risk result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaRResult {
    /// Method used for calculation.
    pub method: VaRMethod,
    /// Confidence level (e.g., 0.95 for 95%).
    pub confidence: ConfidenceLevel,
    /// Horizon in periods of the series frequency.
    pub horizon: u32,
    /// Non-negative loss magnitude per asset and for the portfolio.
    pub values: EntityValues,
}

impl VaRResult {
    /// Loss for one entity.
    #[must_use]
    pub fn get(&self, entity: &str) -> Option<f64> {
        self.values.get(entity).copied()
    }

    /// Loss for the portfolio.
    #[must_use]
    pub fn portfolio(&self) -> Option<f64> {
        self.get(PORTFOLIO)
    }
}

impl fmt::Display for VaRResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VaR({:.0}%, {}, {}p): {:.6}",
            self.confidence.value() * 100.0,
            self.method,
            self.horizon,
            self.portfolio().unwrap_or(f64::NAN)
        )
    }
}

/// One entity's slice of a [`TailModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct TailEntry {
    /// Asset name or "portfolio".
    pub entity: String,
    /// One-period loss magnitude, floored at 0.
    pub var: f64,
    /// Realized or simulated one-period returns the tail is measured on.
    pub samples: Vec<f64>,
}

impl TailEntry {
    /// Returns threshold `-var`.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        -self.var
    }
}

/// One-period VaR for every entity plus the samples it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct TailModel {
    method: VaRMethod,
    confidence: ConfidenceLevel,
    entries: Vec<TailEntry>,
}

impl TailModel {
    /// Creates a tail model from per-entity entries.
    #[must_use]
    pub fn new(method: VaRMethod, confidence: ConfidenceLevel, entries: Vec<TailEntry>) -> Self {
        Self {
            method,
            confidence,
            entries,
        }
    }

    /// Method that produced the model.
    #[must_use]
    pub fn method(&self) -> VaRMethod {
        self.method
    }

    /// Confidence level.
    #[must_use]
    pub fn confidence(&self) -> ConfidenceLevel {
        self.confidence
    }

    /// Entries in entity order (assets, then the portfolio).
    #[must_use]
    pub fn entries(&self) -> &[TailEntry] {
        &self.entries
    }

    /// Entry for one entity.
    #[must_use]
    pub fn entry(&self, entity: &str) -> Option<&TailEntry> {
        self.entries.iter().find(|e| e.entity == entity)
    }

    /// One-period losses keyed by entity.
    #[must_use]
    pub fn losses(&self) -> EntityValues {
        self.entries
            .iter()
            .map(|e| (e.entity.clone(), e.var))
            .collect()
    }
}

/// Strategy contract shared by all VaR methods.
///
/// Implementations read one-period returns from the portfolio and never
/// scale to a horizon; that is done once, by [`VaREngine`].
pub trait VaREstimator: Send + Sync {
    /// Method identifier.
    fn method(&self) -> VaRMethod;

    /// Computes the one-period tail model at `confidence`.
    fn tail_model(
        &self,
        portfolio: &Portfolio,
        confidence: ConfidenceLevel,
    ) -> RiskResult<TailModel>;
}

/// Loss at tail probability `alpha`: the negated empirical quantile,
/// floored at 0.
pub(crate) fn empirical_loss(samples: &[f64], alpha: f64) -> RiskResult<f64> {
    Ok((-quantile(samples, alpha)?).max(0.0))
}

pub(crate) fn ensure_horizon(horizon: u32) -> RiskResult<()> {
    if horizon == 0 {
        return Err(RiskError::invalid_input("horizon must be at least one period"));
    }
    Ok(())
}
