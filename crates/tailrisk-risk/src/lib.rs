//! # Tailrisk Risk
//!
//! Tail-risk and performance engines for fixed-weight multi-asset
//! portfolios.
//!
//! This crate provides:
//!
//! - **Dispersion**: mean, variance, volatility, rolling volatility,
//!   downside deviation, covariance/correlation matrices
//! - **VaR**: historical, parametric and Monte Carlo estimators behind one
//!   trait, horizon scaling, breach detection
//! - **CVaR**: Expected Shortfall derived from any VaR estimator
//! - **Performance**: Sharpe, Sortino, beta, alpha, Treynor, information
//!   ratio, maximum drawdown
//! - **Assessment**: every engine run into one serializable report
//!
//! Engines borrow a [`Portfolio`](tailrisk_core::Portfolio) read-only and
//! own nothing but their result caches. Every result is keyed by entity:
//! each asset name plus `"portfolio"`.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::{Days, NaiveDate};
//! use tailrisk_core::prelude::*;
//! use tailrisk_risk::prelude::*;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let dates: Vec<_> = (0..40).map(|i| start + Days::new(i)).collect();
//! let a: Vec<f64> = (0..40).map(|i| 0.01 * ((i * 7 % 11) as f64 - 5.0) / 5.0).collect();
//! let b: Vec<f64> = (0..40).map(|i| 0.008 * ((i * 5 % 13) as f64 - 6.0) / 6.0).collect();
//! let series = ReturnSeries::new(Frequency::Daily, dates, vec![("A".into(), a), ("B".into(), b)])?;
//! let portfolio = Portfolio::new(Arc::new(series), Weights::new([("A", 0.5), ("B", 0.5)])?)?;
//!
//! let var = VaREngine::new(&portfolio);
//! let result = var.estimate(VaRMethod::Historical, ConfidenceLevel::P95, 1)?;
//! assert!(result.portfolio().unwrap() >= 0.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::uninlined_format_args)]

pub mod assessment;
pub mod cache;
pub mod cvar;
pub mod dispersion;
pub mod error;
pub mod parallel;
pub mod performance;
pub mod var;

#[cfg(test)]
pub(crate) mod test_support;

/// Values keyed by entity: each asset name plus `"portfolio"`.
pub type EntityValues = std::collections::BTreeMap<String, f64>;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::assessment::{
        AssessmentReport, AssessmentSettings, BreachSummary, RiskAssessment,
    };
    pub use crate::cvar::{CVaREngine, CVaRResult};
    pub use crate::dispersion::{
        AssetMatrix, DispersionEngine, DistributionStats, SerialCorrelation,
    };
    pub use crate::error::{RiskError, RiskResult};
    pub use crate::performance::{
        PerformanceEngine, PerformanceMetric, PerformanceResult, SkippedMetric,
    };
    pub use crate::var::{
        HistoricalVaR, MonteCarloConfig, MonteCarloVaR, ParametricVaR, VaREngine, VaREstimator,
        VaRMethod, VaRResult,
    };
    pub use crate::EntityValues;
}

pub use error::{RiskError, RiskResult};
