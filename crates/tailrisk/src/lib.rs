//! # Tailrisk
//!
//! Portfolio tail-risk and performance analytics.
//!
//! This crate re-exports the engine crates under one name:
//!
//! - [`core`]: return series, weights, portfolios, frequency scaling
//! - [`math`]: sample statistics, quantiles, covariance factorization
//! - [`risk`]: dispersion, VaR, CVaR, performance and full assessments
//! - [`config`]: analysis configuration files
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use tailrisk::prelude::*;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let dates: Vec<_> = (0..60).map(|i| start + chrono::Days::new(i)).collect();
//! let eq: Vec<f64> = (0..60).map(|i| if i % 3 == 0 { -0.02 } else { 0.012 }).collect();
//! let bd: Vec<f64> = (0..60).map(|i| if i % 4 == 0 { 0.004 } else { -0.001 }).collect();
//! let series = ReturnSeries::new(
//!     Frequency::Daily,
//!     dates,
//!     vec![("EQ".into(), eq), ("BOND".into(), bd)],
//! )?;
//! let portfolio = Portfolio::new(Arc::new(series), Weights::equal(["EQ", "BOND"])?)?;
//!
//! let report = RiskAssessment::new(&portfolio, AssessmentSettings::default()).run()?;
//! assert_eq!(report.observations, 60);
//! assert_eq!(report.var.len(), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub use tailrisk_config as config;
pub use tailrisk_core as core;
pub use tailrisk_math as math;
pub use tailrisk_risk as risk;

/// Everything needed to build a portfolio and measure it.
pub mod prelude {
    pub use tailrisk_config::prelude::*;
    pub use tailrisk_core::prelude::*;
    pub use tailrisk_risk::prelude::*;
}
