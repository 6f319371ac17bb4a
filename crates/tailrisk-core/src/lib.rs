//! # Tailrisk Core
//!
//! Core types for the Tailrisk portfolio risk engine.
//!
//! This crate provides the validated inputs every engine reads:
//!
//! - **Types**: [`ReturnSeries`], [`Weights`], [`BenchmarkSeries`],
//!   [`ConfidenceLevel`], [`Frequency`]
//! - **Portfolio**: a series paired with weights and its derived return column
//! - **Scaling**: frequency and horizon scaling of periodic statistics
//!
//! ## Design Philosophy
//!
//! - **Validate Once**: inputs are checked at construction; engines never
//!   see NaN, misaligned dates or weights that do not sum to one
//! - **Immutable Inputs**: engines borrow series and weights read-only
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use tailrisk_core::prelude::*;
//!
//! let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
//! let series = ReturnSeries::new(
//!     Frequency::Daily,
//!     vec![d(2), d(3), d(4)],
//!     vec![
//!         ("EQ".to_string(), vec![0.01, -0.02, 0.005]),
//!         ("GOLD".to_string(), vec![0.0, 0.01, -0.004]),
//!     ],
//! )?;
//! let weights = Weights::new([("EQ", 0.6), ("GOLD", 0.4)])?;
//! let portfolio = Portfolio::new(Arc::new(series), weights)?;
//! assert_eq!(portfolio.returns().len(), 3);
//! # Ok::<(), tailrisk_core::CoreError>(())
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
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod portfolio;
pub mod scaling;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::portfolio::Portfolio;
    pub use crate::scaling::{annualize_return, annualize_vol, scale_to_horizon};
    pub use crate::types::{
        AlignedPair, BenchmarkSeries, ConfidenceLevel, Frequency, ReturnKind, ReturnSeries,
        SeriesId, Weights, PORTFOLIO,
    };
}

// Re-export commonly used types at crate root
pub use error::{CoreError, CoreResult};
pub use portfolio::Portfolio;
pub use types::{
    BenchmarkSeries, ConfidenceLevel, Frequency, ReturnKind, ReturnSeries, Weights, PORTFOLIO,
};
