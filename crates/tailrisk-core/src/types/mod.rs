//! Domain types for portfolio risk analytics.
//!
//! - [`Frequency`]: sampling frequency of periodic returns
//! - [`ConfidenceLevel`]: confidence level for tail measures
//! - [`ReturnSeries`]: date-aligned per-asset return columns
//! - [`Weights`]: validated portfolio weights
//! - [`BenchmarkSeries`]: a dated benchmark return column

mod benchmark;
mod confidence;
mod frequency;
mod returns;
mod weights;

pub use benchmark::{AlignedPair, BenchmarkSeries};
pub use confidence::ConfidenceLevel;
pub use frequency::Frequency;
pub use returns::{ReturnKind, ReturnSeries, SeriesId, MIN_OBSERVATIONS, PORTFOLIO};
pub use weights::{Weights, WEIGHT_TOLERANCE};
