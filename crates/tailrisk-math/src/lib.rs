//! # Tailrisk Math
//!
//! Numerical building blocks for the Tailrisk portfolio risk engine.
//!
//! This crate provides:
//!
//! - **Statistics**: moments, empirical quantiles, rolling volatility,
//!   drawdown, autocorrelation and the Ljung-Box test
//! - **Distributions**: standard normal quantile, CDF and density
//! - **Linear Algebra**: covariance/correlation matrices and PSD
//!   factorization
//!
//! All functions take plain `&[f64]` slices and return [`MathResult`];
//! nothing here knows about assets, dates or portfolios.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::uninlined_format_args)]

pub mod distributions;
pub mod error;
pub mod linear_algebra;
pub mod statistics;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::distributions::{normal_cdf, normal_pdf, standard_normal_quantile};
    pub use crate::error::{MathError, MathResult};
    pub use crate::linear_algebra::{
        correlation_from_covariance, covariance_matrix, factorize_psd, is_positive_semi_definite,
        is_symmetric,
    };
    pub use crate::statistics::{
        autocorrelation, correlation, covariance, downside_deviation, excess_kurtosis,
        ljung_box, max_drawdown, mean, quantile, quantile_sorted, rolling_std, skewness, std_dev,
        variance, LjungBox,
    };
}

pub use error::{MathError, MathResult};
