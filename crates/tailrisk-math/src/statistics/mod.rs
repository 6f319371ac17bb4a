//! Descriptive statistics over return samples.
//!
//! - [`moments`]: mean, sample variance, covariance, correlation, skewness,
//!   kurtosis, downside deviation
//! - [`quantile`]: linearly interpolated empirical quantiles
//! - [`rolling`]: sliding-window standard deviation
//! - [`drawdown`]: wealth paths and maximum drawdown
//! - [`autocorrelation`]: sample autocorrelation and the Ljung-Box test

pub mod autocorrelation;
pub mod drawdown;
pub mod moments;
pub mod quantile;
pub mod rolling;

pub use autocorrelation::{autocorrelation, ljung_box, LjungBox};
pub use drawdown::{max_drawdown, max_drawdown_from_path, wealth_path};
pub use moments::{
    correlation, covariance, downside_deviation, excess_kurtosis, mean, skewness, std_dev,
    variance, ZERO_TOLERANCE,
};
pub use quantile::{quantile, quantile_sorted, sorted};
pub use rolling::{rolling_std, RollingStd};
