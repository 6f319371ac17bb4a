//! Frequency scaling of periodic statistics.
//!
//! Means and variances scale linearly with the number of periods; volatility
//! and tail losses scale with the square root of time. All functions are pure.

use crate::error::CoreResult;
use crate::types::Frequency;

/// Annualizes a periodic mean: `mean * periods_per_year`.
#[must_use]
pub fn annualize_return(periodic_mean: f64, periods_per_year: u32) -> f64 {
    periodic_mean * f64::from(periods_per_year)
}

/// Annualizes a periodic standard deviation: `std * sqrt(periods_per_year)`.
#[must_use]
pub fn annualize_vol(periodic_std: f64, periods_per_year: u32) -> f64 {
    periodic_std * f64::from(periods_per_year).sqrt()
}

/// Annualizes a periodic variance: `variance * periods_per_year`.
#[must_use]
pub fn annualize_variance(periodic_variance: f64, periods_per_year: u32) -> f64 {
    periodic_variance * f64::from(periods_per_year)
}

/// Looks up periods-per-year for a frequency tag such as `"daily"`.
///
/// Fails with `InvalidFrequency` for unrecognized tags.
pub fn periods_per_year(tag: &str) -> CoreResult<u32> {
    Ok(tag.parse::<Frequency>()?.periods_per_year())
}

/// Number of `from` periods contained in one `to` period.
///
/// For daily data rescaled to yearly this is 252; for yearly data rescaled to
/// daily it is 1/252.
#[must_use]
pub fn period_ratio(from: Frequency, to: Frequency) -> f64 {
    f64::from(from.periods_per_year()) / f64::from(to.periods_per_year())
}

/// Rescales a mean observed at `from` frequency to `to` frequency (linear rule).
#[must_use]
pub fn rescale_mean(value: f64, from: Frequency, to: Frequency) -> f64 {
    value * period_ratio(from, to)
}

/// Rescales a variance observed at `from` frequency to `to` frequency (linear rule).
#[must_use]
pub fn rescale_variance(value: f64, from: Frequency, to: Frequency) -> f64 {
    value * period_ratio(from, to)
}

/// Rescales a volatility observed at `from` frequency to `to` frequency
/// (square-root-of-time rule).
#[must_use]
pub fn rescale_vol(value: f64, from: Frequency, to: Frequency) -> f64 {
    value * period_ratio(from, to).sqrt()
}

/// Scales a one-period tail loss to `horizon` periods: `loss * sqrt(horizon)`.
///
/// This is the square-root-of-time rule and assumes i.i.d. returns; it is an
/// approximation that does not become more accurate for longer horizons.
#[must_use]
pub fn scale_to_horizon(one_period_loss: f64, horizon: u32) -> f64 {
    one_period_loss * f64::from(horizon).sqrt()
}
