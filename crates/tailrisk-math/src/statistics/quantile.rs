//! Empirical quantiles.
//!
//! Quantiles use linear interpolation between the two order statistics that
//! bracket the 0-based rank `h = (n - 1) * p` (Hyndman-Fan definition 7, the
//! default of NumPy and pandas):
//!
//! ```text
//! q(p) = x[floor(h)] + (h - floor(h)) * (x[floor(h) + 1] - x[floor(h)])
//! ```
//!
//! The rule is continuous and non-decreasing in `p`, returns the sample
//! minimum at `p = 0` and the maximum at `p = 1`.

use crate::error::{MathError, MathResult};

/// Returns a sorted copy of `values` (ascending, total order).
#[must_use]
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Quantile of an unsorted sample.
pub fn quantile(values: &[f64], p: f64) -> MathResult<f64> {
    quantile_sorted(&sorted(values), p)
}

/// Quantile of a sample already sorted in ascending order.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> MathResult<f64> {
    if sorted.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(MathError::invalid_input(format!(
            "quantile probability must be in [0, 1], got {p}"
        )));
    }

    let n = sorted.len();
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = h - lo as f64;
    Ok(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}
