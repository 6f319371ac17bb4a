//! Drawdown of a compounded wealth path.

use crate::error::{MathError, MathResult};

/// Compounds period returns into a wealth path that starts at 1.0.
///
/// The result has one more element than `returns`.
#[must_use]
pub fn wealth_path(returns: &[f64]) -> Vec<f64> {
    let mut path = Vec::with_capacity(returns.len() + 1);
    let mut wealth = 1.0;
    path.push(wealth);
    for r in returns {
        wealth *= 1.0 + r;
        path.push(wealth);
    }
    path
}

/// Maximum peak-to-trough relative decline of a value path, as a positive
/// fraction. Returns 0 for a path that never declines.
pub fn max_drawdown_from_path(path: &[f64]) -> MathResult<f64> {
    let first = *path
        .first()
        .ok_or_else(|| MathError::insufficient_data(1, 0))?;
    if !(first.is_finite() && first > 0.0) {
        return Err(MathError::invalid_input(format!(
            "path must start at a positive value, got {first}"
        )));
    }

    let mut peak = first;
    let mut worst = 0.0_f64;
    for &value in path {
        if !value.is_finite() || value < 0.0 {
            return Err(MathError::invalid_input(format!(
                "path values must be finite and non-negative, got {value}"
            )));
        }
        peak = peak.max(value);
        worst = worst.max((peak - value) / peak);
    }
    Ok(worst)
}

/// Maximum drawdown of the wealth path compounded from `returns`.
pub fn max_drawdown(returns: &[f64]) -> MathResult<f64> {
    if returns.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    max_drawdown_from_path(&wealth_path(returns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_path() {
        let dd = max_drawdown_from_path(&[100.0, 110.0, 90.0, 95.0, 120.0]).unwrap();
        assert_relative_eq!(dd, 20.0 / 110.0, epsilon = 1e-12);
    }

    #[test]
    fn test_from_returns_matches_path() {
        let path = [100.0, 110.0, 90.0, 95.0, 120.0];
        let returns: Vec<f64> = path.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        assert_relative_eq!(max_drawdown(&returns).unwrap(), 20.0 / 110.0, epsilon = 1e-12);
    }

    #[test]
    fn test_first_period_loss_counts() {
        assert_relative_eq!(max_drawdown(&[-0.1, 0.05]).unwrap(), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_monotonic_path() {
        assert_relative_eq!(max_drawdown(&[0.01, 0.02, 0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_wealth_path() {
        let p = wealth_path(&[0.1, -0.5]);
        assert_eq!(p.len(), 3);
        assert_relative_eq!(p[2], 0.55, epsilon = 1e-12);
    }
}
