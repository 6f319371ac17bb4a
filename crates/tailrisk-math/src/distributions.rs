//! Standard normal distribution helpers.
//!
//! Thin wrappers over `statrs` so the risk engines do not depend on it
//! directly and share one validation path.

use statrs::distribution::{Continuous, ContinuousCDF, Normal};

use crate::error::{MathError, MathResult};

fn standard_normal() -> MathResult<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| MathError::invalid_input(e.to_string()))
}

/// Inverse standard normal CDF `z_p` for `p` in (0, 1).
///
/// For example `standard_normal_quantile(0.05)` is about `-1.644854`.
pub fn standard_normal_quantile(p: f64) -> MathResult<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(MathError::invalid_input(format!(
            "normal quantile probability must be in (0, 1), got {p}"
        )));
    }
    Ok(standard_normal()?.inverse_cdf(p))
}

/// Standard normal CDF.
pub fn normal_cdf(x: f64) -> MathResult<f64> {
    Ok(standard_normal()?.cdf(x))
}

/// Standard normal density.
pub fn normal_pdf(x: f64) -> MathResult<f64> {
    Ok(standard_normal()?.pdf(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_quantile_reference_values() {
        assert_abs_diff_eq!(standard_normal_quantile(0.05).unwrap(), -1.644_853_627, epsilon = 1e-6);
        assert_abs_diff_eq!(standard_normal_quantile(0.01).unwrap(), -2.326_347_874, epsilon = 1e-6);
        assert_abs_diff_eq!(standard_normal_quantile(0.10).unwrap(), -1.281_551_566, epsilon = 1e-6);
        assert_abs_diff_eq!(standard_normal_quantile(0.5).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_quantile_inverts_cdf() {
        for p in [0.01, 0.025, 0.05, 0.075, 0.10] {
            let z = standard_normal_quantile(p).unwrap();
            assert_abs_diff_eq!(normal_cdf(z).unwrap(), p, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_pdf_at_zero() {
        let expected = 1.0 / (2.0 * std::f64::consts::PI).sqrt();
        assert_abs_diff_eq!(normal_pdf(0.0).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_quantile_domain() {
        assert!(standard_normal_quantile(0.0).is_err());
        assert!(standard_normal_quantile(1.0).is_err());
        assert!(standard_normal_quantile(f64::NAN).is_err());
    }
}
