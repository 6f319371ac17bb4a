//! Sample moments and co-moments.

use crate::error::{MathError, MathResult};

/// Standard deviations below this are treated as zero.
pub const ZERO_TOLERANCE: f64 = 1e-12;

/// Arithmetic mean. Requires at least one observation.
pub fn mean(values: &[f64]) -> MathResult<f64> {
    if values.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance with Bessel's correction (divides by `n - 1`).
pub fn variance(values: &[f64]) -> MathResult<f64> {
    let n = values.len();
    if n < 2 {
        return Err(MathError::insufficient_data(2, n));
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    Ok(ss / (n - 1) as f64)
}

/// Sample standard deviation with Bessel's correction.
pub fn std_dev(values: &[f64]) -> MathResult<f64> {
    variance(values).map(f64::sqrt)
}

/// Sample covariance of two equally long samples (divides by `n - 1`).
pub fn covariance(x: &[f64], y: &[f64]) -> MathResult<f64> {
    if x.len() != y.len() {
        return Err(MathError::DimensionMismatch {
            rows1: x.len(),
            cols1: 1,
            rows2: y.len(),
            cols2: 1,
        });
    }
    let n = x.len();
    if n < 2 {
        return Err(MathError::insufficient_data(2, n));
    }
    let mx = mean(x)?;
    let my = mean(y)?;
    let s: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
    Ok(s / (n - 1) as f64)
}

/// Pearson correlation.
///
/// Fails with `DivisionByZero` when either sample has zero dispersion.
pub fn correlation(x: &[f64], y: &[f64]) -> MathResult<f64> {
    let cov = covariance(x, y)?;
    let sx = std_dev(x)?;
    let sy = std_dev(y)?;
    let denom = sx * sy;
    if sx < ZERO_TOLERANCE || sy < ZERO_TOLERANCE {
        return Err(MathError::division_by_zero("correlation", denom));
    }
    Ok((cov / denom).clamp(-1.0, 1.0))
}

/// Bias-adjusted sample skewness (adjusted Fisher-Pearson, as reported by
/// most statistics packages). Requires three observations.
pub fn skewness(values: &[f64]) -> MathResult<f64> {
    let n = values.len();
    if n < 3 {
        return Err(MathError::insufficient_data(3, n));
    }
    let (m2, m3, _) = central_moments(values)?;
    if m2.sqrt() < ZERO_TOLERANCE {
        return Err(MathError::division_by_zero("skewness", m2));
    }
    let nf = n as f64;
    let g1 = m3 / m2.powf(1.5);
    Ok((nf * (nf - 1.0)).sqrt() / (nf - 2.0) * g1)
}

/// Bias-adjusted sample excess kurtosis. Requires four observations.
pub fn excess_kurtosis(values: &[f64]) -> MathResult<f64> {
    let n = values.len();
    if n < 4 {
        return Err(MathError::insufficient_data(4, n));
    }
    let (m2, _, m4) = central_moments(values)?;
    if m2.sqrt() < ZERO_TOLERANCE {
        return Err(MathError::division_by_zero("kurtosis", m2));
    }
    let nf = n as f64;
    let g2 = m4 / (m2 * m2) - 3.0;
    Ok(((nf + 1.0) * g2 + 6.0) * (nf - 1.0) / ((nf - 2.0) * (nf - 3.0)))
}

/// Downside deviation below `threshold`.
///
/// Square root of the mean squared shortfall `(threshold - r)^2`, averaged
/// over the periods where `r < threshold`. Returns 0 when no period falls
/// below the threshold.
pub fn downside_deviation(values: &[f64], threshold: f64) -> MathResult<f64> {
    if values.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    let (sum, count) = values
        .iter()
        .filter(|r| **r < threshold)
        .fold((0.0, 0usize), |(s, c), r| (s + (threshold - r).powi(2), c + 1));
    if count == 0 {
        return Ok(0.0);
    }
    Ok((sum / count as f64).sqrt())
}

/// Population central moments `(m2, m3, m4)`.
fn central_moments(values: &[f64]) -> MathResult<(f64, f64, f64)> {
    let m = mean(values)?;
    let n = values.len() as f64;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for x in values {
        let d = x - m;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    Ok((m2 / n, m3 / n, m4 / n))
}
