//! Sample autocorrelation and the Ljung-Box portmanteau test.

use statrs::distribution::{ChiSquared, ContinuousCDF};

use super::moments::{mean, ZERO_TOLERANCE};
use crate::error::{MathError, MathResult};

/// Ljung-Box test of no serial correlation up to `lags`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LjungBox {
    /// Number of lags tested.
    pub lags: usize,
    /// `Q = n(n+2) * sum(r_k^2 / (n-k))` for `k = 1..=lags`.
    pub statistic: f64,
    /// Upper tail of a chi-squared with `lags` degrees of freedom at `Q`.
    pub p_value: f64,
}

impl LjungBox {
    /// True if the no-autocorrelation hypothesis is rejected at `significance`.
    pub fn rejects(&self, significance: f64) -> bool {
        self.p_value < significance
    }
}

/// Sample autocorrelation at `lag`, normalized by the full-sample sum of
/// squares.
///
/// Needs `lag < n`. Fails with `DivisionByZero` for a constant sample.
pub fn autocorrelation(values: &[f64], lag: usize) -> MathResult<f64> {
    let n = values.len();
    if lag >= n {
        return Err(MathError::insufficient_data(lag + 1, n));
    }
    let m = mean(values)?;
    let denom: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    if denom.sqrt() < ZERO_TOLERANCE {
        return Err(MathError::division_by_zero("autocorrelation", denom));
    }
    let num: f64 = values[lag..]
        .iter()
        .zip(values)
        .map(|(a, b)| (a - m) * (b - m))
        .sum();
    Ok(num / denom)
}

/// Ljung-Box statistic over lags `1..=lags` with its chi-squared p-value.
///
/// Needs `lags >= 1` and more observations than lags.
pub fn ljung_box(values: &[f64], lags: usize) -> MathResult<LjungBox> {
    if lags == 0 {
        return Err(MathError::invalid_input("Ljung-Box needs at least one lag"));
    }
    let n = values.len();
    if n <= lags {
        return Err(MathError::insufficient_data(lags + 1, n));
    }

    let mut sum = 0.0;
    for k in 1..=lags {
        let r = autocorrelation(values, k)?;
        sum += r * r / (n - k) as f64;
    }
    let nf = n as f64;
    let statistic = nf * (nf + 2.0) * sum;

    let chi2 = ChiSquared::new(lags as f64).map_err(|e| MathError::invalid_input(e.to_string()))?;
    Ok(LjungBox {
        lags,
        statistic,
        p_value: chi2.sf(statistic),
    })
}
