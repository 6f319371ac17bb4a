//! Linear algebra utilities.
//!
//! Covariance and correlation matrices over return columns, and the matrix
//! square root used to draw correlated normal samples.

use crate::error::{MathError, MathResult};
use crate::statistics::ZERO_TOLERANCE;
use nalgebra::DMatrix;

/// Relative tolerance for treating a negative eigenvalue as rounding noise.
pub const PSD_TOLERANCE: f64 = 1e-10;

/// Sample covariance matrix (divides by `n - 1`) of equally long columns.
///
/// The result is exactly symmetric.
pub fn covariance_matrix(columns: &[&[f64]]) -> MathResult<DMatrix<f64>> {
    let k = columns.len();
    if k == 0 {
        return Err(MathError::invalid_input("covariance matrix needs at least one column"));
    }
    let n = columns[0].len();
    if let Some(bad) = columns.iter().find(|c| c.len() != n) {
        return Err(MathError::DimensionMismatch {
            rows1: n,
            cols1: 1,
            rows2: bad.len(),
            cols2: 1,
        });
    }
    if n < 2 {
        return Err(MathError::insufficient_data(2, n));
    }

    let mut centered = DMatrix::<f64>::zeros(n, k);
    for (j, col) in columns.iter().enumerate() {
        let m = col.iter().sum::<f64>() / n as f64;
        for (i, x) in col.iter().enumerate() {
            centered[(i, j)] = x - m;
        }
    }

    let mut cov = centered.transpose() * &centered / (n - 1) as f64;
    for i in 0..k {
        for j in (i + 1)..k {
            cov[(j, i)] = cov[(i, j)];
        }
    }
    Ok(cov)
}

/// Correlation matrix from a covariance matrix.
///
/// The diagonal is exactly 1.0 and off-diagonal entries are clamped to
/// [-1, 1]. Fails with `DivisionByZero` if any variance is zero.
pub fn correlation_from_covariance(cov: &DMatrix<f64>) -> MathResult<DMatrix<f64>> {
    ensure_square(cov)?;
    let k = cov.nrows();
    let std: Vec<f64> = (0..k).map(|i| cov[(i, i)].max(0.0).sqrt()).collect();
    if let Some(s) = std.iter().find(|s| **s < ZERO_TOLERANCE) {
        return Err(MathError::division_by_zero("correlation matrix", *s));
    }

    let mut corr = DMatrix::<f64>::identity(k, k);
    for i in 0..k {
        for j in (i + 1)..k {
            let c = (cov[(i, j)] / (std[i] * std[j])).clamp(-1.0, 1.0);
            corr[(i, j)] = c;
            corr[(j, i)] = c;
        }
    }
    Ok(corr)
}

/// Returns `L` with `L * L^T = cov`.
///
/// Uses Cholesky when the matrix is positive definite. Singular matrices
/// (collinear or constant columns) fall back to the symmetric
/// eigen-decomposition `Q * sqrt(max(lambda, 0))`. Fails with
/// `NotPositiveSemiDefinite` when an eigenvalue is below
/// `-PSD_TOLERANCE * max|cov|`.
pub fn factorize_psd(cov: &DMatrix<f64>) -> MathResult<DMatrix<f64>> {
    ensure_square(cov)?;
    if let Some(chol) = cov.clone().cholesky() {
        return Ok(chol.l());
    }

    let eigen = cov.clone().symmetric_eigen();
    let min = eigen.eigenvalues.min();
    if min < -eigen_tolerance(cov) {
        return Err(MathError::NotPositiveSemiDefinite {
            min_eigenvalue: min,
        });
    }
    log::warn!(
        "covariance matrix is singular (min eigenvalue {min:.3e}), using eigen-decomposition"
    );

    let k = cov.nrows();
    let mut factor = eigen.eigenvectors;
    for j in 0..k {
        let scale = eigen.eigenvalues[j].max(0.0).sqrt();
        for i in 0..k {
            factor[(i, j)] *= scale;
        }
    }
    Ok(factor)
}

/// Smallest eigenvalue of a symmetric matrix.
pub fn min_eigenvalue(m: &DMatrix<f64>) -> MathResult<f64> {
    ensure_square(m)?;
    Ok(m.clone().symmetric_eigenvalues().min())
}

/// True if every eigenvalue is at least `-tolerance`.
pub fn is_positive_semi_definite(m: &DMatrix<f64>, tolerance: f64) -> bool {
    min_eigenvalue(m).is_ok_and(|min| min >= -tolerance)
}

/// True if `m` is square and `|m[i,j] - m[j,i]| <= tolerance` everywhere.
pub fn is_symmetric(m: &DMatrix<f64>, tolerance: f64) -> bool {
    if m.nrows() != m.ncols() {
        return false;
    }
    let k = m.nrows();
    (0..k).all(|i| (i + 1..k).all(|j| (m[(i, j)] - m[(j, i)]).abs() <= tolerance))
}

fn eigen_tolerance(m: &DMatrix<f64>) -> f64 {
    PSD_TOLERANCE * m.amax()
}

fn ensure_square(m: &DMatrix<f64>) -> MathResult<()> {
    if m.nrows() == m.ncols() && m.nrows() > 0 {
        Ok(())
    } else {
        Err(MathError::invalid_input(format!(
            "expected a non-empty square matrix, got {}x{}",
            m.nrows(),
            m.ncols()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_reconstructs(cov: &DMatrix<f64>) {
        let l = factorize_psd(cov).unwrap();
        let product = &l * l.transpose();
        for i in 0..cov.nrows() {
            for j in 0..cov.ncols() {
                assert_relative_eq!(product[(i, j)], cov[(i, j)], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_covariance_matrix() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 1.0, 4.0, 3.0];
        let cov = covariance_matrix(&[&a, &b]).unwrap();
        assert_relative_eq!(cov[(0, 0)], 5.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(cov[(0, 1)], 1.0, epsilon = 1e-12);
        assert_eq!(cov[(0, 1)], cov[(1, 0)]);
    }

    #[test]
    fn test_correlation_diagonal_is_one() {
        let a = [0.01, -0.02, 0.015, -0.01, 0.005];
        let b = [-0.005, 0.01, -0.015, 0.02, 0.0];
        let corr = correlation_from_covariance(&covariance_matrix(&[&a, &b]).unwrap()).unwrap();
        assert_eq!(corr[(0, 0)], 1.0);
        assert_eq!(corr[(1, 1)], 1.0);
        assert_eq!(corr[(0, 1)], corr[(1, 0)]);
        assert!(corr[(0, 1)] < 0.0);
    }

    #[test]
    fn test_correlation_zero_variance() {
        let a = [0.01, 0.01, 0.01];
        let b = [0.01, 0.02, 0.03];
        let cov = covariance_matrix(&[&a, &b]).unwrap();
        assert!(matches!(
            correlation_from_covariance(&cov),
            Err(MathError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_factorize_positive_definite() {
        let cov = DMatrix::from_row_slice(2, 2, &[4.0, 2.0, 2.0, 3.0]);
        assert_reconstructs(&cov);
    }

    #[test]
    fn test_factorize_singular_falls_back() {
        // Perfectly collinear columns
        let a = [0.01, -0.02, 0.03, 0.0];
        let b: Vec<f64> = a.iter().map(|x| 2.0 * x).collect();
        let cov = covariance_matrix(&[&a, &b]).unwrap();
        assert_reconstructs(&cov);
    }

    #[test]
    fn test_factorize_rejects_indefinite() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        assert!(matches!(
            factorize_psd(&m),
            Err(MathError::NotPositiveSemiDefinite { .. })
        ));
    }

    #[test]
    fn test_psd_tolerance_scales_with_matrix() {
        // -1e-11 is noise next to 1.0 but not next to daily return variances
        let unit = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, -1e-11]);
        assert!(factorize_psd(&unit).is_ok());

        let daily = DMatrix::from_row_slice(2, 2, &[1e-4, 0.0, 0.0, -1e-11]);
        assert!(matches!(
            factorize_psd(&daily),
            Err(MathError::NotPositiveSemiDefinite { .. })
        ));
    }

    #[test]
    fn test_psd_and_symmetry_checks() {
        let m = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 2.0]);
        assert!(is_symmetric(&m, 0.0));
        assert!(is_positive_semi_definite(&m, 1e-12));
        assert_relative_eq!(min_eigenvalue(&m).unwrap(), 1.0, epsilon = 1e-12);

        let asym = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 0.0, 2.0]);
        assert!(!is_symmetric(&asym, 1e-12));
    }
}
