//! Property-based tests for the statistics and linear algebra routines.

use proptest::prelude::*;
use tailrisk_math::linear_algebra::{
    correlation_from_covariance, covariance_matrix, is_positive_semi_definite, is_symmetric,
};
use tailrisk_math::statistics::{max_drawdown, quantile};

fn columns(k: usize, n: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(prop::collection::vec(-0.05f64..0.05, n), k)
}

proptest! {
    #[test]
    fn quantile_is_monotone(
        values in prop::collection::vec(-1.0f64..1.0, 1..60),
        p1 in 0.0f64..1.0,
        p2 in 0.0f64..1.0,
    ) {
        let (lo, hi) = if p1 <= p2 { (p1, p2) } else { (p2, p1) };
        prop_assert!(quantile(&values, lo).unwrap() <= quantile(&values, hi).unwrap());
    }

    #[test]
    fn quantile_stays_within_sample_range(
        values in prop::collection::vec(-1.0f64..1.0, 1..60),
        p in 0.0f64..1.0,
    ) {
        let q = quantile(&values, p).unwrap();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(q >= min && q <= max);
    }

    #[test]
    fn covariance_is_symmetric_psd(cols in (1usize..5, 5usize..40).prop_flat_map(|(k, n)| columns(k, n))) {
        let refs: Vec<&[f64]> = cols.iter().map(Vec::as_slice).collect();
        let cov = covariance_matrix(&refs).unwrap();
        prop_assert!(is_symmetric(&cov, 0.0));
        prop_assert!(is_positive_semi_definite(&cov, 1e-12));
    }

    #[test]
    fn correlation_has_unit_diagonal(cols in (2usize..5, 5usize..40).prop_flat_map(|(k, n)| columns(k, n))) {
        let refs: Vec<&[f64]> = cols.iter().map(Vec::as_slice).collect();
        let cov = covariance_matrix(&refs).unwrap();
        if let Ok(corr) = correlation_from_covariance(&cov) {
            for i in 0..corr.nrows() {
                prop_assert_eq!(corr[(i, i)], 1.0);
                for j in 0..corr.ncols() {
                    prop_assert_eq!(corr[(i, j)], corr[(j, i)]);
                    prop_assert!(corr[(i, j)].abs() <= 1.0);
                }
            }
        }
    }

    #[test]
    fn drawdown_is_a_fraction(returns in prop::collection::vec(-0.5f64..0.5, 1..100)) {
        let dd = max_drawdown(&returns).unwrap();
        prop_assert!((0.0..=1.0).contains(&dd));
    }
}
