//! Fixture portfolios shared by the unit tests.

use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::sync::Arc;
use tailrisk_core::{Frequency, Portfolio, ReturnSeries, Weights};

pub(crate) fn dated(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    (0..n as u64).map(|i| start + Days::new(i)).collect()
}

fn build(columns: Vec<(&str, Vec<f64>)>, weights: &[(&str, f64)]) -> Portfolio {
    let n = columns[0].1.len();
    let series = ReturnSeries::new(
        Frequency::Daily,
        dated(n),
        columns
            .into_iter()
            .map(|(name, values)| (name.to_string(), values))
            .collect(),
    )
    .unwrap();
    Portfolio::new(Arc::new(series), Weights::new(weights.iter().copied()).unwrap()).unwrap()
}

/// A = [0.01, -0.02, 0.015, -0.01, 0.005], B = [-0.005, 0.01, -0.015, 0.02, 0.0],
/// equal weights.
pub(crate) fn five_point_portfolio() -> Portfolio {
    build(
        vec![
            ("A", vec![0.01, -0.02, 0.015, -0.01, 0.005]),
            ("B", vec![-0.005, 0.01, -0.015, 0.02, 0.0]),
        ],
        &[("A", 0.5), ("B", 0.5)],
    )
}

/// Two correlated normal assets (seeded) with a crash every 20th day,
/// weighted 60/40.
pub(crate) fn ramp_portfolio(n: usize) -> Portfolio {
    let mut rng = StdRng::seed_from_u64(n as u64);
    let mut a = Vec::with_capacity(n);
    let mut b = Vec::with_capacity(n);
    for t in 0..n {
        let z1: f64 = rng.sample(StandardNormal);
        let z2: f64 = rng.sample(StandardNormal);
        if t % 20 == 7 {
            a.push(-0.04);
            b.push(-0.025);
        } else {
            a.push(0.0005 + 0.01 * z1);
            b.push(0.0002 + 0.006 * (0.5 * z1 + 0.85 * z2));
        }
    }
    build(vec![("A", a), ("B", b)], &[("A", 0.6), ("B", 0.4)])
}

/// Single asset alternating `+amplitude, -amplitude`.
pub(crate) fn alternating_portfolio(n: usize, amplitude: f64) -> Portfolio {
    let x = (0..n)
        .map(|t| if t % 2 == 0 { amplitude } else { -amplitude })
        .collect();
    build(vec![("X", x)], &[("X", 1.0)])
}

/// Single asset with a constant return.
pub(crate) fn constant_portfolio(n: usize, value: f64) -> Portfolio {
    build(vec![("X", vec![value; n])], &[("X", 1.0)])
}

/// `A` follows an AR(1) with coefficient `phi`, `B` is white noise; both
/// driven by seeded normal shocks and weighted 50/50.
pub(crate) fn ar1_portfolio(n: usize, phi: f64) -> Portfolio {
    let mut rng = StdRng::seed_from_u64(7);
    let mut a = Vec::with_capacity(n);
    let mut b = Vec::with_capacity(n);
    let mut prev = 0.0;
    for _ in 0..n {
        let z1: f64 = rng.sample(StandardNormal);
        let z2: f64 = rng.sample(StandardNormal);
        prev = phi * prev + 0.01 * z1;
        a.push(prev);
        b.push(0.01 * z2);
    }
    build(vec![("A", a), ("B", b)], &[("A", 0.5), ("B", 0.5)])
}
