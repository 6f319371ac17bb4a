//! Reference scenarios with independently computed expectations.

mod common;

use approx::assert_relative_eq;
use tailrisk_core::{ConfidenceLevel, PORTFOLIO};
use tailrisk_risk::prelude::*;

fn five_point() -> tailrisk_core::Portfolio {
    common::weighted(
        vec![
            ("A", vec![0.01, -0.02, 0.015, -0.01, 0.005]),
            ("B", vec![-0.005, 0.01, -0.015, 0.02, 0.0]),
        ],
        &[("A", 0.5), ("B", 0.5)],
    )
}

#[test]
fn historical_var_matches_interpolated_fifth_percentile() {
    let portfolio = five_point();

    // Independent computation: sort, rank h = (n - 1) * 0.05, interpolate.
    let mut sorted = portfolio.returns().to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let h = 4.0 * 0.05;
    let q = sorted[0] + h * (sorted[1] - sorted[0]);

    let engine = VaREngine::new(&portfolio).with_historical(HistoricalVaR::new(5).unwrap());
    let var = engine
        .estimate(VaRMethod::Historical, ConfidenceLevel::P95, 1)
        .unwrap();
    assert_relative_eq!(var.portfolio().unwrap(), -q, epsilon = 1e-9);
    assert_relative_eq!(var.portfolio().unwrap(), 0.004, epsilon = 1e-9);
}

#[test]
fn monte_carlo_tracks_parametric_for_normal_asset() {
    // mean exactly 0, sample std 0.01 * sqrt(n / (n - 1))
    let n = 500;
    let x: Vec<f64> = (0..n).map(|t| if t % 2 == 0 { 0.01 } else { -0.01 }).collect();
    let portfolio = common::weighted(vec![("X", x)], &[("X", 1.0)]);

    let engine = VaREngine::new(&portfolio)
        .with_monte_carlo(MonteCarloConfig::new(10_000).with_seed(20_240_101));
    let mc = engine
        .estimate(VaRMethod::MonteCarlo, ConfidenceLevel::P95, 1)
        .unwrap()
        .portfolio()
        .unwrap();
    let parametric = engine
        .estimate(VaRMethod::Parametric, ConfidenceLevel::P95, 1)
        .unwrap()
        .portfolio()
        .unwrap();

    assert!(
        (mc / parametric - 1.0).abs() < 0.05,
        "monte carlo {mc} vs parametric {parametric}"
    );
}

#[test]
fn sharpe_of_flat_series_is_division_by_zero() {
    let portfolio = common::weighted(vec![("X", vec![0.002; 30])], &[("X", 1.0)]);
    let engine = PerformanceEngine::new(&portfolio);
    assert!(matches!(
        engine.sharpe(PORTFOLIO),
        Err(RiskError::DivisionByZero { .. })
    ));
}

#[test]
fn max_drawdown_of_reference_path() {
    let prices = [100.0, 110.0, 90.0, 95.0, 120.0];
    let returns: Vec<f64> = prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
    let portfolio = common::weighted(vec![("X", returns)], &[("X", 1.0)]);
    let dd = PerformanceEngine::new(&portfolio)
        .max_drawdown(PORTFOLIO)
        .unwrap();
    assert_relative_eq!(dd, (110.0 - 90.0) / 110.0, epsilon = 1e-12);
}

#[test]
fn breaches_are_ordered_dates_below_threshold() {
    let portfolio = five_point();
    let engine = VaREngine::new(&portfolio).with_historical(HistoricalVaR::new(2).unwrap());
    let breaches = engine.breaches("A", 0.005).unwrap();
    // A: -0.02 on day 1 and -0.01 on day 3
    assert_eq!(breaches, vec![portfolio.dates()[1], portfolio.dates()[3]]);
}

#[test]
fn cvar_of_five_point_portfolio() {
    let portfolio = five_point();
    let engine = CVaREngine::new(
        VaREngine::new(&portfolio).with_historical(HistoricalVaR::new(2).unwrap()),
    );
    let cvar = engine
        .estimate(VaRMethod::Historical, ConfidenceLevel::P95, 1)
        .unwrap();
    assert_relative_eq!(cvar.portfolio().unwrap(), 0.005, epsilon = 1e-12);
}
