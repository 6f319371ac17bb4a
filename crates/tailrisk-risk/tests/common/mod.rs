//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use std::sync::Arc;
use tailrisk_core::{Frequency, Portfolio, ReturnSeries, Weights};

pub fn dates(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
    (0..n as u64).map(|i| start + Days::new(i)).collect()
}

/// Builds an equally weighted daily portfolio from raw columns named
/// `A0`, `A1`, ...
pub fn equal_weight(columns: Vec<Vec<f64>>) -> Portfolio {
    let n = columns[0].len();
    let named: Vec<(String, Vec<f64>)> = columns
        .into_iter()
        .enumerate()
        .map(|(i, c)| (format!("A{i}"), c))
        .collect();
    let weights = Weights::equal(named.iter().map(|(name, _)| name.clone())).unwrap();
    let series = ReturnSeries::new(Frequency::Daily, dates(n), named).unwrap();
    Portfolio::new(Arc::new(series), weights).unwrap()
}

pub fn weighted(columns: Vec<(&str, Vec<f64>)>, weights: &[(&str, f64)]) -> Portfolio {
    let n = columns[0].1.len();
    let series = ReturnSeries::new(
        Frequency::Daily,
        dates(n),
        columns
            .into_iter()
            .map(|(name, c)| (name.to_string(), c))
            .collect(),
    )
    .unwrap();
    Portfolio::new(Arc::new(series), Weights::new(weights.iter().copied()).unwrap()).unwrap()
}
