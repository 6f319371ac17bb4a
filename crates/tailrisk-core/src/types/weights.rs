//! Validated portfolio weights.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ReturnSeries;
use crate::error::{CoreError, CoreResult};

/// Tolerance on the sum of weights.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Non-negative asset weights summing to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct Weights {
    entries: BTreeMap<String, f64>,
}

impl Weights {
    /// Creates weights, rejecting empty, negative, non-finite or
    /// non-normalized input.
    pub fn new<I, S>(entries: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (name, weight) in entries {
            let name = name.into();
            if !weight.is_finite() || weight < 0.0 {
                return Err(CoreError::invalid_weights(format!(
                    "weight for '{name}' must be finite and non-negative, got {weight}"
                )));
            }
            if map.insert(name.clone(), weight).is_some() {
                return Err(CoreError::invalid_weights(format!("duplicate asset '{name}'")));
            }
        }

        if map.is_empty() {
            return Err(CoreError::invalid_weights("weights cannot be empty"));
        }

        let total: f64 = map.values().sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(CoreError::invalid_weights(format!(
                "weights must sum to 1.0, got {total}"
            )));
        }

        Ok(Self { entries: map })
    }

    /// Equal weights over the given assets.
    pub fn equal<I, S>(assets: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = assets.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(CoreError::invalid_weights("weights cannot be empty"));
        }
        let w = 1.0 / names.len() as f64;
        Self::new(names.into_iter().map(|n| (n, w)))
    }

    /// Weight of `asset`, if present.
    #[must_use]
    pub fn get(&self, asset: &str) -> Option<f64> {
        self.entries.get(asset).copied()
    }

    /// Iterates `(asset, weight)` in asset-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of weighted assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for constructed weights.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.entries.values().sum()
    }

    /// Checks that the weighted assets are exactly the assets of `series`.
    pub fn ensure_matches(&self, series: &ReturnSeries) -> CoreResult<()> {
        let missing: Vec<&str> = series
            .assets()
            .iter()
            .filter(|a| !self.entries.contains_key(a.as_str()))
            .map(String::as_str)
            .collect();
        let extra: Vec<&str> = self
            .entries
            .keys()
            .filter(|k| series.column(k).is_none())
            .map(String::as_str)
            .collect();

        if missing.is_empty() && extra.is_empty() {
            return Ok(());
        }
        Err(CoreError::invalid_weights(format!(
            "weights do not match series assets (missing: {missing:?}, unknown: {extra:?})"
        )))
    }

    /// Weight vector in the column order of `series`.
    pub fn aligned_to(&self, series: &ReturnSeries) -> CoreResult<Vec<f64>> {
        self.ensure_matches(series)?;
        Ok(series
            .assets()
            .iter()
            .map(|a| self.entries.get(a).copied().unwrap_or(0.0))
            .collect())
    }
}

impl TryFrom<BTreeMap<String, f64>> for Weights {
    type Error = CoreError;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        Self::new(map)
    }
}

impl From<Weights> for BTreeMap<String, f64> {
    fn from(weights: Weights) -> Self {
        weights.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Frequency;
    use chrono::NaiveDate;

    #[test]
    fn test_sum_tolerance() {
        assert!(Weights::new([("A", 0.5), ("B", 0.47)]).is_err());
        assert!(Weights::new([("A", 0.5), ("B", 0.5 + 0.9e-6)]).is_ok());
        assert!(Weights::new([("A", 0.5), ("B", 0.5 - 0.9e-6)]).is_ok());
        assert!(Weights::new([("A", 0.5), ("B", 0.5 + 2e-6)]).is_err());
    }

    #[test]
    fn test_negative_rejected() {
        let err = Weights::new([("A", 1.5), ("B", -0.5)]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidWeights { .. }));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(Weights::new(Vec::<(String, f64)>::new()).is_err());
        assert!(Weights::equal(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_equal() {
        let w = Weights::equal(["A", "B", "C"]).unwrap();
        assert_eq!(w.len(), 3);
        assert!((w.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_key_mismatch() {
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let series = ReturnSeries::new(
            Frequency::Daily,
            vec![d0, d1],
            vec![("A".into(), vec![0.0, 0.1]), ("B".into(), vec![0.0, 0.1])],
        )
        .unwrap();

        let w = Weights::new([("A", 0.5), ("C", 0.5)]).unwrap();
        assert!(matches!(w.ensure_matches(&series), Err(CoreError::InvalidWeights { .. })));

        let w = Weights::new([("B", 0.25), ("A", 0.75)]).unwrap();
        assert_eq!(w.aligned_to(&series).unwrap(), vec![0.75, 0.25]);
    }

    #[test]
    fn test_serde_validates() {
        assert!(serde_json::from_str::<Weights>(r#"{"A":0.6,"B":0.3}"#).is_err());
        let w: Weights = serde_json::from_str(r#"{"A":0.6,"B":0.4}"#).unwrap();
        assert_eq!(w.get("A"), Some(0.6));
    }
}
