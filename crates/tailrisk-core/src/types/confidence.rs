//! Confidence level for tail-risk measures.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// A confidence level strictly inside (0, 1).
///
/// The tail fraction used by quantile estimators is `alpha = 1 - confidence`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ConfidenceLevel(f64);

impl ConfidenceLevel {
    /// 95% confidence.
    pub const P95: ConfidenceLevel = ConfidenceLevel(0.95);

    /// 99% confidence.
    pub const P99: ConfidenceLevel = ConfidenceLevel(0.99);

    /// Creates a confidence level, rejecting values outside (0, 1).
    pub fn new(value: f64) -> CoreResult<Self> {
        if value.is_finite() && value > 0.0 && value < 1.0 {
            Ok(Self(value))
        } else {
            Err(CoreError::InvalidConfidence { value })
        }
    }

    /// Returns the confidence as a fraction.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns the tail probability `1 - confidence`.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        1.0 - self.0
    }

    /// Bit pattern used for hashing in cache keys.
    #[must_use]
    pub fn key(&self) -> u64 {
        self.0.to_bits()
    }
}

impl Default for ConfidenceLevel {
    fn default() -> Self {
        Self::P95
    }
}

impl TryFrom<f64> for ConfidenceLevel {
    type Error = CoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConfidenceLevel> for f64 {
    fn from(level: ConfidenceLevel) -> Self {
        level.0
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0 * 100.0)
    }
}
