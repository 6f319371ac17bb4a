//! Error types for the Tailrisk core types.
//!
//! Construction of return series, weights and frequencies validates its
//! inputs eagerly; every failure is reported through [`CoreError`].

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building or combining core domain types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Frequency tag is not one of daily, monthly or yearly.
    #[error("Invalid frequency: '{tag}' (expected daily, monthly or yearly)")]
    InvalidFrequency {
        /// The unrecognized tag.
        tag: String,
    },

    /// Weights do not sum to one, are negative, or do not match the assets.
    #[error("Invalid weights: {reason}")]
    InvalidWeights {
        /// Description of the violation.
        reason: String,
    },

    /// Series is too short for the requested construction.
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Minimum required observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Confidence level outside the open interval (0, 1).
    #[error("Invalid confidence level: {value} (must be strictly between 0 and 1)")]
    InvalidConfidence {
        /// The rejected value.
        value: f64,
    },

    /// Malformed series input (NaN, misaligned dates, duplicate assets).
    #[error("Invalid series: {reason}")]
    InvalidSeries {
        /// Description of the problem.
        reason: String,
    },

    /// Invalid input parameter.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },
}

impl CoreError {
    /// Creates an invalid weights error.
    #[must_use]
    pub fn invalid_weights(reason: impl Into<String>) -> Self {
        Self::InvalidWeights {
            reason: reason.into(),
        }
    }

    /// Creates an invalid series error.
    #[must_use]
    pub fn invalid_series(reason: impl Into<String>) -> Self {
        Self::InvalidSeries {
            reason: reason.into(),
        }
    }

    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}
