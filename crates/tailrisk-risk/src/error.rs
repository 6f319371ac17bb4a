//! Error types for risk calculations.

use tailrisk_core::CoreError;
use tailrisk_math::MathError;
use thiserror::Error;

/// A specialized Result type for risk calculations.
pub type RiskResult<T> = Result<T, RiskError>;

/// Errors that can occur during risk calculations.
///
/// Every failure is returned to the caller; no engine substitutes 0 or NaN
/// for a value it could not compute.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    /// Too few observations for the estimator.
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Minimum required observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Frequency tag not recognized.
    #[error("Invalid frequency: '{tag}'")]
    InvalidFrequency {
        /// The rejected tag.
        tag: String,
    },

    /// Weights violate the portfolio invariants.
    #[error("Invalid weights: {reason}")]
    InvalidWeights {
        /// Description of the violation.
        reason: String,
    },

    /// No observation lies beyond the VaR threshold.
    #[error("Empty tail set for '{entity}': no observation below the VaR threshold")]
    EmptyTailSet {
        /// Asset name or "portfolio".
        entity: String,
    },

    /// Too few dates shared with the benchmark.
    #[error("Insufficient overlap with benchmark: need {required} common dates, got {actual}")]
    InsufficientOverlap {
        /// Minimum common dates.
        required: usize,
        /// Actual common dates.
        actual: usize,
    },

    /// A ratio denominator is zero.
    #[error("Division by zero in {context}")]
    DivisionByZero {
        /// What was being divided.
        context: String,
    },

    /// Invalid input parameter.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },
}

impl RiskError {
    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Creates an insufficient overlap error.
    #[must_use]
    pub fn insufficient_overlap(required: usize, actual: usize) -> Self {
        Self::InsufficientOverlap { required, actual }
    }

    /// Creates an empty tail set error.
    #[must_use]
    pub fn empty_tail(entity: impl Into<String>) -> Self {
        Self::EmptyTailSet {
            entity: entity.into(),
        }
    }

    /// Creates a division by zero error.
    #[must_use]
    pub fn division_by_zero(context: impl Into<String>) -> Self {
        Self::DivisionByZero {
            context: context.into(),
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Error for an entity name that is neither an asset nor the portfolio.
    #[must_use]
    pub fn unknown_entity(entity: &str) -> Self {
        Self::invalid_input(format!("unknown entity '{entity}'"))
    }
}

impl From<CoreError> for RiskError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidFrequency { tag } => Self::InvalidFrequency { tag },
            CoreError::InvalidWeights { reason } => Self::InvalidWeights { reason },
            CoreError::InsufficientData { required, actual } => {
                Self::InsufficientData { required, actual }
            }
            CoreError::InvalidConfidence { .. }
            | CoreError::InvalidSeries { .. }
            | CoreError::InvalidInput { .. } => Self::invalid_input(err.to_string()),
        }
    }
}

impl From<MathError> for RiskError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InsufficientData { required, actual } => {
                Self::InsufficientData { required, actual }
            }
            MathError::DivisionByZero { operation, .. } => Self::DivisionByZero { context: operation },
            MathError::InvalidInput { reason } => Self::InvalidInput { reason },
            MathError::NotPositiveSemiDefinite { .. } | MathError::DimensionMismatch { .. } => {
                Self::invalid_input(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_keep_their_kind() {
        let err: RiskError = CoreError::invalid_weights("sum is 0.97").into();
        assert!(matches!(err, RiskError::InvalidWeights { .. }));

        let err: RiskError = CoreError::InvalidFrequency { tag: "weekly".into() }.into();
        assert_eq!(err, RiskError::InvalidFrequency { tag: "weekly".into() });
    }

    #[test]
    fn test_math_errors_keep_their_kind() {
        let err: RiskError = MathError::insufficient_data(2, 1).into();
        assert_eq!(err, RiskError::insufficient_data(2, 1));

        let err: RiskError = MathError::division_by_zero("correlation", 0.0).into();
        assert_eq!(err, RiskError::division_by_zero("correlation"));
    }

    #[test]
    fn test_display() {
        assert!(RiskError::empty_tail("portfolio")
            .to_string()
            .contains("portfolio"));
        assert!(RiskError::insufficient_overlap(10, 3)
            .to_string()
            .contains("need 10"));
    }
}
