//! # Tailrisk Config
//!
//! Analysis configuration for the Tailrisk risk engine.
//!
//! An [`AnalysisConfig`] names the date range, portfolio weights, benchmark,
//! confidence level, horizons and VaR methods of one analysis. Configs load
//! from and save to JSON, TOML or YAML, chosen by file extension, and convert
//! into the parameter types the engines take.
//!
//! ## Example
//!
//! ```rust
//! use tailrisk_config::prelude::*;
//!
//! let config = AnalysisConfig::parse(
//!     "confidence_level: 0.99\nhorizons: [1, 10]\n",
//!     ConfigFormat::Yaml,
//! )?;
//! config.validate_or_error()?;
//! assert_eq!(config.confidence()?.value(), 0.99);
//! # Ok::<(), ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod analysis;
pub mod error;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::analysis::{AnalysisConfig, ConfigFormat};
    pub use crate::error::{ConfigError, ConfigResult, Validate, ValidationError};
}

pub use analysis::{AnalysisConfig, ConfigFormat};
pub use error::{ConfigError, ConfigResult, Validate, ValidationError};
