//! CLI error types.

use std::path::PathBuf;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid date format.
    #[error("Invalid date format: {0}. Use YYYY-MM-DD.")]
    InvalidDate(String),

    /// Malformed CSV input.
    #[error("Invalid data in {path} (line {line}): {reason}")]
    InvalidData {
        /// File being read.
        path: PathBuf,
        /// 1-based line number, header included.
        line: u64,
        /// What was wrong.
        reason: String,
    },

    /// The file parsed but holds nothing usable.
    #[error("No usable data in {path}: {reason}")]
    EmptyData {
        /// File being read.
        path: PathBuf,
        /// What was missing.
        reason: String,
    },

    /// Invalid command-line value.
    #[error("Invalid argument {name}: {reason}")]
    InvalidArgument {
        /// Argument name.
        name: String,
        /// What was wrong.
        reason: String,
    },

    /// Refused to overwrite an existing file.
    #[error("{0} already exists (use --force to overwrite)")]
    FileExists(PathBuf),

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
