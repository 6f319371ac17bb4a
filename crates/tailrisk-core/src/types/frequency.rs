//! Observation frequency of a return series.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Sampling frequency of periodic returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Trading-day returns (252 per year)
    #[default]
    Daily,
    /// Month-end returns (12 per year)
    Monthly,
    /// Year-end returns (1 per year)
    Yearly,
}

impl Frequency {
    /// All recognized frequencies.
    pub const ALL: [Frequency; 3] = [Frequency::Daily, Frequency::Monthly, Frequency::Yearly];

    /// Returns the number of periods per year.
    #[must_use]
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Daily => 252,
            Frequency::Monthly => 12,
            Frequency::Yearly => 1,
        }
    }

    /// Returns the lowercase tag used in configuration files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "d" => Ok(Frequency::Daily),
            "monthly" | "m" => Ok(Frequency::Monthly),
            "yearly" | "annual" | "y" => Ok(Frequency::Yearly),
            _ => Err(CoreError::InvalidFrequency { tag: s.to_string() }),
        }
    }
}

impl TryFrom<&str> for Frequency {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
