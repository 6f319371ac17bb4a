//! Analysis configuration: what to measure and how.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tailrisk_core::{ConfidenceLevel, Frequency, Weights};
use tailrisk_risk::assessment::AssessmentSettings;
use tailrisk_risk::var::{HistoricalVaR, MonteCarloConfig, VaRMethod};

use crate::error::{ConfigError, ConfigResult, Validate, ValidationError};

/// Serialized file formats, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.json`
    Json,
    /// `.toml`
    Toml,
    /// `.yaml` or `.yml`
    Yaml,
}

impl ConfigFormat {
    /// Detects the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Parameters of one portfolio risk analysis.
///
/// Every field has a default, so a config file only needs the values it
/// changes. `risk_free_rate` is annual; engines receive the per-period rate
/// from [`AnalysisConfig::risk_free_per_period`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// First date to include (inclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Last date to include (inclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Benchmark name, matched against the benchmark file's column.
    pub benchmark: String,
    /// Sampling frequency of the return data.
    pub frequency: Frequency,
    /// Frequency dispersion statistics are reported at.
    pub report_frequency: Frequency,
    /// VaR/CVaR confidence level in (0, 1).
    pub confidence_level: f64,
    /// Horizons in periods of `frequency`.
    pub horizons: Vec<u32>,
    /// VaR methods to run.
    pub var_methods: Vec<VaRMethod>,
    /// Monte Carlo paths.
    pub monte_carlo_simulations: usize,
    /// Monte Carlo master seed; unseeded when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monte_carlo_seed: Option<u64>,
    /// Rolling volatility window in periods.
    pub rolling_window: usize,
    /// Annual risk-free rate.
    pub risk_free_rate: f64,
    /// Minimum sample for historical VaR.
    pub min_historical_observations: usize,
    /// Asset weights. Empty means equal weights over the loaded assets.
    pub portfolio_assets: BTreeMap<String, f64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            benchmark: "URTH".to_string(),
            frequency: Frequency::Daily,
            report_frequency: Frequency::Yearly,
            confidence_level: 0.95,
            horizons: vec![1, 21, 252],
            var_methods: VaRMethod::ALL.to_vec(),
            monte_carlo_simulations: MonteCarloConfig::DEFAULT_SIMULATIONS,
            monte_carlo_seed: None,
            rolling_window: 252,
            risk_free_rate: 0.01,
            min_historical_observations: HistoricalVaR::DEFAULT_MIN_OBSERVATIONS,
            portfolio_assets: BTreeMap::new(),
        }
    }
}

impl AnalysisConfig {
    /// Reads a config file; the format follows the extension.
    ///
    /// The result is not validated; call [`Validate::validate_or_error`]
    /// or use [`AnalysisConfig::load_validated`].
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loading {:?} config from {}", format, path.display());
        Self::parse(&text, format)
    }

    /// Reads and validates a config file.
    pub fn load_validated(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let config = Self::load(path)?;
        config.validate_or_error()?;
        Ok(config)
    }

    /// Writes the config; the format follows the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let text = self.render(format)?;
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses config text in the given format.
    pub fn parse(text: &str, format: ConfigFormat) -> ConfigResult<Self> {
        let config = match format {
            ConfigFormat::Json => serde_json::from_str(text)?,
            ConfigFormat::Toml => toml::from_str(text)?,
            ConfigFormat::Yaml => serde_yaml::from_str(text)?,
        };
        Ok(config)
    }

    /// Renders the config in the given format.
    pub fn render(&self, format: ConfigFormat) -> ConfigResult<String> {
        match format {
            ConfigFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            ConfigFormat::Toml => Ok(toml::to_string_pretty(self)?),
            ConfigFormat::Yaml => {
                serde_yaml::to_string(self).map_err(|e| ConfigError::Serialization(e.to_string()))
            }
        }
    }

    /// Confidence level as the validated core type.
    pub fn confidence(&self) -> ConfigResult<ConfidenceLevel> {
        Ok(ConfidenceLevel::new(self.confidence_level)?)
    }

    /// Monte Carlo settings.
    #[must_use]
    pub fn monte_carlo(&self) -> MonteCarloConfig {
        let config = MonteCarloConfig::new(self.monte_carlo_simulations);
        match self.monte_carlo_seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    /// Annual risk-free rate divided by the periods per year of `frequency`.
    #[must_use]
    pub fn risk_free_per_period(&self) -> f64 {
        self.risk_free_rate / f64::from(self.frequency.periods_per_year())
    }

    /// Portfolio weights over `assets`.
    ///
    /// With no configured weights every asset gets `1 / n`. Configured
    /// weights are returned as-is; matching them to the loaded series is
    /// left to portfolio construction.
    pub fn weights_for(&self, assets: &[String]) -> ConfigResult<Weights> {
        let weights = if self.portfolio_assets.is_empty() {
            Weights::equal(assets.iter().cloned())?
        } else {
            Weights::new(self.portfolio_assets.iter().map(|(k, v)| (k.clone(), *v)))?
        };
        Ok(weights)
    }

    /// Whether `date` falls inside the configured date range.
    #[must_use]
    pub fn includes(&self, date: NaiveDate) -> bool {
        self.start_date.map_or(true, |start| date >= start)
            && self.end_date.map_or(true, |end| date <= end)
    }

    /// Settings for a full risk assessment.
    pub fn assessment_settings(&self) -> ConfigResult<AssessmentSettings> {
        Ok(AssessmentSettings {
            confidence: self.confidence()?,
            horizons: self.horizons.clone(),
            methods: self.var_methods.clone(),
            monte_carlo: self.monte_carlo(),
            min_historical_observations: self.min_historical_observations,
            rolling_window: self.rolling_window,
            report_frequency: self.report_frequency,
            annual_risk_free_rate: self.risk_free_rate,
        })
    }
}

impl Validate for AnalysisConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            errors.push(ValidationError::with_rule(
                "confidence_level",
                format!("must be strictly between 0 and 1, got {}", self.confidence_level),
                "range",
            ));
        }

        if self.horizons.is_empty() {
            errors.push(ValidationError::new("horizons", "at least one horizon is required"));
        } else if self.horizons.contains(&0) {
            errors.push(ValidationError::with_rule(
                "horizons",
                "horizons must be at least 1 period",
                "positive",
            ));
        }

        if self.var_methods.is_empty() {
            errors.push(ValidationError::new("var_methods", "at least one VaR method is required"));
        }

        if self.monte_carlo_simulations < MonteCarloConfig::MIN_SIMULATIONS {
            errors.push(ValidationError::with_rule(
                "monte_carlo_simulations",
                format!(
                    "must be at least {}, got {}",
                    MonteCarloConfig::MIN_SIMULATIONS,
                    self.monte_carlo_simulations
                ),
                "minimum",
            ));
        }

        if self.rolling_window < 2 {
            errors.push(ValidationError::with_rule(
                "rolling_window",
                format!("must be at least 2, got {}", self.rolling_window),
                "minimum",
            ));
        }

        if !self.risk_free_rate.is_finite() || self.risk_free_rate.abs() >= 1.0 {
            errors.push(ValidationError::with_rule(
                "risk_free_rate",
                format!("must be an annual rate in (-1, 1), got {}", self.risk_free_rate),
                "range",
            ));
        }

        if self.min_historical_observations < 2 {
            errors.push(ValidationError::with_rule(
                "min_historical_observations",
                format!("must be at least 2, got {}", self.min_historical_observations),
                "minimum",
            ));
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start >= end {
                errors.push(ValidationError::new(
                    "start_date",
                    format!("start date {start} must precede end date {end}"),
                ));
            }
        }

        if !self.portfolio_assets.is_empty() {
            let weights = self.portfolio_assets.iter().map(|(k, v)| (k.clone(), *v));
            if let Err(err) = Weights::new(weights) {
                errors.push(ValidationError::new("portfolio_assets", err.to_string()));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.is_valid());
        assert_eq!(config.benchmark, "URTH");
        assert_eq!(config.horizons, vec![1, 21, 252]);
        assert_eq!(config.monte_carlo_simulations, 10_000);
        assert_eq!(config.min_historical_observations, 20);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let text = r#"{ "confidence_level": 0.99, "horizons": [1, 5] }"#;
        let config = AnalysisConfig::parse(text, ConfigFormat::Json).unwrap();
        assert_eq!(config.confidence_level, 0.99);
        assert_eq!(config.horizons, vec![1, 5]);
        assert_eq!(config.rolling_window, 252);
        assert_eq!(config.var_methods, VaRMethod::ALL.to_vec());
    }

    #[test]
    fn test_var_methods_from_toml() {
        let text = r#"
var_methods = ["historical", "monte_carlo"]
frequency = "monthly"

[portfolio_assets]
EQ = 0.6
BOND = 0.4
"#;
        let config = AnalysisConfig::parse(text, ConfigFormat::Toml).unwrap();
        assert_eq!(
            config.var_methods,
            vec![VaRMethod::Historical, VaRMethod::MonteCarlo]
        );
        assert_eq!(config.frequency, Frequency::Monthly);
        assert_eq!(config.portfolio_assets.len(), 2);
        assert!(config.is_valid());
    }

    #[test]
    fn test_validation_collects_every_error() {
        let config = AnalysisConfig {
            confidence_level: 1.0,
            horizons: vec![],
            monte_carlo_simulations: 10,
            ..AnalysisConfig::default()
        };
        let errors = config.validate();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["confidence_level", "horizons", "monte_carlo_simulations"]
        );
        assert!(matches!(
            config.validate_or_error(),
            Err(ConfigError::MultipleValidationErrors(ref v)) if v.len() == 3
        ));
    }

    #[test]
    fn test_bad_weights_and_dates() {
        let mut config = AnalysisConfig::default();
        config.portfolio_assets.insert("A".into(), 0.5);
        config.portfolio_assets.insert("B".into(), 0.3);
        config.start_date = NaiveDate::from_ymd_opt(2024, 6, 1);
        config.end_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        let fields: Vec<_> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["start_date", "portfolio_assets"]);
    }

    #[test]
    fn test_conversions() {
        let config = AnalysisConfig {
            monte_carlo_seed: Some(7),
            monte_carlo_simulations: 500,
            ..AnalysisConfig::default()
        };
        assert_eq!(config.confidence().unwrap(), ConfidenceLevel::P95);
        assert!((config.risk_free_per_period() - 0.01 / 252.0).abs() < 1e-15);

        let mc = config.monte_carlo();
        assert_eq!(mc.num_simulations, 500);
        assert_eq!(mc.seed, Some(7));

        let settings = config.assessment_settings().unwrap();
        assert_eq!(settings.horizons, config.horizons);
        assert_eq!(settings.annual_risk_free_rate, 0.01);
    }

    #[test]
    fn test_weights_for_defaults_to_equal() {
        let assets = vec!["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()];
        let weights = AnalysisConfig::default().weights_for(&assets).unwrap();
        assert_eq!(weights.get("C"), Some(0.25));
    }

    #[test]
    fn test_date_filter() {
        let config = AnalysisConfig {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 10),
            ..AnalysisConfig::default()
        };
        assert!(!config.includes(NaiveDate::from_ymd_opt(2024, 1, 9).unwrap()));
        assert!(config.includes(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.YML")).unwrap(), ConfigFormat::Yaml);
        assert!(matches!(
            ConfigFormat::from_path(Path::new("a.ini")),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }
}
