//! Full risk assessment: dispersion, VaR and CVaR per method and horizon,
//! and performance, collected into one serializable report.
//!
//! A failing section does not abort the assessment; the section records the
//! error message and the remaining sections still run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use tailrisk_core::scaling::rescale_vol;
use tailrisk_core::{BenchmarkSeries, ConfidenceLevel, Frequency, Portfolio, Weights};

use crate::cvar::{CVaREngine, CVaRResult};
use crate::dispersion::{
    AssetMatrix, DispersionEngine, DistributionStats, SerialCorrelation, DEFAULT_LJUNG_BOX_LAGS,
};
use crate::error::{RiskError, RiskResult};
use crate::parallel::maybe_parallel_map;
use crate::performance::{PerformanceEngine, PerformanceResult};
use crate::var::{HistoricalVaR, MonteCarloConfig, VaREngine, VaRMethod, VaRResult};
use crate::EntityValues;

/// Parameters of a full assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSettings {
    /// Confidence level for VaR and CVaR.
    pub confidence: ConfidenceLevel,
    /// Horizons in periods of the series frequency.
    pub horizons: Vec<u32>,
    /// VaR methods to run, in order.
    pub methods: Vec<VaRMethod>,
    /// Monte Carlo settings.
    pub monte_carlo: MonteCarloConfig,
    /// Minimum sample for historical VaR.
    pub min_historical_observations: usize,
    /// Rolling volatility window.
    pub rolling_window: usize,
    /// Frequency the dispersion statistics are reported at.
    pub report_frequency: Frequency,
    /// Annual risk-free rate.
    pub annual_risk_free_rate: f64,
}

impl Default for AssessmentSettings {
    fn default() -> Self {
        Self {
            confidence: ConfidenceLevel::P95,
            horizons: vec![1, 21, 252],
            methods: VaRMethod::ALL.to_vec(),
            monte_carlo: MonteCarloConfig::default(),
            min_historical_observations: HistoricalVaR::DEFAULT_MIN_OBSERVATIONS,
            rolling_window: 252,
            report_frequency: Frequency::Yearly,
            annual_risk_free_rate: 0.01,
        }
    }
}

/// Outcome of one report section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section<T> {
    /// The computed value, if the section succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    /// The error message, if it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Section<T> {
    /// Wraps a result.
    pub fn from_result(result: RiskResult<T>) -> Self {
        match result {
            Ok(value) => Self {
                value: Some(value),
                error: None,
            },
            Err(err) => Self {
                value: None,
                error: Some(err.to_string()),
            },
        }
    }

    /// True if the section has a value.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.value.is_some()
    }
}

/// Results of one VaR method across all horizons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSection<T> {
    /// VaR method.
    pub method: VaRMethod,
    /// One result per horizon.
    pub results: Section<Vec<T>>,
}

/// In-sample breaches of one method's one-period VaR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreachSummary {
    /// VaR method.
    pub method: VaRMethod,
    /// Breaches expected at the confidence level, `n * (1 - c)`.
    pub expected: f64,
    /// Periods whose return fell below the one-period VaR, per entity.
    pub counts: BTreeMap<String, usize>,
}

impl BreachSummary {
    fn count(
        engine: &VaREngine<'_>,
        method: VaRMethod,
        confidence: ConfidenceLevel,
    ) -> RiskResult<Self> {
        let var = engine.estimate(method, confidence, 1)?;
        let counts = var
            .values
            .iter()
            .map(|(entity, v)| Ok((entity.clone(), engine.breaches(entity, *v)?.len())))
            .collect::<RiskResult<_>>()?;
        Ok(Self {
            method,
            expected: engine.portfolio().len() as f64 * confidence.alpha(),
            counts,
        })
    }
}

/// Dispersion part of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispersionSummary {
    /// Frequency of `mean`, `volatility`, `variance` and rolling volatility.
    pub frequency: Frequency,
    /// Mean return.
    pub mean: EntityValues,
    /// Standard deviation.
    pub volatility: EntityValues,
    /// Variance.
    pub variance: EntityValues,
    /// Downside deviation below 0 at native frequency.
    pub downside_deviation: EntityValues,
    /// Rolling window length.
    pub rolling_window: usize,
    /// Last full-window volatility, `None` when the window exceeds the sample.
    pub latest_rolling_volatility: Option<EntityValues>,
    /// Covariance of the assets at native frequency.
    pub covariance: AssetMatrix,
    /// Correlation of the assets.
    pub correlation: Section<AssetMatrix>,
    /// Shape statistics.
    pub distribution: Section<BTreeMap<String, DistributionStats>>,
    /// Ljung-Box test at 10 lags.
    pub serial_correlation: Section<BTreeMap<String, SerialCorrelation>>,
}

/// Everything a full assessment produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentReport {
    /// Native frequency of the series.
    pub frequency: Frequency,
    /// Number of observations.
    pub observations: usize,
    /// First date.
    pub start: NaiveDate,
    /// Last date.
    pub end: NaiveDate,
    /// Asset names.
    pub assets: Vec<String>,
    /// Portfolio weights.
    pub weights: Weights,
    /// Settings the report was produced with.
    pub settings: AssessmentSettings,
    /// Dispersion statistics.
    pub dispersion: Section<DispersionSummary>,
    /// VaR per method.
    pub var: Vec<MethodSection<VaRResult>>,
    /// CVaR per method.
    pub cvar: Vec<MethodSection<CVaRResult>>,
    /// One-period VaR breaches per method; methods whose VaR failed are omitted.
    pub breaches: Vec<BreachSummary>,
    /// Performance metrics.
    pub performance: Section<PerformanceResult>,
}

/// Runs every engine over one portfolio.
#[derive(Debug)]
pub struct RiskAssessment<'a> {
    portfolio: &'a Portfolio,
    benchmark: Option<&'a BenchmarkSeries>,
    settings: AssessmentSettings,
}

impl<'a> RiskAssessment<'a> {
    /// Creates an assessment.
    #[must_use]
    pub fn new(portfolio: &'a Portfolio, settings: AssessmentSettings) -> Self {
        Self {
            portfolio,
            benchmark: None,
            settings,
        }
    }

    /// Adds a benchmark for the relative metrics.
    #[must_use]
    pub fn with_benchmark(mut self, benchmark: &'a BenchmarkSeries) -> Self {
        self.benchmark = Some(benchmark);
        self
    }

    /// Settings in use.
    #[must_use]
    pub fn settings(&self) -> &AssessmentSettings {
        &self.settings
    }

    /// Runs the assessment.
    ///
    /// Fails only on invalid settings; engine errors are recorded in the
    /// affected section.
    pub fn run(&self) -> RiskResult<AssessmentReport> {
        let settings = &self.settings;
        if settings.horizons.is_empty() {
            return Err(RiskError::invalid_input("at least one horizon is required"));
        }
        let historical = HistoricalVaR::new(settings.min_historical_observations)?;
        let dates = self.portfolio.dates();
        let (start, end) = match (dates.first(), dates.last()) {
            (Some(s), Some(e)) => (*s, *e),
            _ => return Err(RiskError::insufficient_data(2, 0)),
        };

        log::info!(
            "assessing {} assets over {} observations ({} to {})",
            self.portfolio.series().n_assets(),
            self.portfolio.len(),
            start,
            end
        );

        let cvar_engine = CVaREngine::new(
            VaREngine::new(self.portfolio)
                .with_historical(historical)
                .with_monte_carlo(settings.monte_carlo),
        );
        let var_engine = cvar_engine.var_engine();

        let outcomes = maybe_parallel_map(&settings.methods, settings.monte_carlo.parallel, |&m| {
            let var = var_engine.estimate_horizons(m, settings.confidence, &settings.horizons);
            let cvar = cvar_engine.estimate_horizons(m, settings.confidence, &settings.horizons);
            let breaches = BreachSummary::count(var_engine, m, settings.confidence);
            (m, var, cvar, breaches)
        });
        let mut var = Vec::with_capacity(outcomes.len());
        let mut cvar = Vec::with_capacity(outcomes.len());
        let mut breaches = Vec::with_capacity(outcomes.len());
        for (method, v, c, b) in outcomes {
            match b {
                Ok(summary) => breaches.push(summary),
                Err(err) => log::debug!("no breach count for {method}: {err}"),
            }
            var.push(MethodSection {
                method,
                results: Section::from_result(v),
            });
            cvar.push(MethodSection {
                method,
                results: Section::from_result(c),
            });
        }

        let mut performance = PerformanceEngine::new(self.portfolio)
            .with_annual_risk_free_rate(settings.annual_risk_free_rate);
        if let Some(benchmark) = self.benchmark {
            performance = performance.with_benchmark(benchmark);
        }

        Ok(AssessmentReport {
            frequency: self.portfolio.frequency(),
            observations: self.portfolio.len(),
            start,
            end,
            assets: self.portfolio.series().assets().to_vec(),
            weights: self.portfolio.weights().clone(),
            settings: settings.clone(),
            dispersion: Section::from_result(self.dispersion()),
            var,
            cvar,
            breaches,
            performance: Section::from_result(performance.summary()),
        })
    }

    fn dispersion(&self) -> RiskResult<DispersionSummary> {
        let engine = DispersionEngine::new(self.portfolio);
        let frequency = self.settings.report_frequency;
        let window = self.settings.rolling_window;
        let native = self.portfolio.frequency();

        let latest_rolling_volatility = if (2..=self.portfolio.len()).contains(&window) {
            let mut latest = EntityValues::new();
            for entity in self.portfolio.entities() {
                if let Some((_, vol)) = engine.rolling_volatility(entity, window)?.last() {
                    latest.insert(entity.to_string(), rescale_vol(vol, native, frequency));
                }
            }
            Some(latest)
        } else {
            log::debug!(
                "rolling window {} does not fit {} observations",
                window,
                self.portfolio.len()
            );
            None
        };

        Ok(DispersionSummary {
            frequency,
            mean: engine.mean(frequency)?,
            volatility: engine.std(frequency)?,
            variance: engine.variance(frequency)?,
            downside_deviation: engine.downside_deviation(0.0)?,
            rolling_window: window,
            latest_rolling_volatility,
            covariance: engine.covariance_matrix()?,
            correlation: Section::from_result(engine.correlation_matrix()),
            distribution: Section::from_result(engine.distribution_stats()),
            serial_correlation: Section::from_result(engine.ljung_box(DEFAULT_LJUNG_BOX_LAGS)),
        })
    }
}
