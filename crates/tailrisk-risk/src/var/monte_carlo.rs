//! Monte Carlo VaR.
//!
//! Draws `num_simulations` joint one-period returns from a multivariate
//! normal with the sample mean vector and covariance matrix of the assets,
//! projects them through the weights, and reads the loss off the simulated
//! sample exactly like historical simulation.
//!
//! Paths are generated in fixed-size blocks. Each block owns an independent
//! `StdRng` seeded from a master generator, and block seeds are drawn in
//! block order before any path is simulated, so a seeded run produces the
//! same sample whether blocks run serially or on worker threads.

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use tailrisk_core::{ConfidenceLevel, Portfolio, PORTFOLIO};
use tailrisk_math::linear_algebra::{covariance_matrix, factorize_psd};
use tailrisk_math::statistics::mean;

use super::{empirical_loss, TailEntry, TailModel, VaREstimator, VaRMethod};
use crate::error::{RiskError, RiskResult};
use crate::parallel::maybe_parallel_map;

/// Paths simulated per RNG stream.
const BLOCK_SIZE: usize = 1024;

/// Monte Carlo simulation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Number of simulated one-period returns.
    pub num_simulations: usize,
    /// Master seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Simulate blocks on the rayon pool when the `parallel` feature is on.
    pub parallel: bool,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            num_simulations: Self::DEFAULT_SIMULATIONS,
            seed: None,
            parallel: true,
        }
    }
}

impl MonteCarloConfig {
    /// Default number of simulations.
    pub const DEFAULT_SIMULATIONS: usize = 10_000;

    /// Smallest accepted number of simulations.
    pub const MIN_SIMULATIONS: usize = 100;

    /// Creates a config with `num_simulations` paths, unseeded.
    #[must_use]
    pub fn new(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            ..Self::default()
        }
    }

    /// Fixes the master seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables block-parallel simulation.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    fn validate(&self) -> RiskResult<()> {
        if self.num_simulations < Self::MIN_SIMULATIONS {
            return Err(RiskError::invalid_input(format!(
                "Monte Carlo needs at least {} simulations, got {}",
                Self::MIN_SIMULATIONS,
                self.num_simulations
            )));
        }
        Ok(())
    }
}

/// Simulated one-period returns, one column per asset plus the portfolio.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedReturns {
    /// Asset names in column order.
    pub assets: Vec<String>,
    /// Simulated asset returns, one vector per asset.
    pub asset_columns: Vec<Vec<f64>>,
    /// Weighted portfolio returns of each simulated path.
    pub portfolio: Vec<f64>,
}

/// Monte Carlo VaR estimator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonteCarloVaR {
    config: MonteCarloConfig,
}

impl MonteCarloVaR {
    /// Creates an estimator with the given settings.
    #[must_use]
    pub fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    /// Simulation settings.
    #[must_use]
    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Simulates joint returns for every asset of `portfolio`.
    pub fn simulate(&self, portfolio: &Portfolio) -> RiskResult<SimulatedReturns> {
        self.config.validate()?;
        let series = portfolio.series();
        let columns: Vec<&[f64]> = series.columns().map(|(_, c)| c).collect();
        let means = columns
            .iter()
            .map(|c| mean(c))
            .collect::<Result<Vec<f64>, _>>()?;
        let cov = covariance_matrix(&columns)?;
        let factor = factorize_psd(&cov)?;

        let n = self.config.num_simulations;
        let mut master = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let blocks: Vec<(u64, usize)> = (0..n)
            .step_by(BLOCK_SIZE)
            .map(|start| (master.gen::<u64>(), BLOCK_SIZE.min(n - start)))
            .collect();

        log::debug!(
            "simulating {} paths over {} assets in {} blocks (seed {:?})",
            n,
            means.len(),
            blocks.len(),
            self.config.seed
        );

        let drawn = maybe_parallel_map(&blocks, self.config.parallel, |&(seed, paths)| {
            draw_block(seed, paths, &means, &factor)
        });

        let k = means.len();
        let weights = portfolio.weight_vector();
        let mut asset_columns = vec![Vec::with_capacity(n); k];
        let mut portfolio_sim = Vec::with_capacity(n);
        for block in &drawn {
            for path in block.chunks_exact(k) {
                let mut total = 0.0;
                for ((column, x), w) in asset_columns.iter_mut().zip(path).zip(weights) {
                    column.push(*x);
                    total += w * x;
                }
                portfolio_sim.push(total);
            }
        }

        Ok(SimulatedReturns {
            assets: series.assets().to_vec(),
            asset_columns,
            portfolio: portfolio_sim,
        })
    }
}

/// Draws `paths` joint returns `mu + L z`, row-major.
fn draw_block(seed: u64, paths: usize, means: &[f64], factor: &DMatrix<f64>) -> Vec<f64> {
    let k = means.len();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut z = DVector::<f64>::zeros(k);
    let mut out = Vec::with_capacity(paths * k);
    for _ in 0..paths {
        for zi in z.iter_mut() {
            *zi = rng.sample::<f64, _>(StandardNormal);
        }
        let x = factor * &z;
        out.extend(x.iter().zip(means).map(|(xi, mu)| xi + mu));
    }
    out
}

impl VaREstimator for MonteCarloVaR {
    fn method(&self) -> VaRMethod {
        VaRMethod::MonteCarlo
    }

    fn tail_model(
        &self,
        portfolio: &Portfolio,
        confidence: ConfidenceLevel,
    ) -> RiskResult<TailModel> {
        let sim = self.simulate(portfolio)?;
        let alpha = confidence.alpha();

        let mut entries = Vec::with_capacity(sim.assets.len() + 1);
        for (asset, samples) in sim.assets.into_iter().zip(sim.asset_columns) {
            entries.push(TailEntry {
                entity: asset,
                var: empirical_loss(&samples, alpha)?,
                samples,
            });
        }
        entries.push(TailEntry {
            entity: PORTFOLIO.to_string(),
            var: empirical_loss(&sim.portfolio, alpha)?,
            samples: sim.portfolio,
        });

        Ok(TailModel::new(VaRMethod::MonteCarlo, confidence, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{alternating_portfolio, ramp_portfolio};
    use tailrisk_math::statistics::std_dev;

    #[test]
    fn test_seed_reproduces() {
        let portfolio = ramp_portfolio(60);
        let mc = MonteCarloVaR::new(MonteCarloConfig::new(3000).with_seed(7));
        let a = mc.simulate(&portfolio).unwrap();
        let b = mc.simulate(&portfolio).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.portfolio.len(), 3000);
        assert_eq!(a.asset_columns.len(), 2);
    }

    #[test]
    fn test_serial_and_parallel_agree() {
        let portfolio = ramp_portfolio(60);
        let config = MonteCarloConfig::new(5000).with_seed(11);
        let serial = MonteCarloVaR::new(config.with_parallel(false))
            .simulate(&portfolio)
            .unwrap();
        let parallel = MonteCarloVaR::new(config.with_parallel(true))
            .simulate(&portfolio)
            .unwrap();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_portfolio_is_weighted_sum_of_paths() {
        let portfolio = ramp_portfolio(60);
        let sim = MonteCarloVaR::new(MonteCarloConfig::new(200).with_seed(1))
            .simulate(&portfolio)
            .unwrap();
        let w = portfolio.weight_vector();
        for t in 0..200 {
            let expected = w[0] * sim.asset_columns[0][t] + w[1] * sim.asset_columns[1][t];
            assert!((sim.portfolio[t] - expected).abs() < 1e-15);
        }
    }

    #[test]
    fn test_simulated_dispersion_matches_input() {
        let portfolio = alternating_portfolio(250, 0.01);
        let sim = MonteCarloVaR::new(MonteCarloConfig::new(20_000).with_seed(42))
            .simulate(&portfolio)
            .unwrap();
        let target = std_dev(portfolio.returns()).unwrap();
        let got = std_dev(&sim.portfolio).unwrap();
        assert!((got / target - 1.0).abs() < 0.03, "simulated std {got} vs {target}");
    }

    #[test]
    fn test_too_few_simulations() {
        let mc = MonteCarloVaR::new(MonteCarloConfig::new(10));
        assert!(matches!(
            mc.tail_model(&ramp_portfolio(30), ConfidenceLevel::P95),
            Err(RiskError::InvalidInput { .. })
        ));
    }
}
