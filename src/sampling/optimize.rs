//! On-the-fly gradient descent of the variational parameter α.
//!
//! Every iteration re-equilibrates the ensemble at the current α, measures
//! local energies and log-derivatives, reduces them with the covariance
//! estimator and takes one step `α ← α − η·dE/dα`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, VmcError};
use crate::io::RunConfig;
use crate::wavefunction::TrialWfn;
use super::estimator::{EnergyEstimate, MeasurementBatch};
use super::metropolis::{MetropolisSampler, WalkerEnsemble};

/// Phase of the optimization loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Equilibrating,
    Measuring,
    Updating,
    Finished,
}

/// Outcome of one optimization iteration.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,
    /// α after the update
    pub alpha: f64,
    /// Mean local energy at the pre-update α
    pub energy: f64,
    /// dE/dα at the pre-update α
    pub gradient: f64,
    pub variance: f64,
    pub error: f64,
    /// Acceptance rate over the measurement phase
    pub acceptance_rate: f64,
}

/// Everything a run hands to the persistence layer.
#[derive(Clone, Debug, PartialEq)]
pub struct VmcResults {
    pub seed: u64,
    pub initial_positions: Vec<f64>,
    pub final_positions: Vec<f64>,
    pub final_alpha: f64,
    pub history: Vec<IterationRecord>,
}

impl VmcResults {
    /// (iteration, α) pairs.
    pub fn alpha_trajectory(&self) -> Vec<(usize, f64)> {
        self.history.iter().map(|r| (r.iteration, r.alpha)).collect()
    }

    /// (iteration, mean energy) pairs.
    pub fn energy_trajectory(&self) -> Vec<(usize, f64)> {
        self.history.iter().map(|r| (r.iteration, r.energy)).collect()
    }

    /// (iteration, dE/dα) pairs.
    pub fn gradient_trajectory(&self) -> Vec<(usize, f64)> {
        self.history.iter().map(|r| (r.iteration, r.gradient)).collect()
    }
}

/// Drives the equilibrate → measure → update loop for a trial wavefunction.
pub struct AlphaOptimizer<W: TrialWfn> {
    wavefunction: W,
    config: RunConfig,
    sampler: MetropolisSampler,
    ensemble: WalkerEnsemble,
    initial_positions: Vec<f64>,
    alpha: f64,
    seed: u64,
    iteration: usize,
    phase: Phase,
    history: Vec<IterationRecord>,
}

impl<W: TrialWfn> AlphaOptimizer<W> {
    /// Validate the configuration and place the walkers.
    ///
    /// Without a configured seed one is drawn from OS entropy and logged.
    pub fn new(wavefunction: W, config: RunConfig) -> Result<Self> {
        config.validate()?;
        let seed = match config.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                info!(seed, "no seed configured, drew one from entropy");
                seed
            }
        };

        let mut sampler = MetropolisSampler::new(config.n_walkers, config.step_size, config.proposal, seed)?;
        let ensemble = sampler.initialize();
        let initial_positions = ensemble.positions().to_vec();
        debug!(n_walkers = config.n_walkers, seed, phase = ?Phase::Initializing, "walkers placed");

        Ok(Self {
            wavefunction,
            alpha: config.alpha,
            history: Vec::with_capacity(config.n_iterations),
            config,
            sampler,
            ensemble,
            initial_positions,
            seed,
            iteration: 0,
            phase: Phase::Initializing,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn ensemble(&self) -> &WalkerEnsemble {
        &self.ensemble
    }

    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }

    fn enter(&mut self, phase: Phase) {
        debug!(iteration = self.iteration, from = ?self.phase, to = ?phase, "phase transition");
        self.phase = phase;
    }

    /// Run one full iteration: equilibrate, measure, update α.
    pub fn iterate(&mut self) -> Result<IterationRecord> {
        let alpha = self.alpha;

        self.enter(Phase::Equilibrating);
        self.sampler.equilibrate(&self.wavefunction, &mut self.ensemble, alpha, self.config.n_equilibrate);

        self.enter(Phase::Measuring);
        let mut batch = MeasurementBatch::with_capacity(self.config.n_walkers, self.config.n_steps);
        let mut accepted = 0;
        for _ in 0..self.config.n_steps {
            accepted += self.sampler.step(&self.wavefunction, &mut self.ensemble, alpha);
            batch.record(&self.wavefunction, self.ensemble.positions(), alpha);
        }
        let acceptance_rate = accepted as f64 / (self.config.n_steps * self.config.n_walkers) as f64;

        self.enter(Phase::Updating);
        let estimate = batch.estimate()?;
        let new_alpha = self.update(&estimate)?;

        let record = IterationRecord {
            iteration: self.iteration,
            alpha: new_alpha,
            energy: estimate.mean_energy,
            gradient: estimate.energy_gradient,
            variance: estimate.variance,
            error: estimate.error,
            acceptance_rate,
        };
        info!(
            "Iter {:4}: E = {:10.6} ± {:.6} Ha, dE/dα = {:+.5}, α = {:.6}, acc = {:.3}",
            record.iteration, record.energy, record.error, record.gradient, record.alpha, acceptance_rate
        );

        self.history.push(record);
        self.alpha = new_alpha;
        self.iteration += 1;
        Ok(record)
    }

    /// α ← α − η·dE/dα, refusing non-finite estimates or results.
    fn update(&self, estimate: &EnergyEstimate) -> Result<f64> {
        if !estimate.mean_energy.is_finite() || !estimate.energy_gradient.is_finite() {
            return Err(VmcError::NonFiniteEstimate {
                iteration: self.iteration,
                energy: estimate.mean_energy,
                gradient: estimate.energy_gradient,
            });
        }
        let new_alpha = self.alpha - self.config.learning_rate * estimate.energy_gradient;
        if !new_alpha.is_finite() {
            return Err(VmcError::Diverged {
                iteration: self.iteration,
                alpha: new_alpha,
            });
        }
        if new_alpha <= 0.0 {
            warn!(iteration = self.iteration, alpha = new_alpha, "α is no longer positive");
        }
        Ok(new_alpha)
    }

    /// Run all configured iterations and hand back positions and trajectories.
    pub fn run(mut self) -> Result<VmcResults> {
        info!(
            "VMC: {} walkers, {} + {} steps/iter, {} iterations, α₀ = {}, η = {}, step = {}",
            self.config.n_walkers,
            self.config.n_equilibrate,
            self.config.n_steps,
            self.config.n_iterations,
            self.config.alpha,
            self.config.learning_rate,
            self.config.step_size
        );
        while self.iteration < self.config.n_iterations {
            self.iterate()?;
        }
        self.enter(Phase::Finished);
        info!(alpha = self.alpha, iterations = self.iteration, "optimization finished");

        Ok(VmcResults {
            seed: self.seed,
            initial_positions: self.initial_positions,
            final_positions: self.ensemble.into_positions(),
            final_alpha: self.alpha,
            history: self.history,
        })
    }
}
