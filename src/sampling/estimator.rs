//! Reduction of sampled local energies into energy and α-gradient estimates.
//!
//! The gradient uses the covariance form
//!
//!   dE/dα = 2 (⟨E_L g⟩ − ⟨E_L⟩⟨g⟩),   g = ∂ ln ψ / ∂α
//!
//! which vanishes identically when ψ is an exact eigenstate.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VmcError};
use crate::wavefunction::TrialWfn;

/// Energy statistics for one measurement phase.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnergyEstimate {
    /// ⟨E_L⟩ over all samples
    pub mean_energy: f64,
    /// dE/dα from the covariance estimator
    pub energy_gradient: f64,
    /// Population variance of E_L
    pub variance: f64,
    /// Standard error of the mean energy (blocking over measurement steps)
    pub error: f64,
    /// Integrated autocorrelation time of the per-step mean energy, in steps
    pub autocorrelation_time: f64,
    pub n_samples: usize,
}

/// Samples collected over one measurement phase.
///
/// Accumulates every walker at every step; never reset within an iteration.
#[derive(Clone, Debug, Default)]
pub struct MeasurementBatch {
    local_energies: Vec<f64>,
    log_derivatives: Vec<f64>,
    step_means: Vec<f64>,
}

impl MeasurementBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n_walkers: usize, n_steps: usize) -> Self {
        Self {
            local_energies: Vec::with_capacity(n_walkers * n_steps),
            log_derivatives: Vec::with_capacity(n_walkers * n_steps),
            step_means: Vec::with_capacity(n_steps),
        }
    }

    /// Record one measurement step: `(E_L, g)` for every walker position.
    pub fn record<W: TrialWfn>(&mut self, wfn: &W, positions: &[f64], alpha: f64) {
        if positions.is_empty() {
            return;
        }
        let mut step_sum = 0.0;
        for &x in positions {
            let e_l = wfn.local_energy(x, alpha);
            step_sum += e_l;
            self.local_energies.push(e_l);
            self.log_derivatives.push(wfn.log_derivative(x, alpha));
        }
        self.step_means.push(step_sum / positions.len() as f64);
    }

    /// Add a single sample outside of the per-step bookkeeping.
    pub fn push(&mut self, local_energy: f64, log_derivative: f64) {
        self.local_energies.push(local_energy);
        self.log_derivatives.push(log_derivative);
    }

    pub fn len(&self) -> usize {
        self.local_energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local_energies.is_empty()
    }

    pub fn local_energies(&self) -> &[f64] {
        &self.local_energies
    }

    pub fn step_means(&self) -> &[f64] {
        &self.step_means
    }

    /// Reduce the batch into mean energy, gradient and error bars.
    pub fn estimate(&self) -> Result<EnergyEstimate> {
        if self.is_empty() {
            return Err(VmcError::EmptyBatch);
        }
        let energies = DVector::from_column_slice(&self.local_energies);
        let log_derivs = DVector::from_column_slice(&self.log_derivatives);
        let n = energies.len() as f64;

        let mean_energy = energies.mean();
        let energy_gradient = covariance_gradient(&energies, &log_derivs);
        let variance = energies.iter().map(|e| (e - mean_energy).powi(2)).sum::<f64>() / n;

        let (error, tau) = if self.step_means.len() >= 4 {
            let tau = autocorrelation_time(&self.step_means);
            match blocking_error(&self.step_means, tau) {
                Some(err) => (err, tau),
                None => ((variance / n).sqrt(), tau),
            }
        } else {
            ((variance / n).sqrt(), 1.0)
        };

        Ok(EnergyEstimate {
            mean_energy,
            energy_gradient,
            variance,
            error,
            autocorrelation_time: tau,
            n_samples: self.len(),
        })
    }
}

/// dE/dα = 2 (mean(E_L·g) − mean(E_L)·mean(g)).
pub fn covariance_gradient(energies: &DVector<f64>, log_derivs: &DVector<f64>) -> f64 {
    let n = energies.len() as f64;
    2.0 * (energies.dot(log_derivs) / n - energies.mean() * log_derivs.mean())
}

/// Estimate autocorrelation time using initial positive sequence.
fn autocorrelation_time(series: &[f64]) -> f64 {
    let n = series.len();
    let mean = series.iter().sum::<f64>() / n as f64;
    let var = series.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n as f64;

    if var == 0.0 {
        return 1.0;
    }

    let mut tau = 1.0;
    for t in 1..n / 2 {
        let auto_t: f64 = series[..n - t].iter()
            .zip(series[t..].iter())
            .map(|(&x, &y)| (x - mean) * (y - mean))
            .sum::<f64>() / ((n - t) as f64 * var);

        if auto_t < 0.0 {
            break;
        }
        tau += 2.0 * auto_t;
    }
    tau
}

/// Standard error of the mean from blocks of size ceil(2τ). `None` with fewer than two blocks.
fn blocking_error(series: &[f64], tau: f64) -> Option<f64> {
    let block_size = ((2.0 * tau).ceil() as usize).max(1);
    let n_blocks = series.len() / block_size;
    if n_blocks < 2 {
        return None;
    }

    let block_means: Vec<f64> = series
        .chunks_exact(block_size)
        .map(|block| block.iter().sum::<f64>() / block_size as f64)
        .collect();

    let mean = block_means.iter().sum::<f64>() / n_blocks as f64;
    let variance = block_means.iter()
        .map(|&x| (x - mean).powi(2))
        .sum::<f64>() / (n_blocks - 1) as f64;

    Some((variance / n_blocks as f64).sqrt())
}
