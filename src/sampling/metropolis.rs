//! Metropolis-Hastings sampling of |ψ_α(x)|² for a walker ensemble.
//!
//! Every walker is an independent Markov chain with its own seeded random
//! stream, so the ensemble can be advanced index-parallel while staying
//! bit-identical to a sequential run.

use rand::distributions::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VmcError};
use crate::wavefunction::TrialWfn;

/// Lower and upper bound of the initial walker placement.
const INITIAL_RANGE: (f64, f64) = (2.0, 3.0);

/// Symmetric proposal distribution for the displacement `x' - x`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProposalKind {
    /// `step_size · U(−1, 1)`
    #[default]
    Uniform,
    /// `step_size · N(0, 1)`
    Gaussian,
}

#[derive(Copy, Clone, Debug)]
enum Kernel {
    Uniform(Uniform<f64>),
    Gaussian(Normal<f64>),
}

impl Kernel {
    fn new(kind: ProposalKind) -> Result<Self> {
        Ok(match kind {
            ProposalKind::Uniform => Kernel::Uniform(Uniform::new_inclusive(-1.0, 1.0)),
            ProposalKind::Gaussian => Kernel::Gaussian(
                Normal::new(0.0, 1.0).map_err(|e| VmcError::invalid("proposal", e.to_string()))?,
            ),
        })
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Kernel::Uniform(u) => u.sample(rng),
            Kernel::Gaussian(n) => n.sample(rng),
        }
    }
}

/// Fixed-size ensemble of 1D walker positions.
#[derive(Clone, Debug, PartialEq)]
pub struct WalkerEnsemble {
    positions: Vec<f64>,
}

impl WalkerEnsemble {
    pub fn from_positions(positions: Vec<f64>) -> Self {
        Self { positions }
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn into_positions(self) -> Vec<f64> {
        self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// True if no walker is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.positions.iter().all(|x| x.is_finite())
    }

    pub fn mean(&self) -> f64 {
        self.positions.iter().sum::<f64>() / self.positions.len() as f64
    }

    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        self.positions.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / self.positions.len() as f64
    }
}

/// Acceptance probability `min(1, ρ_new / ρ_old)` for a symmetric proposal.
///
/// A zero (or NaN) current density accepts any proposal with positive
/// density and rejects everything else. The result is always in `[0, 1]`.
pub fn acceptance_probability(density_old: f64, density_new: f64) -> f64 {
    if !(density_old > 0.0) {
        return if density_new > 0.0 { 1.0 } else { 0.0 };
    }
    let ratio = density_new / density_old;
    if ratio.is_nan() || ratio <= 0.0 {
        0.0
    } else {
        ratio.min(1.0)
    }
}

/// Metropolis sampler owning one random stream per walker.
#[derive(Clone, Debug)]
pub struct MetropolisSampler {
    step_size: f64,
    kernel: Kernel,
    streams: Vec<StdRng>,
}

impl MetropolisSampler {
    /// Create a sampler for `n_walkers` chains. Walker `i` is seeded with `seed + i`.
    pub fn new(n_walkers: usize, step_size: f64, proposal: ProposalKind, seed: u64) -> Result<Self> {
        if n_walkers == 0 {
            return Err(VmcError::invalid("n_walkers", "must be positive"));
        }
        if !(step_size > 0.0) || !step_size.is_finite() {
            return Err(VmcError::invalid("step_size", format!("must be finite and positive, got {}", step_size)));
        }
        let streams = (0..n_walkers as u64)
            .map(|i| StdRng::seed_from_u64(seed.wrapping_add(i)))
            .collect();
        Ok(Self {
            step_size,
            kernel: Kernel::new(proposal)?,
            streams,
        })
    }

    pub fn n_walkers(&self) -> usize {
        self.streams.len()
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Place every walker uniformly in [2, 3), each from its own stream.
    pub fn initialize(&mut self) -> WalkerEnsemble {
        let dist = Uniform::new(INITIAL_RANGE.0, INITIAL_RANGE.1);
        let positions = self.streams.iter_mut().map(|rng| dist.sample(rng)).collect();
        WalkerEnsemble { positions }
    }

    /// Advance every walker by one Metropolis move. Returns the number of accepted moves.
    ///
    /// Each walker draws the proposal first and the acceptance test second,
    /// always from its own stream.
    pub fn step<W: TrialWfn>(&mut self, wfn: &W, ensemble: &mut WalkerEnsemble, alpha: f64) -> usize {
        assert_eq!(ensemble.len(), self.streams.len(), "ensemble size must match the number of streams");
        let step_size = self.step_size;
        let kernel = self.kernel;

        ensemble
            .positions
            .par_iter_mut()
            .zip(self.streams.par_iter_mut())
            .map(|(x, rng)| {
                let proposed = *x + step_size * kernel.draw(rng);
                let p = acceptance_probability(wfn.density(*x, alpha), wfn.density(proposed, alpha));
                if rng.gen::<f64>() < p {
                    *x = proposed;
                    1
                } else {
                    0
                }
            })
            .sum()
    }

    /// Run `n_steps` full-ensemble moves and return the acceptance rate.
    pub fn equilibrate<W: TrialWfn>(
        &mut self,
        wfn: &W,
        ensemble: &mut WalkerEnsemble,
        alpha: f64,
        n_steps: usize,
    ) -> f64 {
        let mut accepted = 0;
        for _ in 0..n_steps {
            accepted += self.step(wfn, ensemble, alpha);
        }
        let rate = accepted as f64 / (n_steps * ensemble.len()).max(1) as f64;
        debug!(n_steps, acceptance = rate, "equilibration finished");
        rate
    }
}
