//! Odd Slater-type orbital for the 1D hydrogen-like problem.

use serde::{Deserialize, Serialize};
use super::traits::TrialWfn;

/// ψ_α(x) = x·e^(−α|x|) with the Coulomb-like potential V(x) = −1/|x|.
///
/// The wavefunction is odd and vanishes at the origin. At α = 1 it is the
/// exact ground state with E = −½ Ha.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Slater1D;

impl TrialWfn for Slater1D {
    fn evaluate(&self, x: f64, alpha: f64) -> f64 {
        x * (-alpha * x.abs()).exp()
    }

    fn laplacian(&self, x: f64, alpha: f64) -> f64 {
        (-alpha * x.abs()).exp() * (alpha * alpha * x - 2.0 * alpha * x.signum())
    }

    fn potential(&self, x: f64) -> f64 {
        -1.0 / x.abs()
    }

    fn log_derivative(&self, x: f64, _alpha: f64) -> f64 {
        -x.abs()
    }

    fn local_energy(&self, x: f64, alpha: f64) -> f64 {
        -0.5 * alpha * alpha + (alpha - 1.0) / x.abs()
    }
}
