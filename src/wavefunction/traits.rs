//! Trial wavefunction trait for one-dimensional VMC.
//!
//! A trial wavefunction ψ_α(x) depends on a single position `x` and a
//! single variational parameter `α`. The sampler only needs the density
//! |ψ|² as a ratio; the estimator needs the local energy and the
//! log-derivative with respect to α.

/// One-parameter trial wavefunction in one dimension.
///
/// `Sync` is required because walkers are advanced in parallel and share
/// the wavefunction by reference.
pub trait TrialWfn: Sync {
    /// Evaluate ψ_α(x). No normalization constant.
    fn evaluate(&self, x: f64, alpha: f64) -> f64;

    /// Second derivative d²ψ/dx² at `x`.
    fn laplacian(&self, x: f64, alpha: f64) -> f64;

    /// External potential V(x) of the Hamiltonian H = -½ d²/dx² + V(x).
    fn potential(&self, x: f64) -> f64;

    /// ∂ ln ψ_α(x) / ∂α.
    fn log_derivative(&self, x: f64, alpha: f64) -> f64;

    /// Unnormalized probability density |ψ_α(x)|².
    fn density(&self, x: f64, alpha: f64) -> f64 {
        let psi = self.evaluate(x, alpha);
        psi * psi
    }

    /// Local energy E_L = (Hψ)/ψ.
    ///
    /// Families with a closed form should override this; the generic
    /// ratio loses the exact zero-variance property to rounding.
    fn local_energy(&self, x: f64, alpha: f64) -> f64 {
        -0.5 * self.laplacian(x, alpha) / self.evaluate(x, alpha) + self.potential(x)
    }

    /// Numerical second derivative using central difference.
    fn numerical_laplacian(&self, x: f64, alpha: f64, h: f64) -> f64 {
        let psi = self.evaluate(x, alpha);
        (self.evaluate(x + h, alpha) - 2.0 * psi + self.evaluate(x - h, alpha)) / (h * h)
    }

    /// Numerical ∂ ln|ψ| / ∂α using central difference.
    fn numerical_log_derivative(&self, x: f64, alpha: f64, h: f64) -> f64 {
        let fwd = self.evaluate(x, alpha + h).abs().ln();
        let bwd = self.evaluate(x, alpha - h).abs().ln();
        (fwd - bwd) / (2.0 * h)
    }
}
