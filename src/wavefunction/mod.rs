//! Wavefunction module - trial wavefunctions for 1D VMC.

mod traits;
mod slater;

pub use traits::TrialWfn;
pub use slater::Slater1D;
