//! Sampling module - Metropolis sampling, estimators and α optimization.

mod metropolis;
mod estimator;
mod optimize;

pub use metropolis::{acceptance_probability, MetropolisSampler, ProposalKind, WalkerEnsemble};
pub use estimator::{covariance_gradient, EnergyEstimate, MeasurementBatch};
pub use optimize::{AlphaOptimizer, IterationRecord, Phase, VmcResults};
