//! Error types for VMC runs.

use std::path::PathBuf;

/// Errors surfaced by configuration, sampling and persistence.
#[derive(Debug, thiserror::Error)]
pub enum VmcError {
    /// A run parameter is outside its valid domain. Detected before any sampling.
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    #[error("configuration file '{}' not found", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("cannot estimate from an empty measurement batch")]
    EmptyBatch,

    /// The estimator produced a NaN or infinite energy or gradient.
    #[error("non-finite estimate at iteration {iteration}: E = {energy}, dE/dα = {gradient}")]
    NonFiniteEstimate {
        iteration: usize,
        energy: f64,
        gradient: f64,
    },

    /// The gradient-descent update drove α to a non-finite value.
    #[error("α diverged at iteration {iteration} (α = {alpha}); lower the learning rate")]
    Diverged { iteration: usize, alpha: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, VmcError>;

impl VmcError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        VmcError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
