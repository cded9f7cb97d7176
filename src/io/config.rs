//! Run configuration and YAML config-file handling.

use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, VmcError};
use crate::sampling::ProposalKind;

/// Parameters of one VMC run. Read-only once the run starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of walkers
    #[serde(alias = "numwalkers")]
    pub n_walkers: usize,
    /// Measurement steps per optimization iteration
    #[serde(alias = "numsteps")]
    pub n_steps: usize,
    /// Equilibration steps at the start of every iteration
    #[serde(alias = "equilibration_steps")]
    pub n_equilibrate: usize,
    /// Initial variational parameter α
    pub alpha: f64,
    /// Learning rate for gradient descent on α
    pub learning_rate: f64,
    /// Metropolis step size
    pub step_size: f64,
    /// Number of optimization iterations
    #[serde(alias = "iterations")]
    pub n_iterations: usize,
    /// Seed of the walker streams; drawn from entropy when absent
    pub seed: Option<u64>,
    pub proposal: ProposalKind,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            n_walkers: 4000,
            n_steps: 120,
            n_equilibrate: 3000,
            alpha: 0.8,
            learning_rate: 0.01,
            step_size: 0.5,
            n_iterations: 120,
            seed: None,
            proposal: ProposalKind::Uniform,
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_walkers(mut self, n: usize) -> Self {
        self.n_walkers = n;
        self
    }

    pub fn with_n_steps(mut self, n: usize) -> Self {
        self.n_steps = n;
        self
    }

    pub fn with_n_equilibrate(mut self, n: usize) -> Self {
        self.n_equilibrate = n;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_step_size(mut self, step: f64) -> Self {
        self.step_size = step;
        self
    }

    pub fn with_n_iterations(mut self, n: usize) -> Self {
        self.n_iterations = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_proposal(mut self, proposal: ProposalKind) -> Self {
        self.proposal = proposal;
        self
    }

    /// Check every parameter before a run is attempted.
    pub fn validate(&self) -> Result<()> {
        let counts = [
            ("n_walkers", self.n_walkers),
            ("n_steps", self.n_steps),
            ("n_equilibrate", self.n_equilibrate),
            ("n_iterations", self.n_iterations),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(VmcError::invalid(field, "must be positive"));
            }
        }
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(VmcError::invalid(
                "step_size",
                format!("must be finite and positive, got {}", self.step_size),
            ));
        }
        if !self.alpha.is_finite() {
            return Err(VmcError::invalid("alpha", format!("must be finite, got {}", self.alpha)));
        }
        if !self.learning_rate.is_finite() || self.learning_rate < 0.0 {
            return Err(VmcError::invalid(
                "learning_rate",
                format!("must be finite and non-negative, got {}", self.learning_rate),
            ));
        }

        if self.learning_rate == 0.0 {
            warn!("learning rate is 0; α will not be optimized");
        }
        if self.alpha <= 0.0 {
            warn!(alpha = self.alpha, "initial α is not positive; the trial wavefunction is not normalizable");
        }
        Ok(())
    }
}

/// Contents of a YAML configuration file.
///
/// ```yaml
/// simulation:
///   numwalkers: 1000
///   numsteps: 500
///   equilibration_steps: 500
///   alpha: 0.8
///   learning_rate: 0.01
///   step_size: 0.5
///   iterations: 100
///   seed: 42
/// output_dir: results
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub simulation: RunConfig,
    pub output_dir: Option<String>,
}

/// Read a YAML configuration file.
pub fn read_config<P: AsRef<Path>>(filename: P) -> Result<FileConfig> {
    let path = filename.as_ref();
    if !path.exists() {
        return Err(VmcError::ConfigNotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let config: FileConfig = serde_yaml::from_reader(reader)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_counts_are_rejected() {
        let base = RunConfig::new();
        for (config, field) in [
            (base.clone().with_n_walkers(0), "n_walkers"),
            (base.clone().with_n_steps(0), "n_steps"),
            (base.clone().with_n_equilibrate(0), "n_equilibrate"),
            (base.clone().with_n_iterations(0), "n_iterations"),
        ] {
            match config.validate() {
                Err(VmcError::InvalidConfig { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected InvalidConfig for {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_bad_scalars_are_rejected() {
        let base = RunConfig::new();
        assert!(base.clone().with_step_size(0.0).validate().is_err());
        assert!(base.clone().with_step_size(-0.1).validate().is_err());
        assert!(base.clone().with_step_size(f64::INFINITY).validate().is_err());
        assert!(base.clone().with_alpha(f64::NAN).validate().is_err());
        assert!(base.clone().with_alpha(f64::NEG_INFINITY).validate().is_err());
        assert!(base.clone().with_learning_rate(-0.01).validate().is_err());
        assert!(base.clone().with_learning_rate(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_zero_learning_rate_and_negative_alpha_are_allowed() {
        let base = RunConfig::new();
        assert!(base.clone().with_learning_rate(0.0).validate().is_ok());
        assert!(base.clone().with_alpha(-0.5).validate().is_ok());
    }

    #[test]
    fn test_parse_yaml_with_original_names() {
        let yaml = "
simulation:
  numwalkers: 1000
  numsteps: 500
  equilibration_steps: 250
  alpha: 1.0
  learning_rate: 0.02
  step_size: 0.4
  iterations: 10
  seed: 9
  proposal: gaussian
output_dir: out
";
        let config: FileConfig = serde_yaml::from_str(yaml).unwrap();
        let sim = &config.simulation;
        assert_eq!(sim.n_walkers, 1000);
        assert_eq!(sim.n_steps, 500);
        assert_eq!(sim.n_equilibrate, 250);
        assert_eq!(sim.alpha, 1.0);
        assert_eq!(sim.learning_rate, 0.02);
        assert_eq!(sim.step_size, 0.4);
        assert_eq!(sim.n_iterations, 10);
        assert_eq!(sim.seed, Some(9));
        assert_eq!(sim.proposal, ProposalKind::Gaussian);
        assert_eq!(config.output_dir.as_deref(), Some("out"));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: FileConfig = serde_yaml::from_str("simulation:\n  n_walkers: 10\n").unwrap();
        assert_eq!(config.simulation.n_walkers, 10);
        assert_eq!(config.simulation.n_equilibrate, RunConfig::default().n_equilibrate);
        assert!(config.output_dir.is_none());
    }

    #[test]
    fn test_read_nonexistent_file() {
        match read_config("nonexistent_config.yml") {
            Err(VmcError::ConfigNotFound(path)) => assert_eq!(path.to_str(), Some("nonexistent_config.yml")),
            other => panic!("expected ConfigNotFound, got {:?}", other),
        }
    }
}
