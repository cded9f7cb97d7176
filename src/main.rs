use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rust_vmc::{read_config, write_results, AlphaOptimizer, ProposalKind, Result, RunConfig, Slater1D};

/// Variational Monte Carlo for the ground state of a 1D hydrogen-like system
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Number of Monte Carlo walkers
    #[arg(long)]
    numwalkers: Option<usize>,

    /// Metropolis measurement steps per iteration
    #[arg(long)]
    numsteps: Option<usize>,

    /// Equilibration steps at the start of every iteration
    #[arg(long)]
    equilibration_steps: Option<usize>,

    /// Initial variational parameter α
    #[arg(long, allow_negative_numbers = true)]
    alpha: Option<f64>,

    /// Learning rate for the α update
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Metropolis step size
    #[arg(long)]
    step_size: Option<f64>,

    /// Number of α optimization iterations
    #[arg(long)]
    iterations: Option<usize>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Proposal distribution
    #[arg(long, value_enum)]
    proposal: Option<ProposalKind>,

    /// Directory to save outputs (default: ./results)
    #[arg(short, long)]
    output_dir: Option<String>,
}

impl Args {
    /// Config file (or defaults) overridden by any command-line values.
    fn resolve(&self) -> Result<(RunConfig, PathBuf)> {
        let file = match &self.config {
            Some(path) => read_config(path)?,
            None => Default::default(),
        };
        let mut run = file.simulation;
        if let Some(n) = self.numwalkers { run.n_walkers = n; }
        if let Some(n) = self.numsteps { run.n_steps = n; }
        if let Some(n) = self.equilibration_steps { run.n_equilibrate = n; }
        if let Some(a) = self.alpha { run.alpha = a; }
        if let Some(lr) = self.learning_rate { run.learning_rate = lr; }
        if let Some(s) = self.step_size { run.step_size = s; }
        if let Some(n) = self.iterations { run.n_iterations = n; }
        if let Some(seed) = self.seed { run.seed = Some(seed); }
        if let Some(p) = self.proposal { run.proposal = p; }

        let output_dir = self.output_dir.clone()
            .or(file.output_dir)
            .unwrap_or_else(|| "results".to_string());
        Ok((run, PathBuf::from(output_dir)))
    }
}

fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var)
}

fn run(args: &Args) -> Result<()> {
    let (config, output_dir) = args.resolve()?;
    let results = AlphaOptimizer::new(Slater1D, config)?.run()?;

    let (pos_mean, pos_var) = mean_and_variance(&results.final_positions);
    let energies: Vec<f64> = results.energy_trajectory().into_iter().map(|(_, e)| e).collect();
    let (e_mean, e_var) = mean_and_variance(&energies);

    info!("Expected α = 1, expected energy = -1/2 Ha");
    info!("Final optimized α: {:.3}", results.final_alpha);
    info!("Mean final position: {:.3}", pos_mean);
    info!("Variance of final positions: {:.3}", pos_var);
    info!("Mean local energy: {:.3}", e_mean);
    info!("Variance of mean local energy: {:.3}", e_var);
    info!("Seed: {}", results.seed);

    write_results(&results, &output_dir)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
