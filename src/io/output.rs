//! CSV persistence of walker positions and optimization trajectories.

use std::fs::{self, File};
use std::path::Path;

use csv::Writer;
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::sampling::VmcResults;

#[derive(Serialize)]
struct PositionRow {
    position: f64,
}

#[derive(Serialize)]
struct AlphaRow {
    iteration: usize,
    alpha: f64,
}

#[derive(Serialize)]
struct EnergyRow {
    iteration: usize,
    energy: f64,
}

fn write_rows<P: AsRef<Path>, T: Serialize>(path: P, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut wtr = Writer::from_writer(File::create(path)?);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `final_positions.csv`, `initial_positions.csv`, `alpha_evolution.csv`,
/// `energy_evolution.csv` and `iterations.csv` into `output_dir`.
pub fn write_results<P: AsRef<Path>>(results: &VmcResults, output_dir: P) -> Result<()> {
    let dir = output_dir.as_ref();
    fs::create_dir_all(dir)?;

    write_rows(
        dir.join("final_positions.csv"),
        results.final_positions.iter().map(|&position| PositionRow { position }),
    )?;
    write_rows(
        dir.join("initial_positions.csv"),
        results.initial_positions.iter().map(|&position| PositionRow { position }),
    )?;
    write_rows(
        dir.join("alpha_evolution.csv"),
        results.alpha_trajectory().into_iter().map(|(iteration, alpha)| AlphaRow { iteration, alpha }),
    )?;
    write_rows(
        dir.join("energy_evolution.csv"),
        results.energy_trajectory().into_iter().map(|(iteration, energy)| EnergyRow { iteration, energy }),
    )?;
    write_rows(dir.join("iterations.csv"), results.history.iter())?;

    info!("Values saved to {}", dir.display());
    Ok(())
}
