//! Calibrate command implementation
//!
//! Fits Heston to each pillar smile of the market file.

use std::path::Path;

use fxvol_models::heston::HestonPricer;
use tracing::info;

use super::SurfaceOptions;
use crate::{CliError, Result};

/// Run the calibrate command
pub fn run(
    market: &Path,
    pricer: &str,
    output: Option<&Path>,
    options: SurfaceOptions<'_>,
) -> Result<()> {
    let pricer: HestonPricer = pricer
        .parse()
        .map_err(|e| CliError::InvalidArgument(format!("{}", e)))?;
    let surface = super::load_surface(market, options)?;

    info!("Calibrating Heston with {}", pricer.name());
    let reports = surface.calibrate_pillar_smiles(pricer)?;

    println!(
        "{:<6} {:<12} {:>9} {:>8} {:>8} {:>9} {:>7} {:>10} {:>5}",
        "Tenor", "Expiry", "v0", "vv", "kappa", "theta", "rho", "SSE", "Conv"
    );
    for r in &reports {
        let flag = if r.sse < options.config.sse_threshold { "" } else { " (poor fit)" };
        println!(
            "{:<6} {:<12} {:>9.6} {:>8.4} {:>8.4} {:>9.6} {:>7.3} {:>10.3e} {:>5}{}",
            r.tenor_name,
            r.date.to_string(),
            r.params.v0,
            r.params.vv,
            r.params.kappa,
            r.params.theta,
            r.params.rho,
            r.sse,
            r.converged,
            flag
        );
    }

    if let Some(path) = output {
        info!("Writing calibrated parameters to: {}", path.display());
        std::fs::write(path, serde_json::to_string_pretty(&reports)?)?;
    }

    info!("Calibration complete");
    Ok(())
}
