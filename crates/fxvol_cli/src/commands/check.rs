//! Check command implementation
//!
//! Prints the resolved configuration and, optionally, validates a market file.

use std::path::Path;

use tracing::info;

use super::SurfaceOptions;
use crate::Result;

/// Run the check command
pub fn run(market: Option<&Path>, options: SurfaceOptions<'_>) -> Result<()> {
    let config = options.config;
    println!("fxvol {}", env!("CARGO_PKG_VERSION"));
    println!("  day count:          {}", config.day_count);
    println!("  smile method:       {}", config.smile_method);
    println!("  sse threshold:      {}", config.sse_threshold);
    println!("  flat extrapolation: {}", config.flat_extrapolation);
    println!("  heston integration: [0, {}], tol {}", config.heston.integration_limit, config.heston.tolerance);
    println!(
        "  heston fft:         n = {}, eta = {}, alpha = {}",
        config.heston.fft_points, config.heston.fft_eta, config.heston.alpha
    );
    println!("  log level:          {}", config.log_level);

    if let Some(path) = market {
        let surface = super::load_surface(path, options)?;
        println!("market {}: OK", path.display());
        println!("  pair:       {}", surface.pair());
        println!("  curve date: {}", surface.curve_date());
        println!("  spot date:  {}", surface.spot_date());
        println!("  spot:       {}", surface.spot());
        match surface.pillars() {
            Some(table) => println!(
                "  pillars:    {} ({} to {}, {} buckets)",
                table.len(),
                table.first_date(),
                table.last_date(),
                table.buckets().len()
            ),
            None => println!("  pillars:    none"),
        }
    }

    info!("Check complete");
    Ok(())
}
