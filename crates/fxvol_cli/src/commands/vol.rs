//! Vol command implementation
//!
//! Looks up one implied volatility on the surface.

use fxvol_core::types::Date;
use fxvol_models::analytical::OptionType;
use tracing::info;

use super::SurfaceOptions;
use crate::Result;

/// Run the vol command
pub fn run(
    market: &std::path::Path,
    date: Date,
    strike: f64,
    option_type: OptionType,
    options: SurfaceOptions<'_>,
) -> Result<()> {
    let surface = super::load_surface(market, options)?;
    let vol = surface.smile(date)?.implied_vol(strike, option_type)?;
    info!("Smile method: {}", surface.smile_method());
    println!(
        "{} {} K={} {:?}: {:.6}",
        surface.pair(),
        date,
        strike,
        option_type,
        vol
    );
    Ok(())
}
