//! Price command implementation
//!
//! Prices European vanillas off the surface with Garman-Kohlhagen.

use fxvol_core::types::Date;
use fxvol_models::analytical::OptionType;
use tracing::info;

use super::{cell, OutputFormat, SurfaceOptions};
use crate::{CliError, Result};

/// Batch to price.
#[derive(Debug, Clone)]
pub struct PriceRequest {
    /// Expiries
    pub dates: Vec<Date>,
    /// Strikes
    pub strikes: Vec<f64>,
    /// Option types; a single value applies to every row
    pub option_types: Vec<OptionType>,
    /// Include Greeks
    pub greeks: bool,
    /// Include intrinsic and time value
    pub split: bool,
}

/// Run the price command
pub fn run(
    market: &std::path::Path,
    request: PriceRequest,
    format: OutputFormat,
    options: SurfaceOptions<'_>,
) -> Result<()> {
    let n = request.dates.len();
    let option_types = match request.option_types.as_slice() {
        [single] => vec![*single; n],
        many => many.to_vec(),
    };
    if request.strikes.len() != n || option_types.len() != n {
        return Err(CliError::InvalidArgument(format!(
            "{} dates, {} strikes and {} option types: counts must match",
            n,
            request.strikes.len(),
            option_types.len()
        )));
    }

    let surface = super::load_surface(market, options)?;
    info!("Pricing {} options", n);
    let results = surface.price_vanilla(
        &request.dates,
        &request.strikes,
        &option_types,
        request.greeks,
        request.split,
    )?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Table => {
            print!(
                "{:<12} {:>9} {:<5} {:>9} {:>11}",
                "Expiry", "Strike", "Type", "Vol", "Price"
            );
            if request.greeks {
                print!(" {:>9} {:>9} {:>9} {:>10}", "Delta", "Gamma", "Vega", "Theta");
            }
            if request.split {
                print!(" {:>11} {:>11}", "Intrinsic", "Time");
            }
            println!();
            for r in &results {
                print!(
                    "{:<12} {:>9.5} {:<5} {:>9} {:>11}",
                    r.expiry.to_string(),
                    r.strike,
                    if r.option_type.is_call() { "call" } else { "put" },
                    cell(r.market.volatility, 5),
                    cell(r.price, 8)
                );
                if let Some(g) = r.greeks {
                    print!(
                        " {:>9} {:>9} {:>9} {:>10}",
                        cell(g.delta, 5),
                        cell(g.gamma, 4),
                        cell(g.vega, 6),
                        cell(g.theta, 7)
                    );
                }
                if let Some(s) = r.split {
                    print!(" {:>11} {:>11}", cell(s.intrinsic, 8), cell(s.time_value, 8));
                }
                println!();
            }
        }
    }

    info!("Pricing complete");
    Ok(())
}
