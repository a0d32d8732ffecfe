//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

pub mod calibrate;
pub mod check;
pub mod price;
pub mod simulate;
pub mod vol;

use std::path::Path;

use fxvol_surface::{SurfaceConfig, VolatilitySurface};
use tracing::info;

use crate::market::MarketFile;
use crate::{CliError, Result};

/// Flags shared by every command that loads a market file.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceOptions<'a> {
    /// Resolved configuration.
    pub config: &'a SurfaceConfig,
    /// Day count set on the command line.
    pub cli_day_count: bool,
    /// Smile method set on the command line.
    pub cli_smile_method: bool,
}

/// Loads `market` and builds its surface.
pub fn load_surface(market: &Path, options: SurfaceOptions<'_>) -> Result<VolatilitySurface> {
    info!("Loading market file: {}", market.display());
    let file = MarketFile::load(market)?;
    let builder = file
        .builder(options.config.clone(), options.cli_day_count, options.cli_smile_method)
        .map_err(|message| CliError::MarketFile {
            path: market.display().to_string(),
            message,
        })?;
    Ok(builder.build()?)
}

/// Output formats for tabular results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned text columns
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Formats a possibly-NaN number for table output.
pub(crate) fn cell(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.*}", decimals, value)
    }
}
