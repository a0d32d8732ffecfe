//! fxvol CLI - FX implied volatility surface from the command line
//!
//! # Commands
//!
//! - `fxvol vol --market <file> --date <d> --strike <k> --cp <call|put>` - One implied vol
//! - `fxvol price --market <file> --date <d>... --strike <k>... --cp <..>...` - Vanilla prices
//! - `fxvol simulate --market <file> --sims <n>` - GBM spot paths over the pillars
//! - `fxvol calibrate --market <file>` - Heston fit per pillar smile
//! - `fxvol check` - Show the resolved configuration
//!
//! Configuration is layered: command-line flags over `FXVOL_*` environment
//! variables over the `--config` TOML file over defaults. `RUST_LOG`, when
//! set, replaces the configured log level.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use fxvol_core::types::{Date, DayCountConvention};
use fxvol_models::analytical::OptionType;
use fxvol_surface::{build_config, CliOverrides, SmileMethod};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod error;
mod market;

pub use error::{CliError, Result};

use commands::{OutputFormat, SurfaceOptions};

/// FX implied volatility surface CLI
#[derive(Parser)]
#[command(name = "fxvol")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Smile interpolation method (e.g. cubic_spline, heston_analytical_1993)
    #[arg(long, global = true, value_parser = parse_smile_method)]
    smile_method: Option<SmileMethod>,

    /// Day count basis (ACT/ACT, ACT/365, ACT/360, 30/360)
    #[arg(long, global = true, value_parser = parse_day_count)]
    day_count: Option<DayCountConvention>,

    /// Heston SSE above which a fit is rejected
    #[arg(long, global = true)]
    sse_threshold: Option<f64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up one implied volatility
    Vol {
        /// Path to market file (TOML)
        #[arg(short, long)]
        market: PathBuf,

        /// Expiry date (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date)]
        date: Date,

        /// Strike
        #[arg(short, long)]
        strike: f64,

        /// Option type
        #[arg(long, default_value = "call", value_parser = parse_option_type)]
        cp: OptionType,
    },

    /// Price European vanilla options
    Price {
        /// Path to market file (TOML)
        #[arg(short, long)]
        market: PathBuf,

        /// Expiry dates (YYYY-MM-DD), one per option
        #[arg(short, long, num_args = 1.., required = true, value_parser = parse_date)]
        date: Vec<Date>,

        /// Strikes, one per option
        #[arg(short, long, num_args = 1.., required = true, allow_negative_numbers = true)]
        strike: Vec<f64>,

        /// Option types, one per option or a single one for all
        #[arg(long, num_args = 1.., default_value = "call", value_parser = parse_option_type)]
        cp: Vec<OptionType>,

        /// Include analytical Greeks
        #[arg(long)]
        greeks: bool,

        /// Include intrinsic and time value
        #[arg(long)]
        split: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Simulate spot paths
    Simulate {
        /// Path to market file (TOML)
        #[arg(short, long)]
        market: PathBuf,

        /// Grid dates (YYYY-MM-DD); defaults to the pillar dates
        #[arg(short, long, num_args = 1.., value_parser = parse_date)]
        date: Vec<Date>,

        /// Number of paths
        #[arg(short = 'n', long, default_value = "10000")]
        sims: usize,

        /// Use antithetic variates
        #[arg(long)]
        antithetic: bool,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Calibrate Heston to every pillar smile
    Calibrate {
        /// Path to market file (TOML)
        #[arg(short, long)]
        market: PathBuf,

        /// Heston pricer (heston_1993, carr_madan_quadrature, carr_madan_fft)
        #[arg(short, long, default_value = "heston_1993")]
        pricer: String,

        /// Output file for calibrated parameters (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check configuration and, optionally, a market file
    Check {
        /// Market file to validate
        #[arg(short, long)]
        market: Option<PathBuf>,
    },
}

fn parse_date(s: &str) -> std::result::Result<Date, String> {
    Date::parse(s).map_err(|e| e.to_string())
}

fn parse_option_type(s: &str) -> std::result::Result<OptionType, String> {
    s.parse()
}

fn parse_day_count(s: &str) -> std::result::Result<DayCountConvention, String> {
    s.parse()
}

fn parse_smile_method(s: &str) -> std::result::Result<SmileMethod, String> {
    s.parse().map_err(|e: fxvol_surface::SurfaceError| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        config_file: cli.config.clone(),
        smile_method: cli.smile_method,
        day_count: cli.day_count,
        sse_threshold: cli.sse_threshold,
        log_level: cli.log_level.clone(),
    };
    let config = build_config(&overrides).context("failed to load configuration")?;

    // Initialise tracing
    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_filter_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }
    debug!(?config, "configuration resolved");

    let options = SurfaceOptions {
        config: &config,
        cli_day_count: cli.day_count.is_some(),
        cli_smile_method: cli.smile_method.is_some(),
    };

    match cli.command {
        Commands::Vol {
            market,
            date,
            strike,
            cp,
        } => commands::vol::run(&market, date, strike, cp, options)?,
        Commands::Price {
            market,
            date,
            strike,
            cp,
            greeks,
            split,
            format,
        } => commands::price::run(
            &market,
            commands::price::PriceRequest {
                dates: date,
                strikes: strike,
                option_types: cp,
                greeks,
                split,
            },
            format,
            options,
        )?,
        Commands::Simulate {
            market,
            date,
            sims,
            antithetic,
            seed,
            format,
        } => commands::simulate::run(
            &market,
            commands::simulate::SimulateRequest {
                dates: date,
                sims,
                antithetic,
                seed,
            },
            format,
            options,
        )?,
        Commands::Calibrate {
            market,
            pricer,
            output,
        } => commands::calibrate::run(&market, &pricer, output.as_deref(), options)?,
        Commands::Check { market } => commands::check::run(market.as_deref(), options)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_price_arguments() {
        let cli = Cli::try_parse_from([
            "fxvol", "--day-count", "ACT/365", "price", "--market", "m.toml", "--date",
            "2024-01-02", "2024-03-01", "--strike", "0.66", "0.67", "--cp", "put", "--greeks",
        ])
        .unwrap();
        assert_eq!(cli.day_count, Some(DayCountConvention::Actual365Fixed));
        match cli.command {
            Commands::Price {
                date, strike, cp, greeks, split, ..
            } => {
                assert_eq!(date.len(), 2);
                assert_eq!(strike, vec![0.66, 0.67]);
                assert_eq!(cp, vec![OptionType::Put]);
                assert!(greeks);
                assert!(!split);
            }
            _ => panic!("expected price"),
        }
    }

    #[test]
    fn test_bad_date_rejected() {
        assert!(Cli::try_parse_from([
            "fxvol", "vol", "--market", "m.toml", "--date", "2024-13-01", "--strike", "0.66"
        ])
        .is_err());
    }

    #[test]
    fn test_unknown_smile_method_rejected() {
        assert!(Cli::try_parse_from(["fxvol", "--smile-method", "quadratic", "check"]).is_err());
    }
}
