//! # fxvol_models: pricing models for the FX volatility surface
//!
//! Builds on `fxvol_core` and provides:
//! - `analytical`: Garman-Kohlhagen prices and greeks, FX delta
//!   conventions, delta-to-strike and implied volatility solvers
//! - `heston`: Heston parameters, Fourier pricers and smile calibration
//! - `simulation`: seeded GBM and Heston QE path simulation
//!
//! ## Usage
//!
//! ```rust
//! use fxvol_models::analytical::{gk_price, solve_strike, DeltaConvention, FxMarket, OptionType};
//!
//! let market = FxMarket::new(0.6662, 1.0, 0.04655, 0.05376).unwrap();
//! let strike = solve_strike(&market, 0.1064786, -0.3, DeltaConvention::RegularSpot).unwrap();
//! let premium = gk_price(market, OptionType::Put, strike, 0.1064786).unwrap();
//! assert!(premium > 0.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): serialisation for parameters, conventions and results

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod heston;
pub mod simulation;

use thiserror::Error;

/// Any error raised by this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Garman-Kohlhagen, delta or solver failure.
    #[error(transparent)]
    Analytical(#[from] analytical::AnalyticalError),

    /// Heston validation, pricing or calibration failure.
    #[error(transparent)]
    Heston(#[from] heston::HestonError),

    /// Path simulation failure.
    #[error(transparent)]
    Simulation(#[from] simulation::SimulationError),
}
