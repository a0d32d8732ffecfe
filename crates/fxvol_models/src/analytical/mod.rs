//! Analytical pricing formulas for European FX options.
//!
//! This module provides:
//! - Standard normal distribution functions
//! - Garman-Kohlhagen price, Greeks and intrinsic/time value split
//! - The four FX delta conventions and delta-to-strike conversion
//! - Implied volatility inversion
//!
//! ## Design Principles
//!
//! - **Forward-based formulas**: A quoted forward can replace covered
//!   interest parity everywhere through [`FxMarket::with_forward`]
//! - **Solve in d2-space**: Strike solving brackets a bounded variable
//!   instead of guessing a strike scale

pub mod delta;
pub mod distributions;
pub mod error;
pub mod garman_kohlhagen;
pub mod implied_vol;
pub mod market;
pub mod strike;

// Re-export main types at module level
pub use delta::DeltaConvention;
pub use distributions::{norm_cdf, norm_pdf};
pub use error::AnalyticalError;
pub use garman_kohlhagen::{gk_price, GarmanKohlhagen, GarmanKohlhagenParams, Greeks, IntrinsicSplit};
pub use implied_vol::{solve_implied_vol, MAX_IMPLIED_VOL, MIN_IMPLIED_VOL};
pub use market::{FxMarket, OptionType};
pub use strike::solve_strike;
