//! # fxvol_surface: FX implied volatility surface
//!
//! Top library layer. Turns market quotes into a queryable surface:
//! - `pillar`: quoted expiries resolved to dates, delta buckets solved to strikes
//! - `grid`: flat-forward interpolation onto every calendar day
//! - `smile`: per-day smiles (spline or Heston) behind a lazy cache
//! - `surface`: the builder and the pricing, simulation and calibration facade
//! - `config`: defaults, TOML files, `FXVOL_*` environment variables and CLI overrides
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use fxvol_core::market_data::FlatZeroCurve;
//! use fxvol_core::types::{Date, DayCountConvention};
//! use fxvol_models::analytical::{DeltaConvention, OptionType};
//! use fxvol_surface::{DeltaBucket, ForwardPoint, PillarQuote, VolatilitySurfaceBuilder};
//!
//! let today = Date::from_ymd(2023, 6, 30).unwrap();
//! let dc = DayCountConvention::ActualActual;
//! let smile = |atm: f64| {
//!     [
//!         (DeltaBucket::Put25, atm + 0.005),
//!         (DeltaBucket::AtmDeltaNeutral, atm),
//!         (DeltaBucket::Call25, atm + 0.001),
//!     ]
//! };
//!
//! let surface = VolatilitySurfaceBuilder::new(
//!     today,
//!     "AUDUSD",
//!     Arc::new(FlatZeroCurve::new(today, dc, 0.0466)),
//!     Arc::new(FlatZeroCurve::new(today, dc, 0.0538)),
//! )
//! .forward_points(vec![
//!     ForwardPoint::on(today, 0.6629),
//!     ForwardPoint::on(Date::from_ymd(2024, 7, 5).unwrap(), 0.6676),
//! ])
//! .pillars(vec![
//!     PillarQuote::new("3M".parse().unwrap(), DeltaConvention::RegularSpot, smile(0.105)),
//!     PillarQuote::new("1Y".parse().unwrap(), DeltaConvention::RegularForward, smile(0.110)),
//! ])
//! .build()
//! .unwrap();
//!
//! let expiry = Date::from_ymd(2024, 1, 2).unwrap();
//! let priced = surface
//!     .price_vanilla(&[expiry], &[0.67], &[OptionType::Call], true, false)
//!     .unwrap();
//! assert!(priced[0].price > 0.0);
//! assert!(priced[0].greeks.is_some());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod bucket;
pub mod config;
pub mod error;
pub mod grid;
pub mod pillar;
pub mod smile;
pub mod surface;

pub use bucket::DeltaBucket;
pub use config::{build_config, CliOverrides, ConfigError, LogLevel, SurfaceConfig};
pub use error::{SurfaceError, SurfaceResult};
pub use grid::{flat_forward_interp, forward_volatility, DailyRow, DailyVolatilityGrid};
pub use pillar::{Expiry, PillarQuote, PillarTable, StrikePillar, VolatilityPillar};
pub use smile::{SmileCache, SmileFit, SmileMethod};
pub use surface::{
    ForwardPoint, MarketSnapshot, PathDiagnostics, PillarSmileReport, SimulatedPaths,
    SimulationMethod, VanillaPrice, VolatilitySurface, VolatilitySurfaceBuilder,
};
