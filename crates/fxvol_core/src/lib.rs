//! # fxvol_core: foundation layer for the FX volatility surface
//!
//! The bottom layer of the workspace. It has no dependency on other fxvol
//! crates and provides:
//! - Dates, day counts and FX tenors (`types::time`, `types::tenor`)
//! - Currencies and currency pairs with spot conventions (`types::currency`,
//!   `types::currency_pair`)
//! - Error types for every layer-1 concern (`types::error`)
//! - Interpolators, root finders, least squares and quadrature (`math`)
//! - Zero curves and the FX forward curve (`market_data`)
//!
//! ## Usage
//!
//! ```rust
//! use fxvol_core::market_data::ForwardCurve;
//! use fxvol_core::types::{CurrencyPair, Date, DayCountConvention, Tenor};
//!
//! let curve_date = Date::from_ymd(2023, 6, 30).unwrap();
//! let pair: CurrencyPair = "AUDUSD".parse().unwrap();
//! let spot_date = pair.spot_date(curve_date).unwrap();
//! let one_year = "1Y".parse::<Tenor>().unwrap().resolve(curve_date, spot_date).unwrap();
//!
//! let forwards = ForwardCurve::new(
//!     curve_date,
//!     DayCountConvention::ActualActual,
//!     &[(curve_date, 0.662866), (one_year, 0.667849)],
//! )
//! .unwrap();
//! assert_eq!(forwards.spot(), 0.662866);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): serialisation for dates, currencies, tenors and enums

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market_data;
pub mod math;
pub mod types;
