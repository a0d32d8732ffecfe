//! Core time, currency and error types.
//!
//! This module provides:
//! - `time`: `Date` and `DayCountConvention`
//! - `tenor`: FX market tenors (`ON`, `SP`, `1W`, `3M`, `1Y`, ...)
//! - `currency`: ISO 4217 currency codes
//! - `currency_pair`: six-letter foreign/domestic pair codes
//! - `error`: Structured error types for dates, currencies, interpolation, solvers and quadrature

pub mod currency;
pub mod currency_pair;
pub mod error;
pub mod tenor;
pub mod time;

pub use currency::Currency;
pub use currency_pair::CurrencyPair;
pub use error::{
    CurrencyError, DateError, IntegrationError, InterpolationError, SolverError, TenorError,
};
pub use tenor::Tenor;
pub use time::{Date, DayCountConvention};
