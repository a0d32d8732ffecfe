//! Market data error types.

use crate::types::{Date, InterpolationError, TenorError};
use thiserror::Error;

/// Market data construction and lookup errors.
///
/// # Examples
///
/// ```
/// use fxvol_core::market_data::MarketDataError;
/// use fxvol_core::types::Date;
///
/// let err = MarketDataError::MissingSpotQuote { curve_date: Date::from_ymd(2023, 6, 30).unwrap() };
/// assert!(err.to_string().contains("2023-06-30"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// The forward curve has no quote on the curve date.
    #[error("Forward curve has no spot quote on the curve date {curve_date}")]
    MissingSpotQuote {
        /// The curve date
        curve_date: Date,
    },

    /// A query date lies outside the curve and extrapolation is off.
    #[error("Date {date} outside curve range [{first}, {last}]")]
    OutOfRange {
        /// The query date
        date: Date,
        /// First curve date
        first: Date,
        /// Last curve date
        last: Date,
    },

    /// A rate that must be strictly positive is not.
    #[error("Invalid rate {rate} on {date}")]
    InvalidRate {
        /// Date of the offending quote
        date: Date,
        /// The rate
        rate: f64,
    },

    /// The same date appears twice.
    #[error("Duplicate date {0}")]
    DuplicateDate(Date),

    /// A quote dated before the curve date.
    #[error("Date {date} precedes the curve date {curve_date}")]
    BeforeCurveDate {
        /// The offending date
        date: Date,
        /// The curve date
        curve_date: Date,
    },

    /// Insufficient data for construction.
    #[error("Insufficient data: got {got}, need {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// Interpolation error.
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// A tenor could not be resolved.
    #[error(transparent)]
    Tenor(#[from] TenorError),
}
