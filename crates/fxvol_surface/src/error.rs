//! Surface error types.

use fxvol_core::market_data::MarketDataError;
use fxvol_core::types::{Date, DateError};
use fxvol_models::analytical::AnalyticalError;
use fxvol_models::heston::HestonError;
use fxvol_models::simulation::SimulationError;
use fxvol_models::ModelError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while building or querying a volatility surface.
///
/// # Examples
///
/// ```
/// use fxvol_core::types::Date;
/// use fxvol_surface::SurfaceError;
///
/// let err = SurfaceError::PoorCalibrationFit {
///     date: Date::from_ymd(2023, 9, 29).unwrap(),
///     sse: 0.0042,
/// };
/// assert!(err.to_string().contains("2023-09-29"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    /// The pair code is malformed or names an unknown currency.
    #[error("Invalid currency pair: {0}")]
    InvalidCurrencyPair(String),

    /// The forward curve has no quote on the curve date.
    #[error("Forward curve has no spot quote on the curve date {curve_date}")]
    MissingSpotQuote {
        /// The curve date
        curve_date: Date,
    },

    /// Pillar quotes are missing, inconsistent or unresolvable.
    #[error("Invalid pillar input: {0}")]
    InvalidPillarInput(String),

    /// Flat-forward interpolation produced a negative variance.
    #[error("Negative variance {variance} at t = {tau}")]
    NegativeVariance {
        /// Year fraction at which the variance went negative
        tau: f64,
        /// The offending variance
        variance: f64,
    },

    /// A Heston smile fit left too large a residual.
    #[error("Heston fit on {date} is likely poor: SSE {sse:.6}")]
    PoorCalibrationFit {
        /// Date of the smile
        date: Date,
        /// Sum of squared vol errors
        sse: f64,
    },

    /// Batch inputs of different lengths.
    #[error("Shape mismatch: {dates} dates, {strikes} strikes, {option_types} option types")]
    ShapeMismatch {
        /// Number of dates
        dates: usize,
        /// Number of strikes
        strikes: usize,
        /// Number of call/put flags
        option_types: usize,
    },

    /// A query date outside the pillar range.
    #[error("Date {date} outside volatility range [{first}, {last}]")]
    OutOfRangeQuery {
        /// The query date
        date: Date,
        /// First pillar date
        first: Date,
        /// Last pillar date
        last: Date,
    },

    /// A fitted smile gave no usable vol at a query strike.
    ///
    /// Raised at query time, after construction succeeded.
    #[error("Smile on {date} has no valid vol at strike {strike}: {reason}")]
    InvalidSmileQuery {
        /// Date of the smile
        date: Date,
        /// The query strike
        strike: f64,
        /// What went wrong
        reason: String,
    },

    /// A recognised method with no implementation.
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Invalid surface configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Date arithmetic failure.
    #[error(transparent)]
    Date(#[from] DateError),

    /// Forward or zero curve failure.
    #[error(transparent)]
    Market(#[from] MarketDataError),

    /// Pricing, calibration or simulation failure.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<AnalyticalError> for SurfaceError {
    fn from(err: AnalyticalError) -> Self {
        SurfaceError::Model(err.into())
    }
}

impl From<HestonError> for SurfaceError {
    fn from(err: HestonError) -> Self {
        SurfaceError::Model(err.into())
    }
}

impl From<SimulationError> for SurfaceError {
    fn from(err: SimulationError) -> Self {
        SurfaceError::Model(err.into())
    }
}

/// Surface result alias.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_errors_nest_under_model() {
        let err: SurfaceError = AnalyticalError::InvalidSpot { spot: -1.0 }.into();
        assert!(matches!(
            err,
            SurfaceError::Model(ModelError::Analytical(_))
        ));
    }

    #[test]
    fn test_out_of_range_message() {
        let d = |m, day| Date::from_ymd(2024, m, day).unwrap();
        let err = SurfaceError::OutOfRangeQuery {
            date: d(1, 2),
            first: d(3, 1),
            last: d(12, 31),
        };
        assert_eq!(
            err.to_string(),
            "Date 2024-01-02 outside volatility range [2024-03-01, 2024-12-31]"
        );
    }
}
