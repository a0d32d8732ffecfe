//! Error types for analytical pricing operations.
//!
//! This module provides:
//! - `AnalyticalError`: Errors from Garman-Kohlhagen pricing, strike solving
//!   and implied volatility inversion

use fxvol_core::types::SolverError;
use thiserror::Error;

/// Analytical pricing errors.
///
/// # Variants
/// - `InvalidVolatility`: Non-positive or non-finite volatility
/// - `InvalidSpot`: Non-positive spot or forward
/// - `InvalidStrike`: Non-positive strike
/// - `InvalidExpiry`: Non-positive time to expiry
/// - `UnattainableDelta`: No strike produces the requested delta
/// - `ImpliedVolFailed`: Neither Newton nor Brent recovered a volatility
/// - `UnknownConvention`: A delta convention label was not recognised
///
/// # Examples
/// ```
/// use fxvol_models::analytical::AnalyticalError;
///
/// let err = AnalyticalError::InvalidVolatility { volatility: -0.2 };
/// assert!(format!("{}", err).contains("volatility"));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyticalError {
    /// Invalid volatility (non-positive).
    #[error("Invalid volatility: σ = {volatility}")]
    InvalidVolatility {
        /// The invalid volatility value
        volatility: f64,
    },

    /// Invalid spot or forward rate.
    #[error("Invalid spot price: S = {spot}")]
    InvalidSpot {
        /// The invalid spot value
        spot: f64,
    },

    /// Invalid strike.
    #[error("Invalid strike: K = {strike}")]
    InvalidStrike {
        /// The invalid strike value
        strike: f64,
    },

    /// Invalid time to expiry.
    #[error("Invalid expiry: τ = {tau}")]
    InvalidExpiry {
        /// The invalid year fraction
        tau: f64,
    },

    /// The requested delta cannot be reached under the convention.
    #[error("Delta {delta} is unattainable under {convention} at σ = {volatility}")]
    UnattainableDelta {
        /// Signed target delta
        delta: f64,
        /// Convention label
        convention: String,
        /// Volatility used
        volatility: f64,
    },

    /// Implied volatility inversion failed.
    #[error("Implied volatility not found for price {price} at K = {strike}: {source}")]
    ImpliedVolFailed {
        /// Target price
        price: f64,
        /// Strike
        strike: f64,
        /// Error from the fallback solver
        source: SolverError,
    },

    /// Unrecognised delta convention label.
    #[error("Unknown delta convention: {0}")]
    UnknownConvention(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_volatility_display() {
        let err = AnalyticalError::InvalidVolatility { volatility: -0.2 };
        assert_eq!(format!("{}", err), "Invalid volatility: σ = -0.2");
    }

    #[test]
    fn test_invalid_spot_display() {
        let err = AnalyticalError::InvalidSpot { spot: -100.0 };
        assert_eq!(format!("{}", err), "Invalid spot price: S = -100");
    }

    #[test]
    fn test_unattainable_delta_display() {
        let err = AnalyticalError::UnattainableDelta {
            delta: 0.95,
            convention: "premium_adjusted_forward".to_string(),
            volatility: 0.5,
        };
        let msg = err.to_string();
        assert!(msg.contains("0.95"));
        assert!(msg.contains("premium_adjusted_forward"));
    }

    #[test]
    fn test_implied_vol_failed_carries_source() {
        let err = AnalyticalError::ImpliedVolFailed {
            price: 1.0,
            strike: 0.5,
            source: SolverError::NoBracket { a: 1e-4, b: 5.0 },
        };
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_clone_and_equality() {
        let err1 = AnalyticalError::InvalidVolatility { volatility: 0.1 };
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
