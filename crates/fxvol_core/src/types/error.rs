//! Error types for structured error handling.
//!
//! This module provides:
//! - `DateError`: Errors from date construction and parsing
//! - `TenorError`: Errors from tenor parsing and resolution
//! - `CurrencyError`: Errors from currency and currency-pair parsing
//! - `InterpolationError`: Errors from interpolation operations
//! - `SolverError`: Errors from root-finding and least-squares solvers
//! - `IntegrationError`: Errors from numerical quadrature

use std::fmt;
use thiserror::Error;

/// Date-related errors.
///
/// # Variants
/// - `InvalidDate`: Invalid date components (e.g., February 30th)
/// - `ParseError`: Failed to parse date string
/// - `Overflow`: Date arithmetic left chrono's representable range
///
/// # Examples
/// ```
/// use fxvol_core::types::DateError;
///
/// let err = DateError::InvalidDate { year: 2024, month: 2, day: 30 };
/// assert_eq!(format!("{}", err), "Invalid date: 2024-2-30");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Invalid date components (e.g., February 30th).
    InvalidDate {
        /// Year component
        year: i32,
        /// Month component (1-12)
        month: u32,
        /// Day component (1-31)
        day: u32,
    },

    /// Failed to parse date string.
    ParseError(String),

    /// Date arithmetic overflowed.
    Overflow(String),
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateError::InvalidDate { year, month, day } => {
                write!(f, "Invalid date: {}-{}-{}", year, month, day)
            }
            DateError::ParseError(msg) => write!(f, "Date parse error: {}", msg),
            DateError::Overflow(msg) => write!(f, "Date arithmetic overflow: {}", msg),
        }
    }
}

impl std::error::Error for DateError {}

/// Tenor parsing and resolution errors.
///
/// # Examples
/// ```
/// use fxvol_core::types::TenorError;
///
/// let err = TenorError::Unrecognised("3Q".to_string());
/// assert!(format!("{}", err).contains("3Q"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TenorError {
    /// The tenor label could not be parsed.
    #[error("Unrecognised tenor: {0}")]
    Unrecognised(String),

    /// The tenor could not be applied to a date.
    #[error(transparent)]
    Date(#[from] DateError),
}

/// Currency-related errors.
///
/// # Variants
/// - `UnknownCurrency`: Unknown ISO 4217 code
/// - `InvalidPairCode`: A pair code that is not six ASCII letters
/// - `SameCurrency`: Foreign and domestic currencies are the same
///
/// # Examples
/// ```
/// use fxvol_core::types::CurrencyError;
///
/// let err = CurrencyError::UnknownCurrency("XYZ".to_string());
/// assert_eq!(format!("{}", err), "Unknown currency: XYZ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    /// Unknown currency code.
    UnknownCurrency(String),

    /// Malformed six-letter pair code.
    InvalidPairCode(String),

    /// Foreign and domestic currencies are the same.
    SameCurrency(String),
}

impl fmt::Display for CurrencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrencyError::UnknownCurrency(code) => write!(f, "Unknown currency: {}", code),
            CurrencyError::InvalidPairCode(code) => write!(
                f,
                "Invalid currency pair '{}': expected six letters (foreign then domestic)",
                code
            ),
            CurrencyError::SameCurrency(code) => {
                write!(f, "Foreign and domestic currencies are the same: {}", code)
            }
        }
    }
}

impl std::error::Error for CurrencyError {}

/// Interpolation-related errors.
///
/// # Examples
/// ```
/// use fxvol_core::types::InterpolationError;
///
/// let err = InterpolationError::OutOfBounds { x: 5.0, min: 0.0, max: 3.0 };
/// assert!(format!("{}", err).contains("outside valid domain"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationError {
    /// Query point outside valid interpolation domain.
    #[error("Query point {x} outside valid domain [{min}, {max}]")]
    OutOfBounds {
        /// The query point that was out of bounds
        x: f64,
        /// Minimum valid value
        min: f64,
        /// Maximum valid value
        max: f64,
    },

    /// Insufficient data points for interpolation.
    #[error("Insufficient data points: got {got}, need at least {need}")]
    InsufficientData {
        /// Number of points provided
        got: usize,
        /// Minimum number of points required
        need: usize,
    },

    /// Abscissae are not strictly increasing.
    #[error("Data is not strictly increasing at index {index}")]
    NonMonotonicData {
        /// Index where monotonicity violation was detected
        index: usize,
    },

    /// Invalid input data or parameters.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Root-finding and optimisation solver errors.
///
/// # Examples
/// ```
/// use fxvol_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 100 };
/// assert!(format!("{}", err).contains("100 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverError {
    /// Solver failed to converge within maximum iterations.
    #[error("Failed to converge after {iterations} iterations")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
    },

    /// Derivative near zero (division by zero risk in Newton-Raphson).
    #[error("Derivative near zero at x = {x}")]
    DerivativeNearZero {
        /// The x value where derivative was near zero
        x: f64,
    },

    /// No valid bracket (function values at endpoints have same sign).
    #[error("No bracket: f({a}) and f({b}) have same sign")]
    NoBracket {
        /// Left bracket endpoint
        a: f64,
        /// Right bracket endpoint
        b: f64,
    },

    /// Numerical instability during computation.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

/// Numerical quadrature errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrationError {
    /// The integrand returned NaN or infinity.
    #[error("Integrand is not finite at x = {x}")]
    NonFinite {
        /// Abscissa of the offending evaluation
        x: f64,
    },

    /// The error target was not reached within the subdivision limit.
    #[error("Tolerance not reached after {limit} subdivisions (estimated error {error:e})")]
    SubdivisionLimit {
        /// Maximum number of subintervals
        limit: usize,
        /// Error estimate at termination
        error: f64,
    },

    /// The integration bounds are not finite.
    #[error("Invalid integration interval [{a}, {b}]")]
    InvalidInterval {
        /// Lower bound
        a: f64,
        /// Upper bound
        b: f64,
    },
}
