//! Heston model errors.

use fxvol_core::types::{IntegrationError, SolverError};
use thiserror::Error;

use crate::analytical::AnalyticalError;

/// Errors from Heston parameter validation, pricing and calibration.
///
/// # Examples
/// ```
/// use fxvol_models::heston::HestonError;
///
/// let err = HestonError::InvalidRho(1.5);
/// assert!(err.to_string().contains("1.5"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HestonError {
    /// Initial variance must be positive.
    #[error("Invalid initial variance: v0 = {0} (must be positive)")]
    InvalidV0(f64),

    /// Long-run variance must be positive.
    #[error("Invalid long-run variance: theta = {0} (must be positive)")]
    InvalidTheta(f64),

    /// Mean reversion speed must be positive.
    #[error("Invalid mean reversion: kappa = {0} (must be positive)")]
    InvalidKappa(f64),

    /// Volatility of variance must be positive.
    #[error("Invalid vol-of-vol: vv = {0} (must be positive)")]
    InvalidVolOfVol(f64),

    /// Correlation must lie in [-1, 1].
    #[error("Invalid correlation: rho = {0} (must be in [-1, 1])")]
    InvalidRho(f64),

    /// Market price of volatility risk must keep kappa + lambda positive.
    #[error("Invalid volatility risk premium: lambda = {lambda} with kappa = {kappa}")]
    InvalidLambda {
        /// Risk premium
        lambda: f64,
        /// Mean reversion speed
        kappa: f64,
    },

    /// A pricer setting is out of range.
    #[error("Invalid pricer configuration: {0}")]
    InvalidConfig(String),

    /// A strike lies outside the FFT log-strike grid.
    #[error("Strike {strike} outside the FFT grid [{low}, {high}]")]
    StrikeOutsideGrid {
        /// Requested strike
        strike: f64,
        /// Lowest grid strike
        low: f64,
        /// Highest grid strike
        high: f64,
    },

    /// A pricer produced NaN or infinity.
    #[error("Non-finite Heston price at strike {strike}")]
    NonFinitePrice {
        /// Requested strike
        strike: f64,
    },

    /// Calibration inputs are inconsistent.
    #[error("Calibration input mismatch: {0}")]
    InvalidQuotes(String),

    /// Numerical integration failed.
    #[error("Integration failed: {0}")]
    Integration(#[from] IntegrationError),

    /// Least-squares solver failed.
    #[error("Calibration solver failed: {0}")]
    Solver(#[from] SolverError),

    /// Black-Scholes inversion of a model price failed.
    #[error(transparent)]
    Analytical(#[from] AnalyticalError),
}
