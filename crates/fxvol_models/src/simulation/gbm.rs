//! Geometric Brownian motion with piecewise-constant drift and volatility.
//!
//! Each step is sampled exactly in log space:
//!
//! ```text
//! S(t + dt) = S(t) · exp((μ − σ²/2)·dt + σ·√dt·Z)
//! ```
//!
//! With `μ = ln(F(t + dt)/F(t))/dt` the discounted mean of every step
//! reproduces the forward curve.

use super::error::{check_dimensions, SimulationError};
use super::paths::PathMatrix;
use super::rng::SimulationRng;

/// Drift and volatility over one step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GbmStep {
    /// Step length in years.
    pub dt: f64,
    /// Continuously compounded drift.
    pub drift: f64,
    /// Volatility.
    pub volatility: f64,
}

impl GbmStep {
    /// `n` identical steps.
    pub fn uniform(dt: f64, n: usize, drift: f64, volatility: f64) -> Vec<GbmStep> {
        vec![
            GbmStep {
                dt,
                drift,
                volatility,
            };
            n
        ]
    }

    fn validate(&self, index: usize) -> Result<(), SimulationError> {
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(SimulationError::InvalidParameter {
                name: "dt",
                value: format!("step {} has dt = {}", index, self.dt),
            });
        }
        if !(self.volatility >= 0.0 && self.volatility.is_finite()) {
            return Err(SimulationError::InvalidParameter {
                name: "volatility",
                value: format!("step {} has volatility = {}", index, self.volatility),
            });
        }
        if !self.drift.is_finite() {
            return Err(SimulationError::InvalidParameter {
                name: "drift",
                value: format!("step {} has drift = {}", index, self.drift),
            });
        }
        Ok(())
    }
}

/// Evolves `spot` through `steps` using caller-supplied shocks.
///
/// `shocks` has one row per step and one column per simulation. The result
/// has `steps.len() + 1` rows; row 0 is `spot`.
///
/// # Errors
///
/// * `SimulationError::InvalidParameter` - non-positive spot or invalid step
/// * `SimulationError::ShapeMismatch` - `shocks` rows differ from the step count
///
/// # Examples
///
/// ```
/// use fxvol_models::simulation::{simulate_gbm, GbmStep, PathMatrix};
///
/// let steps = GbmStep::uniform(0.5, 2, 0.02, 0.0);
/// let shocks = PathMatrix::filled(2, 1, 0.0);
/// let paths = simulate_gbm(1.0, &steps, &shocks).unwrap();
/// assert!((paths.get(2, 0) - 0.02f64.exp()).abs() < 1e-15);
/// ```
pub fn simulate_gbm(
    spot: f64,
    steps: &[GbmStep],
    shocks: &PathMatrix,
) -> Result<PathMatrix, SimulationError> {
    if !(spot > 0.0 && spot.is_finite()) {
        return Err(SimulationError::InvalidParameter {
            name: "spot",
            value: format!("must be positive, got {}", spot),
        });
    }
    let n_sims = shocks.cols();
    check_dimensions(steps.len(), n_sims)?;
    shocks.expect_shape(steps.len(), n_sims)?;
    for (i, step) in steps.iter().enumerate() {
        step.validate(i)?;
    }

    let mut paths = PathMatrix::filled(steps.len() + 1, n_sims, spot);
    for (i, step) in steps.iter().enumerate() {
        let drift_dt = (step.drift - 0.5 * step.volatility * step.volatility) * step.dt;
        let vol_sqrt_dt = step.volatility * step.dt.sqrt();

        let previous = paths.row(i).to_vec();
        let z = shocks.row(i);
        for ((next, prev), z) in paths.row_mut(i + 1).iter_mut().zip(&previous).zip(z) {
            *next = prev * (drift_dt + vol_sqrt_dt * z).exp();
        }
    }
    Ok(paths)
}

/// Draws shocks from `rng` and runs [`simulate_gbm`].
pub fn simulate_gbm_paths(
    spot: f64,
    steps: &[GbmStep],
    n_sims: usize,
    antithetic: bool,
    rng: &mut SimulationRng,
) -> Result<PathMatrix, SimulationError> {
    check_dimensions(steps.len(), n_sims)?;
    let shocks = rng.normal_matrix(steps.len(), n_sims, antithetic)?;
    simulate_gbm(spot, steps, &shocks)
}
