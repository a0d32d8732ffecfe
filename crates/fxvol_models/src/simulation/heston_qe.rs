//! Heston path simulation with Andersen's quadratic-exponential scheme.
//!
//! The variance step matches the conditional mean `m` and variance `s²` of
//! the CIR transition:
//!
//! ```text
//! m  = θ + (v − θ)e^(−κΔ)
//! s² = v·vv²e^(−κΔ)(1 − e^(−κΔ))/κ + θ·vv²(1 − e^(−κΔ))²/(2κ)
//! ψ  = s²/m²
//! ```
//!
//! For `ψ ≤ 1.5` the next variance is `a(b + Z)²` with
//! `b² = 2/ψ − 1 + √(2/ψ)√(2/ψ − 1)` and `a = m/(1 + b²)`. Otherwise it is
//! drawn from a point mass at zero mixed with an exponential. The log spot
//! uses the central discretisation of the integrated variance
//! (Andersen 2008, eq. 33) with `γ1 = γ2 = ½`.

use super::error::{check_dimensions, SimulationError};
use super::paths::PathMatrix;
use super::rng::SimulationRng;
use crate::analytical::norm_cdf;
use crate::heston::HestonParams;

/// Switching level between the quadratic and exponential branches.
const PSI_CRITICAL: f64 = 1.5;

/// Simulated spot and variance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HestonPaths {
    /// Spot paths, `n_steps + 1` rows.
    pub spot: PathMatrix,
    /// Variance paths, `n_steps + 1` rows.
    pub variance: PathMatrix,
}

/// One QE variance step from `v` given a normal shock `z`.
#[inline]
fn qe_variance_step(v: f64, kappa: f64, theta: f64, vv: f64, dt: f64, z: f64) -> f64 {
    let e = (-kappa * dt).exp();
    let m = theta + (v - theta) * e;
    let s2 = v * vv * vv * e * (1.0 - e) / kappa + theta * vv * vv * (1.0 - e).powi(2) / (2.0 * kappa);
    let psi = s2 / (m * m);

    if psi <= PSI_CRITICAL {
        let inv = 2.0 / psi;
        let b2 = inv - 1.0 + inv.sqrt() * (inv - 1.0).sqrt();
        let a = m / (1.0 + b2);
        a * (b2.sqrt() + z).powi(2)
    } else {
        let p = (psi - 1.0) / (psi + 1.0);
        let beta = (1.0 - p) / m;
        let u = norm_cdf(z);
        if u <= p {
            0.0
        } else {
            ((1.0 - p) / (1.0 - u)).ln() / beta
        }
    }
}

/// Evolves spot and variance with caller-supplied shocks.
///
/// `variance_shocks` and `spot_shocks` are independent standard normals,
/// one row per step and one column per simulation. The spot carries drift
/// `mu`, and correlation enters through the integrated-variance terms.
///
/// # Errors
///
/// * `SimulationError::InvalidParameter` - non-positive spot or `dt`
/// * `SimulationError::ShapeMismatch` - the two shock matrices differ
pub fn simulate_heston_qe(
    spot: f64,
    mu: f64,
    params: &HestonParams,
    dt: f64,
    variance_shocks: &PathMatrix,
    spot_shocks: &PathMatrix,
) -> Result<HestonPaths, SimulationError> {
    if !(spot > 0.0 && spot.is_finite()) {
        return Err(SimulationError::InvalidParameter {
            name: "spot",
            value: format!("must be positive, got {}", spot),
        });
    }
    if !(dt > 0.0 && dt.is_finite()) {
        return Err(SimulationError::InvalidParameter {
            name: "dt",
            value: format!("must be positive, got {}", dt),
        });
    }
    let n_steps = variance_shocks.rows();
    let n_sims = variance_shocks.cols();
    check_dimensions(n_steps, n_sims)?;
    spot_shocks.expect_shape(n_steps, n_sims)?;

    let (kappa, theta) = params.risk_neutral();
    let (vv, rho) = (params.vv, params.rho);
    let k0 = -rho * kappa * theta * dt / vv;
    let k1 = 0.5 * dt * (kappa * rho / vv - 0.5) - rho / vv;
    let k2 = 0.5 * dt * (kappa * rho / vv - 0.5) + rho / vv;
    let k3 = 0.5 * dt * (1.0 - rho * rho);
    let k4 = k3;

    let mut log_spot = vec![spot.ln(); n_sims];
    let mut spot_paths = PathMatrix::filled(n_steps + 1, n_sims, spot);
    let mut variance = PathMatrix::filled(n_steps + 1, n_sims, params.v0);

    for step in 0..n_steps {
        let current = variance.row(step).to_vec();
        let z_v = variance_shocks.row(step);
        let z_s = spot_shocks.row(step);

        let next_v = variance.row_mut(step + 1);
        for (j, next) in next_v.iter_mut().enumerate() {
            *next = qe_variance_step(current[j], kappa, theta, vv, dt, z_v[j]);
        }
        let next_v = variance.row(step + 1).to_vec();

        for (j, x) in log_spot.iter_mut().enumerate() {
            let (v, v_next) = (current[j], next_v[j]);
            *x += mu * dt + k0 + k1 * v + k2 * v_next + (k3 * v + k4 * v_next).sqrt() * z_s[j];
        }
        for (out, x) in spot_paths.row_mut(step + 1).iter_mut().zip(&log_spot) {
            *out = x.exp();
        }
    }

    Ok(HestonPaths {
        spot: spot_paths,
        variance,
    })
}

/// Draws independent shocks from `rng` and runs [`simulate_heston_qe`].
///
/// With `antithetic`, both shock matrices mirror their first half.
#[allow(clippy::too_many_arguments)]
pub fn simulate_heston_paths(
    spot: f64,
    mu: f64,
    params: &HestonParams,
    dt: f64,
    n_steps: usize,
    n_sims: usize,
    antithetic: bool,
    rng: &mut SimulationRng,
) -> Result<HestonPaths, SimulationError> {
    check_dimensions(n_steps, n_sims)?;
    let variance_shocks = rng.normal_matrix(n_steps, n_sims, antithetic)?;
    let spot_shocks = rng.normal_matrix(n_steps, n_sims, antithetic)?;
    simulate_heston_qe(spot, mu, params, dt, &variance_shocks, &spot_shocks)
}
