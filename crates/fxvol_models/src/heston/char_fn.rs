//! Characteristic function of the Heston log spot at expiry.
//!
//! Uses the "little Heston trap" form of Albrecher et al. (2007), which
//! keeps the complex logarithm on its principal branch for long maturities:
//!
//! ```text
//! ξ = κ − ρ·vv·iu
//! d = √(ξ² + vv²(u² + iu))
//! g = (ξ − d)/(ξ + d)
//! C = κθ/vv² · [(ξ − d)τ − 2 ln((1 − g e^(−dτ))/(1 − g))]
//! D = (ξ − d)/vv² · (1 − e^(−dτ))/(1 − g e^(−dτ))
//! φ(u) = exp(iu ln F + C + D·v0)
//! ```
//!
//! The function is normalised so that `φ(0) = 1` and `φ(−i) = F`, i.e. it is
//! the characteristic function of `ln S_τ` under the domestic measure.

use num_complex::Complex64;

use super::params::HestonParams;

/// Evaluates `φ(u) = E[exp(iu ln S_τ)]` at a complex argument.
///
/// `κ` and `θ` are taken after the volatility risk premium.
///
/// # Examples
///
/// ```
/// use fxvol_models::heston::{characteristic_function, HestonParams};
/// use num_complex::Complex64;
///
/// let params = HestonParams::new(0.04, 0.5, 1.5, 0.04, -0.5).unwrap();
/// let at_minus_i = characteristic_function(&params, 1.1, 1.0, Complex64::new(0.0, -1.0));
/// assert!((at_minus_i.re - 1.1).abs() < 1e-12);
/// assert!(at_minus_i.im.abs() < 1e-12);
/// ```
pub fn characteristic_function(
    params: &HestonParams,
    forward: f64,
    tau: f64,
    u: Complex64,
) -> Complex64 {
    let i = Complex64::i();
    let (kappa, theta) = params.risk_neutral();
    let vv2 = params.vv * params.vv;

    let iu = i * u;
    let xi = kappa - params.rho * params.vv * iu;
    let d = (xi * xi + vv2 * (u * u + iu)).sqrt();
    let g = (xi - d) / (xi + d);
    let e = (-d * tau).exp();

    let c = kappa * theta / vv2 * ((xi - d) * tau - 2.0 * ((1.0 - g * e) / (1.0 - g)).ln());
    let big_d = (xi - d) / vv2 * (1.0 - e) / (1.0 - g * e);

    (iu * forward.ln() + c + big_d * params.v0).exp()
}

/// `φ` at a real frequency.
#[inline]
pub(crate) fn characteristic_function_real(
    params: &HestonParams,
    forward: f64,
    tau: f64,
    u: f64,
) -> Complex64 {
    characteristic_function(params, forward, tau, Complex64::new(u, 0.0))
}
