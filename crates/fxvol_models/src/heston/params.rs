//! Heston stochastic volatility parameters.
//!
//! Under the pricing measure the spot `S` and its variance `v` follow
//!
//! ```text
//! dS/S = (r_d − r_f) dt + √v dW₁
//! dv   = κ(θ − v) dt + vv·√v dW₂,    d⟨W₁, W₂⟩ = ρ dt
//! ```
//!
//! A market price of volatility risk `λ` enters as `κ → κ + λ` and
//! `θ → κθ / (κ + λ)`.

use super::error::HestonError;

/// Heston parameters.
///
/// # Examples
///
/// ```
/// use fxvol_models::heston::HestonParams;
///
/// // 2 * 1.5 * 0.04 = 0.12 > 0.3^2 = 0.09
/// let params = HestonParams::new(0.04, 0.3, 1.5, 0.04, -0.7).unwrap();
/// assert!(params.satisfies_feller());
///
/// assert!(HestonParams::new(0.04, 0.3, 1.5, 0.04, -1.2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HestonParams {
    /// Initial variance.
    pub v0: f64,
    /// Volatility of variance.
    pub vv: f64,
    /// Mean reversion speed.
    pub kappa: f64,
    /// Long-run variance.
    pub theta: f64,
    /// Spot/variance correlation.
    pub rho: f64,
    /// Market price of volatility risk.
    pub lambda: f64,
}

impl HestonParams {
    /// Creates validated parameters with `lambda = 0`.
    ///
    /// # Errors
    ///
    /// A `HestonError` naming the first invalid parameter.
    pub fn new(v0: f64, vv: f64, kappa: f64, theta: f64, rho: f64) -> Result<Self, HestonError> {
        let params = Self {
            v0,
            vv,
            kappa,
            theta,
            rho,
            lambda: 0.0,
        };
        params.validate()?;
        Ok(params)
    }

    /// Sets the market price of volatility risk.
    pub fn with_lambda(mut self, lambda: f64) -> Result<Self, HestonError> {
        self.lambda = lambda;
        self.validate()?;
        Ok(self)
    }

    /// Builds parameters from the calibration vector `[v0, vv, kappa, theta, rho]`.
    pub fn from_slice(p: &[f64]) -> Result<Self, HestonError> {
        match p {
            [v0, vv, kappa, theta, rho] => Self::new(*v0, *vv, *kappa, *theta, *rho),
            _ => Err(HestonError::InvalidQuotes(format!(
                "expected 5 Heston parameters, got {}",
                p.len()
            ))),
        }
    }

    /// The calibration vector `[v0, vv, kappa, theta, rho]`.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.v0, self.vv, self.kappa, self.theta, self.rho]
    }

    /// Checks every parameter.
    pub fn validate(&self) -> Result<(), HestonError> {
        let positive = |x: f64| x > 0.0 && x.is_finite();
        if !positive(self.v0) {
            return Err(HestonError::InvalidV0(self.v0));
        }
        if !positive(self.vv) {
            return Err(HestonError::InvalidVolOfVol(self.vv));
        }
        if !positive(self.kappa) {
            return Err(HestonError::InvalidKappa(self.kappa));
        }
        if !positive(self.theta) {
            return Err(HestonError::InvalidTheta(self.theta));
        }
        if !(-1.0..=1.0).contains(&self.rho) {
            return Err(HestonError::InvalidRho(self.rho));
        }
        if !(self.lambda.is_finite() && self.kappa + self.lambda > 0.0) {
            return Err(HestonError::InvalidLambda {
                lambda: self.lambda,
                kappa: self.kappa,
            });
        }
        Ok(())
    }

    /// `(κ*, θ*)` after the volatility risk premium.
    #[inline]
    pub fn risk_neutral(&self) -> (f64, f64) {
        let kappa = self.kappa + self.lambda;
        (kappa, self.kappa * self.theta / kappa)
    }

    /// Feller condition `2κθ > vv²`: the variance never touches zero.
    pub fn satisfies_feller(&self) -> bool {
        self.feller_ratio() > 1.0
    }

    /// `2κθ / vv²`.
    pub fn feller_ratio(&self) -> f64 {
        2.0 * self.kappa * self.theta / (self.vv * self.vv)
    }
}
