//! Fourier pricing of European FX options under Heston.
//!
//! Three pricers share the characteristic function in [`super::char_fn`]:
//!
//! - **Heston (1993)**: the two-probability form collapsed into one integral,
//!   `C = df_d·[(F − K)/2 + 1/π ∫₀^∞ Re(e^(−iuk)(φ(u − i) − Kφ(u))/(iu)) du]`
//! - **Carr-Madan quadrature**: the damped call transform
//!   `ψ(u) = df_d·φ(u − (α+1)i)/(α² + α − u² + i(2α+1)u)` integrated by
//!   adaptive Gauss-Kronrod
//! - **Carr-Madan FFT**: the same transform sampled with Simpson weights and
//!   inverted on a log-strike grid centred on `ln F` with `rustfft`
//!
//! All three price calls; puts follow from parity `P = C − df_d(F − K)`.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use fxvol_core::math::quadrature::GaussKronrod;
use num_complex::Complex64;
use rustfft::FftPlanner;
use tracing::debug;

use super::char_fn::{characteristic_function, characteristic_function_real};
use super::error::HestonError;
use super::params::HestonParams;
use crate::analytical::{FxMarket, OptionType};

/// Frequency beyond which the integrands are treated as zero.
const MAX_FREQUENCY: f64 = 1e4;

/// Heston pricing method.
///
/// # Examples
///
/// ```
/// use fxvol_models::heston::HestonPricer;
///
/// let m: HestonPricer = "heston_carr_madan_fft_w_simpsons".parse().unwrap();
/// assert_eq!(m, HestonPricer::CarrMadanFft);
/// assert_eq!("fft".parse::<HestonPricer>().unwrap(), m);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HestonPricer {
    /// Heston (1993) single-integral form.
    #[default]
    Heston1993,
    /// Carr-Madan damped transform by adaptive quadrature.
    CarrMadanQuadrature,
    /// Carr-Madan damped transform by FFT with Simpson weights.
    CarrMadanFft,
}

impl HestonPricer {
    /// Canonical label.
    pub fn name(&self) -> &'static str {
        match self {
            HestonPricer::Heston1993 => "heston_analytical_1993",
            HestonPricer::CarrMadanQuadrature => "heston_carr_madan_gauss_kronrod_quadrature",
            HestonPricer::CarrMadanFft => "heston_carr_madan_fft_w_simpsons",
        }
    }
}

impl FromStr for HestonPricer {
    type Err = HestonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "heston_analytical_1993" | "heston_1993" | "analytical" | "heston1993" => {
                Ok(HestonPricer::Heston1993)
            }
            "heston_carr_madan_gauss_kronrod_quadrature" | "carr_madan_quadrature"
            | "quadrature" => Ok(HestonPricer::CarrMadanQuadrature),
            "heston_carr_madan_fft_w_simpsons" | "carr_madan_fft" | "fft" => {
                Ok(HestonPricer::CarrMadanFft)
            }
            _ => Err(HestonError::InvalidConfig(format!(
                "unknown Heston pricer: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for HestonPricer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::HestonPricer;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for HestonPricer {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(self.name())
        }
    }

    impl<'de> Deserialize<'de> for HestonPricer {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(de::Error::custom)
        }
    }
}

/// Numerical settings for the Heston pricers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HestonPricingConfig {
    /// Lower bound on the upper integration limit in frequency space.
    ///
    /// The limit is raised for short expiries, where the integrands decay
    /// slowly.
    pub integration_limit: f64,
    /// Absolute and relative tolerance of the quadrature.
    pub tolerance: f64,
    /// Carr-Madan damping exponent.
    pub alpha: f64,
    /// FFT size; a power of two.
    pub fft_points: usize,
    /// FFT frequency spacing.
    pub fft_eta: f64,
}

impl Default for HestonPricingConfig {
    fn default() -> Self {
        Self {
            integration_limit: 200.0,
            tolerance: 1e-10,
            alpha: 1.5,
            fft_points: 4096,
            fft_eta: 0.25,
        }
    }
}

impl HestonPricingConfig {
    /// Checks ranges and that `fft_points` is a power of two.
    pub fn validate(&self) -> Result<(), HestonError> {
        if !(self.integration_limit > 0.0 && self.integration_limit.is_finite()) {
            return Err(HestonError::InvalidConfig(format!(
                "integration_limit must be positive, got {}",
                self.integration_limit
            )));
        }
        if !(self.tolerance > 0.0) {
            return Err(HestonError::InvalidConfig(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if !(self.alpha > 0.0 && self.alpha.is_finite()) {
            return Err(HestonError::InvalidConfig(format!(
                "alpha must be positive, got {}",
                self.alpha
            )));
        }
        if self.fft_points < 2 || !self.fft_points.is_power_of_two() {
            return Err(HestonError::InvalidConfig(format!(
                "fft_points must be a power of two >= 2, got {}",
                self.fft_points
            )));
        }
        if !(self.fft_eta > 0.0 && self.fft_eta.is_finite()) {
            return Err(HestonError::InvalidConfig(format!(
                "fft_eta must be positive, got {}",
                self.fft_eta
            )));
        }
        Ok(())
    }

    /// Log-strike spacing of the FFT grid, `2π/(Nη)`.
    pub fn fft_lambda(&self) -> f64 {
        2.0 * PI / (self.fft_points as f64 * self.fft_eta)
    }
}

/// Call prices on the FFT log-strike grid `k_m = k0 + m·λ`.
#[derive(Debug, Clone)]
struct CallGrid {
    k0: f64,
    lambda: f64,
    calls: Vec<f64>,
}

impl CallGrid {
    /// Linear interpolation in log strike.
    fn call_at(&self, strike: f64) -> Result<f64, HestonError> {
        let last = self.calls.len() - 1;
        let pos = (strike.ln() - self.k0) / self.lambda;
        if !(pos >= 0.0 && pos <= last as f64) {
            return Err(HestonError::StrikeOutsideGrid {
                strike,
                low: self.k0.exp(),
                high: (self.k0 + last as f64 * self.lambda).exp(),
            });
        }
        let lo = (pos.floor() as usize).min(last - 1);
        let w = pos - lo as f64;
        Ok(self.calls[lo] + w * (self.calls[lo + 1] - self.calls[lo]))
    }
}

/// Prices European FX options under Heston.
///
/// # Examples
///
/// ```
/// use fxvol_models::analytical::{FxMarket, OptionType};
/// use fxvol_models::heston::{HestonEngine, HestonParams, HestonPricer, HestonPricingConfig};
///
/// let market = FxMarket::new(1.10, 0.5, 0.03, 0.05).unwrap();
/// let params = HestonParams::new(0.01, 0.3, 1.5, 0.012, -0.3).unwrap();
/// let engine = HestonEngine::new(HestonPricer::Heston1993, HestonPricingConfig::default()).unwrap();
///
/// let call = engine.price(&params, &market, OptionType::Call, 1.12).unwrap();
/// let put = engine.price(&params, &market, OptionType::Put, 1.12).unwrap();
/// let parity = market.df_domestic() * (market.forward() - 1.12);
/// assert!((call - put - parity).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HestonEngine {
    method: HestonPricer,
    config: HestonPricingConfig,
}

impl HestonEngine {
    /// Creates an engine after validating `config`.
    pub fn new(method: HestonPricer, config: HestonPricingConfig) -> Result<Self, HestonError> {
        config.validate()?;
        Ok(Self { method, config })
    }

    /// Pricing method.
    pub fn method(&self) -> HestonPricer {
        self.method
    }

    /// Numerical settings.
    pub fn config(&self) -> &HestonPricingConfig {
        &self.config
    }

    /// Price of one option.
    ///
    /// # Errors
    ///
    /// * `HestonError::InvalidQuotes` - non-positive strike
    /// * `HestonError::Integration` - the quadrature did not converge
    /// * `HestonError::StrikeOutsideGrid` - FFT only
    /// * `HestonError::NonFinitePrice` - the result is NaN or infinite
    pub fn price(
        &self,
        params: &HestonParams,
        market: &FxMarket,
        option_type: OptionType,
        strike: f64,
    ) -> Result<f64, HestonError> {
        check_strike(strike)?;
        let call = match self.method {
            HestonPricer::Heston1993 => self.heston_1993_call(params, market, strike)?,
            HestonPricer::CarrMadanQuadrature => self.carr_madan_call(params, market, strike)?,
            HestonPricer::CarrMadanFft => self.fft_grid(params, market)?.call_at(strike)?,
        };
        finish(call, market, option_type, strike)
    }

    /// Prices a batch at one expiry. The FFT pricer builds its grid once.
    pub fn prices(
        &self,
        params: &HestonParams,
        market: &FxMarket,
        options: &[(OptionType, f64)],
    ) -> Result<Vec<f64>, HestonError> {
        if self.method != HestonPricer::CarrMadanFft {
            return options
                .iter()
                .map(|&(cp, strike)| self.price(params, market, cp, strike))
                .collect();
        }
        let grid = self.fft_grid(params, market)?;
        options
            .iter()
            .map(|&(cp, strike)| {
                check_strike(strike)?;
                finish(grid.call_at(strike)?, market, cp, strike)
            })
            .collect()
    }

    fn quadrature(&self) -> GaussKronrod {
        GaussKronrod::with_tolerance(self.config.tolerance)
    }

    /// Upper frequency for the quadratures. The integrands decay roughly
    /// like `exp(−w·u²/2)` with `w` the smaller of the two total variances.
    fn upper_limit(&self, params: &HestonParams, tau: f64) -> f64 {
        let (_, theta) = params.risk_neutral();
        let w = params.v0.min(theta) * tau;
        self.config
            .integration_limit
            .max((10.0 / w.sqrt()).min(MAX_FREQUENCY))
    }

    fn heston_1993_call(
        &self,
        params: &HestonParams,
        market: &FxMarket,
        strike: f64,
    ) -> Result<f64, HestonError> {
        let forward = market.forward();
        let tau = market.tau;
        let k = strike.ln();
        let i = Complex64::i();

        let integrand = |u: f64| {
            let shifted = characteristic_function(params, forward, tau, Complex64::new(u, -1.0));
            let plain = characteristic_function_real(params, forward, tau, u);
            let phase = Complex64::new(0.0, -u * k).exp();
            (phase * (shifted - strike * plain) / (i * u)).re
        };
        let upper = self.upper_limit(params, tau);
        let integral = self.quadrature().integrate(integrand, 0.0, upper)?;
        debug!(
            strike,
            upper,
            evaluations = integral.evaluations,
            "heston 1993 integral"
        );

        Ok(market.df_domestic() * (0.5 * (forward - strike) + integral.value / PI))
    }

    fn carr_madan_call(
        &self,
        params: &HestonParams,
        market: &FxMarket,
        strike: f64,
    ) -> Result<f64, HestonError> {
        let k = strike.ln();
        let alpha = self.config.alpha;
        let integrand = |u: f64| {
            let phase = Complex64::new(0.0, -u * k).exp();
            (phase * damped_transform(params, market, alpha, u)).re
        };
        let upper = self.upper_limit(params, market.tau);
        let integral = self.quadrature().integrate(integrand, 0.0, upper)?;
        debug!(
            strike,
            upper,
            evaluations = integral.evaluations,
            "carr-madan integral"
        );

        Ok((-alpha * k).exp() * integral.value / PI)
    }

    fn fft_grid(&self, params: &HestonParams, market: &FxMarket) -> Result<CallGrid, HestonError> {
        let n = self.config.fft_points;
        let eta = self.config.fft_eta;
        let alpha = self.config.alpha;
        let lambda = self.config.fft_lambda();
        let k0 = market.forward().ln() - 0.5 * n as f64 * lambda;

        let mut buffer: Vec<Complex64> = (0..n)
            .map(|j| {
                let v = j as f64 * eta;
                let phase = Complex64::new(0.0, -v * k0).exp();
                phase * damped_transform(params, market, alpha, v) * simpson_weight(j, eta)
            })
            .collect();

        let mut planner = FftPlanner::<f64>::new();
        planner.plan_fft_forward(n).process(&mut buffer);

        let calls = buffer
            .iter()
            .enumerate()
            .map(|(m, z)| {
                let k = k0 + m as f64 * lambda;
                (-alpha * k).exp() * z.re / PI
            })
            .collect();

        Ok(CallGrid { k0, lambda, calls })
    }
}

/// `ψ(u) = df_d·φ(u − (α+1)i)/(α² + α − u² + i(2α+1)u)`
fn damped_transform(params: &HestonParams, market: &FxMarket, alpha: f64, u: f64) -> Complex64 {
    let phi = characteristic_function(
        params,
        market.forward(),
        market.tau,
        Complex64::new(u, -(alpha + 1.0)),
    );
    let denom = Complex64::new(alpha * alpha + alpha - u * u, (2.0 * alpha + 1.0) * u);
    market.df_domestic() * phi / denom
}

/// `η/3·(3 + (−1)^(j+1) − δ_j0)`
#[inline]
fn simpson_weight(j: usize, eta: f64) -> f64 {
    let alternating = if j % 2 == 0 { -1.0 } else { 1.0 };
    let first = if j == 0 { 1.0 } else { 0.0 };
    eta / 3.0 * (3.0 + alternating - first)
}

fn check_strike(strike: f64) -> Result<(), HestonError> {
    if strike > 0.0 && strike.is_finite() {
        Ok(())
    } else {
        Err(HestonError::InvalidQuotes(format!(
            "strike must be positive, got {}",
            strike
        )))
    }
}

/// Applies parity for puts and rejects non-finite results.
fn finish(
    call: f64,
    market: &FxMarket,
    option_type: OptionType,
    strike: f64,
) -> Result<f64, HestonError> {
    let price = match option_type {
        OptionType::Call => call,
        OptionType::Put => call - market.df_domestic() * (market.forward() - strike),
    };
    if price.is_finite() {
        Ok(price)
    } else {
        Err(HestonError::NonFinitePrice { strike })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytical::gk_price;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn engine(method: HestonPricer) -> HestonEngine {
        HestonEngine::new(method, HestonPricingConfig::default()).unwrap()
    }

    fn market() -> FxMarket {
        FxMarket::new(1.0850, 1.0, 0.035, 0.052).unwrap()
    }

    fn params() -> HestonParams {
        HestonParams::new(0.0081, 0.45, 1.8, 0.01, -0.35).unwrap()
    }

    const METHODS: [HestonPricer; 3] = [
        HestonPricer::Heston1993,
        HestonPricer::CarrMadanQuadrature,
        HestonPricer::CarrMadanFft,
    ];

    // ==========================================================
    // Configuration and labels
    // ==========================================================

    #[test]
    fn test_config_validation() {
        assert!(HestonPricingConfig::default().validate().is_ok());
        let bad = HestonPricingConfig {
            fft_points: 3000,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(HestonError::InvalidConfig(_))));
        assert!(HestonEngine::new(HestonPricer::CarrMadanFft, bad).is_err());
    }

    #[test]
    fn test_pricer_labels_round_trip() {
        for m in METHODS {
            assert_eq!(m.name().parse::<HestonPricer>().unwrap(), m);
        }
        assert!("cos".parse::<HestonPricer>().is_err());
    }

    #[test]
    fn test_simpson_weights() {
        let eta = 0.3;
        assert_relative_eq!(simpson_weight(0, eta), eta / 3.0);
        assert_relative_eq!(simpson_weight(1, eta), 4.0 * eta / 3.0);
        assert_relative_eq!(simpson_weight(2, eta), 2.0 * eta / 3.0);
    }

    // ==========================================================
    // Prices
    // ==========================================================

    #[test]
    fn test_reference_price() {
        // S = K = 100, r_d = 5%, r_f = 0, 1Y
        let market = FxMarket::new(100.0, 1.0, 0.0, 0.05).unwrap();
        let params = HestonParams::new(0.04, 0.3, 1.5, 0.04, -0.5).unwrap();
        let cases = [(100.0, 10.3272), (110.0, 5.4638), (90.0, 16.9831)];
        for (strike, expected) in cases {
            let px = engine(HestonPricer::Heston1993)
                .price(&params, &market, OptionType::Call, strike)
                .unwrap();
            assert_abs_diff_eq!(px, expected, epsilon = 0.05);
        }
    }

    #[test]
    fn test_pricers_agree() {
        let (params, market) = (params(), market());
        for strike in [0.95, 1.05, 1.10, 1.20, 1.30] {
            let analytic = engine(HestonPricer::Heston1993)
                .price(&params, &market, OptionType::Call, strike)
                .unwrap();
            let quadrature = engine(HestonPricer::CarrMadanQuadrature)
                .price(&params, &market, OptionType::Call, strike)
                .unwrap();
            let fft = engine(HestonPricer::CarrMadanFft)
                .price(&params, &market, OptionType::Call, strike)
                .unwrap();
            assert_abs_diff_eq!(analytic, quadrature, epsilon = 1e-7);
            assert_abs_diff_eq!(analytic, fft, epsilon = 5e-5);
        }
    }

    #[test]
    fn test_put_call_parity() {
        let (params, market) = (params(), market());
        let strike = 1.07;
        let parity = market.df_domestic() * (market.forward() - strike);
        for m in METHODS {
            let e = engine(m);
            let call = e.price(&params, &market, OptionType::Call, strike).unwrap();
            let put = e.price(&params, &market, OptionType::Put, strike).unwrap();
            assert_abs_diff_eq!(call - put, parity, epsilon = 1e-12);
            assert!(put > 0.0);
        }
    }

    #[test]
    fn test_zero_vol_of_vol_collapses_to_gk() {
        let market = market();
        let params = HestonParams::new(0.01, 1e-3, 1.5, 0.01, 0.0).unwrap();
        for m in [HestonPricer::Heston1993, HestonPricer::CarrMadanQuadrature] {
            for (cp, strike) in [(OptionType::Call, 1.12), (OptionType::Put, 1.04)] {
                let heston = engine(m).price(&params, &market, cp, strike).unwrap();
                let gk = gk_price(market, cp, strike, 0.1).unwrap();
                assert_abs_diff_eq!(heston, gk, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_short_expiry_prices() {
        let market = FxMarket::new(1.0850, 7.0 / 365.0, 0.035, 0.052).unwrap();
        let params = HestonParams::new(0.0064, 0.5, 2.0, 0.01, -0.2).unwrap();
        let analytic = engine(HestonPricer::Heston1993)
            .price(&params, &market, OptionType::Call, 1.09)
            .unwrap();
        let gk = gk_price(market, OptionType::Call, 1.09, 0.08).unwrap();
        // v ≈ v0 over a week
        assert_abs_diff_eq!(analytic, gk, epsilon = 2e-4);
    }

    #[test]
    fn test_batch_matches_single() {
        let (params, market) = (params(), market());
        let options = [(OptionType::Put, 1.00), (OptionType::Call, 1.15)];
        for m in METHODS {
            let e = engine(m);
            let batch = e.prices(&params, &market, &options).unwrap();
            for (px, &(cp, k)) in batch.iter().zip(&options) {
                assert_relative_eq!(*px, e.price(&params, &market, cp, k).unwrap(), epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_fft_strike_outside_grid() {
        let result =
            engine(HestonPricer::CarrMadanFft).price(&params(), &market(), OptionType::Call, 1e9);
        assert!(matches!(result, Err(HestonError::StrikeOutsideGrid { .. })));
    }

    #[test]
    fn test_invalid_strike() {
        let result =
            engine(HestonPricer::Heston1993).price(&params(), &market(), OptionType::Call, 0.0);
        assert!(matches!(result, Err(HestonError::InvalidQuotes(_))));
    }
}
