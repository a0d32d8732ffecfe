//! Heston smile calibration to one expiry.

use fxvol_core::math::solvers::{LMConfig, LevenbergMarquardtSolver, ParameterBounds};
use tracing::{debug, instrument};

use super::error::HestonError;
use super::params::HestonParams;
use super::pricing::HestonEngine;
use crate::analytical::{
    solve_implied_vol, FxMarket, GarmanKohlhagen, GarmanKohlhagenParams, OptionType,
};

/// Fewest quotes a smile calibration accepts.
pub const MIN_SMILE_QUOTES: usize = 3;

/// Box for `[v0, vv, kappa, theta, rho]`.
const LOWER: [f64; 5] = [1e-6, 0.01, 0.01, 1e-6, -0.999];
const UPPER: [f64; 5] = [1.0, 2.0, 20.0, 1.0, 0.999];

/// Outcome of [`calibrate_heston_smile`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HestonSmileFit {
    /// Fitted parameters; `lambda` is zero.
    pub params: HestonParams,
    /// Model implied volatility at each quote.
    pub model_vols: Vec<f64>,
    /// `Σ (model vol − market vol)²`.
    pub sse: f64,
    /// Levenberg-Marquardt iterations.
    pub iterations: usize,
    /// Whether the least-squares solver met its tolerance.
    pub converged: bool,
}

/// Fits Heston parameters to a smile at one expiry.
///
/// Minimises vega-scaled price errors, which are close to volatility errors,
/// inside a fixed parameter box. The reported `sse` is measured in
/// volatility after inverting each model price. Without `initial`, the
/// start is `v0 = θ = σ_atm²`, `κ = 1.5`, `vv = 0.5`, `ρ = 0`, where
/// `σ_atm` is the quote nearest the forward.
///
/// # Errors
///
/// * `HestonError::InvalidQuotes` - length mismatch, fewer than
///   [`MIN_SMILE_QUOTES`] quotes, or a non-positive vol or strike
/// * `HestonError::Solver` - the residuals are not finite at the start
/// * `HestonError::Analytical` - a fitted price could not be inverted
#[instrument(skip_all, fields(tau = market.tau, quotes = strikes.len(), method = %engine.method()))]
pub fn calibrate_heston_smile(
    market: &FxMarket,
    strikes: &[f64],
    vols: &[f64],
    option_types: &[OptionType],
    engine: &HestonEngine,
    initial: Option<HestonParams>,
) -> Result<HestonSmileFit, HestonError> {
    let n = strikes.len();
    if vols.len() != n || option_types.len() != n {
        return Err(HestonError::InvalidQuotes(format!(
            "{} strikes, {} vols, {} option types",
            n,
            vols.len(),
            option_types.len()
        )));
    }
    if n < MIN_SMILE_QUOTES {
        return Err(HestonError::InvalidQuotes(format!(
            "need at least {} quotes, got {}",
            MIN_SMILE_QUOTES, n
        )));
    }

    let mut market_prices = Vec::with_capacity(n);
    let mut vegas = Vec::with_capacity(n);
    for ((&strike, &vol), &cp) in strikes.iter().zip(vols).zip(option_types) {
        let model = GarmanKohlhagen::new(GarmanKohlhagenParams::new(*market, strike, vol)?);
        market_prices.push(model.price(cp));
        vegas.push(model.raw_vega().max(f64::EPSILON));
    }
    let options: Vec<(OptionType, f64)> = option_types
        .iter()
        .copied()
        .zip(strikes.iter().copied())
        .collect();

    let residuals = |p: &[f64]| -> Vec<f64> {
        let priced = HestonParams::from_slice(p)
            .and_then(|params| engine.prices(&params, market, &options));
        match priced {
            Ok(prices) => prices
                .iter()
                .zip(&market_prices)
                .zip(&vegas)
                .map(|((model, quoted), vega)| (model - quoted) / vega)
                .collect(),
            Err(e) => {
                debug!(error = %e, params = ?p, "heston pricing failed inside calibration");
                vec![f64::NAN; n]
            }
        }
    };

    let start = initial
        .map(|p| p.to_vec())
        .unwrap_or_else(|| default_guess(market, strikes, vols));
    let bounds = ParameterBounds::new(LOWER.to_vec(), UPPER.to_vec())?;
    let lm = LevenbergMarquardtSolver::new(LMConfig::new(1e-12, 200))
        .solve_bounded(residuals, start, &bounds)?;

    let params = HestonParams::from_slice(&lm.params)?;
    let prices = engine.prices(&params, market, &options)?;
    let guess = params.v0.sqrt();
    let model_vols = options
        .iter()
        .zip(&prices)
        .map(|(&(cp, strike), &price)| solve_implied_vol(market, cp, strike, price, guess))
        .collect::<Result<Vec<_>, _>>()?;
    let sse = model_vols
        .iter()
        .zip(vols)
        .map(|(model, quoted)| (model - quoted).powi(2))
        .sum();

    debug!(
        v0 = params.v0,
        vv = params.vv,
        kappa = params.kappa,
        theta = params.theta,
        rho = params.rho,
        sse,
        iterations = lm.iterations,
        converged = lm.converged,
        "heston smile fitted"
    );

    Ok(HestonSmileFit {
        params,
        model_vols,
        sse,
        iterations: lm.iterations,
        converged: lm.converged,
    })
}

fn default_guess(market: &FxMarket, strikes: &[f64], vols: &[f64]) -> Vec<f64> {
    let forward = market.forward();
    let atm = strikes
        .iter()
        .zip(vols)
        .min_by(|a, b| {
            let da = (a.0 / forward).ln().abs();
            let db = (b.0 / forward).ln().abs();
            da.total_cmp(&db)
        })
        .map(|(_, &vol)| vol)
        .unwrap_or(0.1);
    let variance = atm * atm;
    vec![variance, 0.5, 1.5, variance, 0.0]
}
