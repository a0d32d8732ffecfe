//! Garman-Kohlhagen implied volatility.

use fxvol_core::math::solvers::{BrentSolver, NewtonRaphsonSolver, SolverConfig};
use tracing::debug;

use super::error::AnalyticalError;
use super::garman_kohlhagen::{GarmanKohlhagen, GarmanKohlhagenParams};
use super::market::{FxMarket, OptionType};

/// Lowest volatility the inversion will return.
pub const MIN_IMPLIED_VOL: f64 = 1e-4;

/// Highest volatility the inversion will return.
pub const MAX_IMPLIED_VOL: f64 = 5.0;

/// Volatility at which Garman-Kohlhagen reproduces `price`.
///
/// Newton-Raphson on vega starts from `guess`. If it stalls or leaves
/// `[MIN_IMPLIED_VOL, MAX_IMPLIED_VOL]`, Brent on that interval takes over.
///
/// # Errors
///
/// * `AnalyticalError::InvalidStrike` - non-positive strike
/// * `AnalyticalError::ImpliedVolFailed` - the price is outside the range
///   spanned by the volatility bounds, or both solvers failed
///
/// # Examples
///
/// ```
/// use fxvol_models::analytical::{gk_price, solve_implied_vol, FxMarket, OptionType};
///
/// let market = FxMarket::new(0.6629, 1.0, 0.0466, 0.05381).unwrap();
/// let px = gk_price(market, OptionType::Put, 0.70, 0.11).unwrap();
/// let vol = solve_implied_vol(&market, OptionType::Put, 0.70, px, 0.2).unwrap();
/// assert!((vol - 0.11).abs() < 1e-8);
/// ```
pub fn solve_implied_vol(
    market: &FxMarket,
    option_type: OptionType,
    strike: f64,
    price: f64,
    guess: f64,
) -> Result<f64, AnalyticalError> {
    if !(strike > 0.0 && strike.is_finite()) {
        return Err(AnalyticalError::InvalidStrike { strike });
    }

    let model_at = |vol: f64| {
        GarmanKohlhagen::new(GarmanKohlhagenParams {
            market: *market,
            strike,
            volatility: vol,
        })
    };
    let objective = |vol: f64| model_at(vol).price(option_type) - price;
    let vega = |vol: f64| model_at(vol).raw_vega();

    let start = guess.clamp(MIN_IMPLIED_VOL, MAX_IMPLIED_VOL);
    let newton = NewtonRaphsonSolver::new(SolverConfig::new(1e-12, 50));
    match newton.find_root_within(&objective, &vega, start, MIN_IMPLIED_VOL, MAX_IMPLIED_VOL) {
        Ok(vol) => return Ok(vol),
        Err(e) => debug!(error = %e, strike, price, guess, "newton implied vol failed, trying brent"),
    }

    BrentSolver::new(SolverConfig::new(1e-12, 200))
        .find_root(&objective, MIN_IMPLIED_VOL, MAX_IMPLIED_VOL)
        .map_err(|source| AnalyticalError::ImpliedVolFailed {
            price,
            strike,
            source,
        })
}
