//! Delta-to-strike conversion.
//!
//! The solve runs in `y = d2` rather than in strike. With `s = σ√τ`,
//!
//! ```text
//! K(y) = F · exp(−s·y − s²/2),   d1 = y + s
//! ```
//!
//! so every convention becomes a smooth function of `y` on a fixed bracket
//! and Brent converges without needing a strike-scale initial guess.
//!
//! Premium-adjusted call delta `(K/F) N(d2)` is not monotone in strike: it
//! rises from zero at low strikes (small `K/F`), peaks, then falls. The
//! market convention takes the high-strike root, so the solve is restricted
//! to `y` below the peak. The peak satisfies `s·N(y) = n(y)`.

use fxvol_core::math::solvers::{BrentSolver, SolverConfig};
use fxvol_core::types::SolverError;
use tracing::debug;

use super::delta::DeltaConvention;
use super::distributions::{norm_cdf, norm_pdf};
use super::error::AnalyticalError;
use super::market::FxMarket;

/// Bracket in d2-space for monotone deltas.
const Y_BRACKET: f64 = 12.0;

/// Bracket for locating the premium-adjusted call peak.
const PEAK_BRACKET: f64 = 10.0;

fn solver() -> BrentSolver {
    BrentSolver::new(SolverConfig::new(1e-12, 200))
}

/// Strike at which an option has the signed `delta` under `convention`.
///
/// Positive deltas are calls, negative deltas puts. The forward is the
/// market's quoted forward or, failing that, the parity forward.
///
/// # Errors
///
/// * `AnalyticalError::InvalidVolatility` - volatility not strictly positive
/// * `AnalyticalError::UnattainableDelta` - zero, non-finite or out of reach
///   for the convention
///
/// # Examples
///
/// ```
/// use fxvol_models::analytical::{solve_strike, DeltaConvention, FxMarket};
///
/// // AUDUSD 1Y 30-delta put
/// let market = FxMarket::new(0.6662, 1.0, 0.04655, 0.05376).unwrap();
/// let k = solve_strike(&market, 0.1064786, -0.3, DeltaConvention::RegularSpot).unwrap();
/// assert!((k - 0.6410).abs() / 0.6410 < 1e-3);
/// ```
pub fn solve_strike(
    market: &FxMarket,
    volatility: f64,
    delta: f64,
    convention: DeltaConvention,
) -> Result<f64, AnalyticalError> {
    if !(volatility > 0.0 && volatility.is_finite()) {
        return Err(AnalyticalError::InvalidVolatility { volatility });
    }
    let unattainable = || AnalyticalError::UnattainableDelta {
        delta,
        convention: convention.name().to_string(),
        volatility,
    };
    if delta == 0.0 || !delta.is_finite() {
        return Err(unattainable());
    }

    let forward = market.forward();
    let s = volatility * market.tau.sqrt();
    let scale = if convention.is_spot() {
        market.df_foreign()
    } else {
        1.0
    };
    let is_call = delta > 0.0;

    let y = match (convention.is_premium_adjusted(), is_call) {
        (false, true) => solver().find_root(
            |y| scale * norm_cdf(y + s) - delta,
            -Y_BRACKET,
            Y_BRACKET,
        ),
        (false, false) => solver().find_root(
            |y| -scale * norm_cdf(-y - s) - delta,
            -Y_BRACKET,
            Y_BRACKET,
        ),
        (true, true) => {
            let peak = premium_adjusted_peak(s).map_err(|e| {
                debug!(error = %e, s, "premium-adjusted delta peak not found");
                unattainable()
            })?;
            solver().find_root(
                |y| scale * (-s * y - 0.5 * s * s).exp() * norm_cdf(y) - delta,
                -PEAK_BRACKET,
                peak,
            )
        }
        (true, false) => solver().find_root(
            |y| -scale * (-s * y - 0.5 * s * s).exp() * norm_cdf(-y) - delta,
            -Y_BRACKET,
            Y_BRACKET,
        ),
    };

    let y = y.map_err(|e| {
        debug!(error = %e, delta, %convention, volatility, "strike solve failed");
        unattainable()
    })?;
    Ok(forward * (-s * y - 0.5 * s * s).exp())
}

/// d2 at which premium-adjusted call delta peaks.
fn premium_adjusted_peak(s: f64) -> Result<f64, SolverError> {
    solver().find_root(
        |y| s * norm_cdf(y) - norm_pdf(y),
        -PEAK_BRACKET,
        PEAK_BRACKET,
    )
}
