//! Garman-Kohlhagen model for FX option pricing.
//!
//! This module provides the Garman-Kohlhagen closed-form solution for pricing
//! European FX options. It is Black-Scholes with two interest rates: the
//! foreign rate plays the role of a continuous dividend yield.
//!
//! # Mathematical Background
//!
//! The formulas are written in terms of the outright forward F so that a
//! quoted forward can replace the parity value:
//!
//! ## Call Option Price
//! C = e^(-rd*T) * [F * N(d1) - K * N(d2)]
//!
//! ## Put Option Price
//! P = e^(-rd*T) * [K * N(-d2) - F * N(-d1)]
//!
//! where:
//! d1 = [ln(F/K) + σ²T/2] / (σ * √T)
//! d2 = d1 - σ * √T
//!
//! With F = S * e^((rd - rf)T) these reduce to the textbook spot form.
//!
//! # Examples
//!
//! ```
//! use fxvol_models::analytical::{FxMarket, GarmanKohlhagen, GarmanKohlhagenParams, OptionType};
//!
//! let market = FxMarket::new(1.10, 1.0, 0.01, 0.03).unwrap();
//! let params = GarmanKohlhagenParams::new(market, 1.12, 0.15).unwrap();
//!
//! let model = GarmanKohlhagen::new(params);
//! let call_price = model.price(OptionType::Call);
//! let put_price = model.price(OptionType::Put);
//!
//! // Put-call parity check
//! let parity_diff = call_price - put_price
//!     - (1.10 * (-0.01_f64).exp() - 1.12 * (-0.03_f64).exp());
//! assert!(parity_diff.abs() < 1e-10);
//! ```

use super::distributions::{norm_cdf, norm_pdf};
use super::error::AnalyticalError;
use super::market::{FxMarket, OptionType};

const DAYS_PER_YEAR: f64 = 365.0;

/// Parameters for the Garman-Kohlhagen model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GarmanKohlhagenParams {
    /// Spot, expiry, rates and optional quoted forward.
    pub market: FxMarket,
    /// Strike, domestic units per foreign unit.
    pub strike: f64,
    /// Volatility of the exchange rate.
    pub volatility: f64,
}

impl GarmanKohlhagenParams {
    /// Creates new Garman-Kohlhagen parameters.
    ///
    /// # Errors
    ///
    /// * `AnalyticalError::InvalidStrike` - strike not strictly positive
    /// * `AnalyticalError::InvalidVolatility` - volatility not strictly positive
    pub fn new(market: FxMarket, strike: f64, volatility: f64) -> Result<Self, AnalyticalError> {
        if !(strike > 0.0 && strike.is_finite()) {
            return Err(AnalyticalError::InvalidStrike { strike });
        }
        if !(volatility > 0.0 && volatility.is_finite()) {
            return Err(AnalyticalError::InvalidVolatility { volatility });
        }
        Ok(Self {
            market,
            strike,
            volatility,
        })
    }
}

/// Analytical sensitivities.
///
/// Scaling follows FX desk conventions: vega and both rhos are per 1%
/// move, theta is per calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Greeks {
    /// ∂V/∂S
    pub delta: f64,
    /// ∂²V/∂S²
    pub gamma: f64,
    /// ∂V/∂σ per 1% volatility
    pub vega: f64,
    /// ∂V/∂t per day
    pub theta: f64,
    /// ∂V/∂r_d per 1%
    pub rho_domestic: f64,
    /// ∂V/∂r_f per 1%
    pub rho_foreign: f64,
}

/// Intrinsic value and time value of a premium.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntrinsicSplit {
    /// max(cp·(F − K), 0) discounted at the domestic rate.
    pub intrinsic: f64,
    /// Price less intrinsic.
    pub time_value: f64,
}

/// Garman-Kohlhagen model for FX option pricing.
///
/// Provides closed-form solutions for European FX options including
/// price and Greeks calculations.
#[derive(Debug, Clone)]
pub struct GarmanKohlhagen {
    params: GarmanKohlhagenParams,
    forward: f64,
    /// d1 term from the formula.
    d1: f64,
    /// d2 term from the formula.
    d2: f64,
    /// √T
    sqrt_t: f64,
    /// e^(-rd * T)
    df_domestic: f64,
}

impl GarmanKohlhagen {
    /// Creates a new Garman-Kohlhagen model instance.
    ///
    /// Pre-computes d1, d2, the forward and the domestic discount factor.
    pub fn new(params: GarmanKohlhagenParams) -> Self {
        let market = params.market;
        let forward = market.forward();
        let sqrt_t = market.tau.sqrt();
        let vol_sqrt_t = params.volatility * sqrt_t;

        let d1 = ((forward / params.strike).ln() + 0.5 * vol_sqrt_t * vol_sqrt_t) / vol_sqrt_t;
        let d2 = d1 - vol_sqrt_t;

        Self {
            params,
            forward,
            d1,
            d2,
            sqrt_t,
            df_domestic: market.df_domestic(),
        }
    }

    /// Returns a reference to the parameters.
    #[inline]
    pub fn params(&self) -> &GarmanKohlhagenParams {
        &self.params
    }

    /// Returns the forward used for pricing.
    #[inline]
    pub fn forward(&self) -> f64 {
        self.forward
    }

    /// Returns d1.
    #[inline]
    pub fn d1(&self) -> f64 {
        self.d1
    }

    /// Returns d2.
    #[inline]
    pub fn d2(&self) -> f64 {
        self.d2
    }

    /// Computes the option price in domestic currency per unit of foreign notional.
    pub fn price(&self, option_type: OptionType) -> f64 {
        let cp = option_type.sign();
        let k = self.params.strike;
        self.df_domestic * cp * (self.forward * norm_cdf(cp * self.d1) - k * norm_cdf(cp * self.d2))
    }

    /// Computes spot Delta.
    pub fn delta(&self, option_type: OptionType) -> f64 {
        let cp = option_type.sign();
        // e^(-rf*T) = e^(-rd*T) * F / S
        cp * self.df_foreign() * norm_cdf(cp * self.d1)
    }

    /// Computes Gamma. Same for calls and puts.
    pub fn gamma(&self) -> f64 {
        let spot = self.params.market.spot;
        self.df_foreign() * norm_pdf(self.d1) / (spot * self.params.volatility * self.sqrt_t)
    }

    /// Computes Vega per 1% volatility change.
    pub fn vega(&self) -> f64 {
        self.raw_vega() / 100.0
    }

    /// ∂V/∂σ per unit of volatility, as used by implied volatility solvers.
    pub fn raw_vega(&self) -> f64 {
        self.df_domestic * self.forward * norm_pdf(self.d1) * self.sqrt_t
    }

    /// Computes Theta per calendar day.
    pub fn theta(&self, option_type: OptionType) -> f64 {
        let cp = option_type.sign();
        let market = &self.params.market;
        let fwd_pv = self.forward * self.df_domestic;
        let strike_pv = self.params.strike * self.df_domestic;

        let decay = -fwd_pv * norm_pdf(self.d1) * self.params.volatility / (2.0 * self.sqrt_t);
        let carry = cp
            * (market.rate_foreign * fwd_pv * norm_cdf(cp * self.d1)
                - market.rate_domestic * strike_pv * norm_cdf(cp * self.d2));
        (decay + carry) / DAYS_PER_YEAR
    }

    /// Computes Rho (domestic) per 1% rate change.
    pub fn rho_domestic(&self, option_type: OptionType) -> f64 {
        let cp = option_type.sign();
        let tau = self.params.market.tau;
        cp * self.params.strike * tau * self.df_domestic * norm_cdf(cp * self.d2) / 100.0
    }

    /// Computes Rho (foreign) per 1% rate change.
    pub fn rho_foreign(&self, option_type: OptionType) -> f64 {
        let cp = option_type.sign();
        let tau = self.params.market.tau;
        -cp * tau * self.forward * self.df_domestic * norm_cdf(cp * self.d1) / 100.0
    }

    /// All analytical Greeks at once.
    pub fn greeks(&self, option_type: OptionType) -> Greeks {
        Greeks {
            delta: self.delta(option_type),
            gamma: self.gamma(),
            vega: self.vega(),
            theta: self.theta(option_type),
            rho_domestic: self.rho_domestic(option_type),
            rho_foreign: self.rho_foreign(option_type),
        }
    }

    /// Splits the premium into intrinsic and time value.
    ///
    /// Intrinsic is measured against the forward, so a deep in-the-money
    /// option has a time value close to zero rather than negative carry.
    pub fn intrinsic_split(&self, option_type: OptionType) -> IntrinsicSplit {
        let cp = option_type.sign();
        let intrinsic = (cp * (self.forward - self.params.strike)).max(0.0) * self.df_domestic;
        IntrinsicSplit {
            intrinsic,
            time_value: self.price(option_type) - intrinsic,
        }
    }

    /// Greeks by central finite differences, in the same units as [`Self::greeks`].
    ///
    /// Spot bumps move a quoted forward proportionally; rate and time bumps
    /// move it by the parity factor. Used to cross-check the closed forms.
    pub fn numerical_greeks(&self, option_type: OptionType) -> Greeks {
        let base = self.params;
        let market = base.market;
        let reprice = |m: FxMarket, vol: f64| {
            GarmanKohlhagen::new(GarmanKohlhagenParams {
                market: m,
                volatility: vol,
                ..base
            })
            .price(option_type)
        };
        let scale_forward = |m: FxMarket, factor: f64| FxMarket {
            forward: m.forward.map(|f| f * factor),
            ..m
        };

        let v0 = self.price(option_type);

        let h_s = market.spot * 1e-4;
        let up = scale_forward(
            FxMarket {
                spot: market.spot + h_s,
                ..market
            },
            (market.spot + h_s) / market.spot,
        );
        let down = scale_forward(
            FxMarket {
                spot: market.spot - h_s,
                ..market
            },
            (market.spot - h_s) / market.spot,
        );
        let v_up = reprice(up, base.volatility);
        let v_down = reprice(down, base.volatility);
        let delta = (v_up - v_down) / (2.0 * h_s);
        let gamma = (v_up - 2.0 * v0 + v_down) / (h_s * h_s);

        let h_v = 1e-4;
        let vega = (reprice(market, base.volatility + h_v) - reprice(market, base.volatility - h_v))
            / (2.0 * h_v)
            / 100.0;

        let h_t = 1.0 / DAYS_PER_YEAR;
        let carry = market.rate_domestic - market.rate_foreign;
        let longer = scale_forward(
            FxMarket {
                tau: market.tau + h_t,
                ..market
            },
            (carry * h_t).exp(),
        );
        let shorter = scale_forward(
            FxMarket {
                tau: market.tau - h_t,
                ..market
            },
            (-carry * h_t).exp(),
        );
        let theta = if market.tau > h_t {
            -(reprice(longer, base.volatility) - reprice(shorter, base.volatility)) / (2.0 * h_t)
                / DAYS_PER_YEAR
        } else {
            -(reprice(longer, base.volatility) - v0) / h_t / DAYS_PER_YEAR
        };

        let h_r = 1e-4;
        let rate_bump = |dr_d: f64, dr_f: f64| {
            scale_forward(
                FxMarket {
                    rate_domestic: market.rate_domestic + dr_d,
                    rate_foreign: market.rate_foreign + dr_f,
                    ..market
                },
                ((dr_d - dr_f) * market.tau).exp(),
            )
        };
        let rho_domestic = (reprice(rate_bump(h_r, 0.0), base.volatility)
            - reprice(rate_bump(-h_r, 0.0), base.volatility))
            / (2.0 * h_r)
            / 100.0;
        let rho_foreign = (reprice(rate_bump(0.0, h_r), base.volatility)
            - reprice(rate_bump(0.0, -h_r), base.volatility))
            / (2.0 * h_r)
            / 100.0;

        Greeks {
            delta,
            gamma,
            vega,
            theta,
            rho_domestic,
            rho_foreign,
        }
    }

    #[inline]
    fn df_foreign(&self) -> f64 {
        self.df_domestic * self.forward / self.params.market.spot
    }
}

/// Prices one option from loose inputs.
///
/// # Errors
///
/// Any validation error from [`FxMarket::new`] or [`GarmanKohlhagenParams::new`].
pub fn gk_price(
    market: FxMarket,
    option_type: OptionType,
    strike: f64,
    volatility: f64,
) -> Result<f64, AnalyticalError> {
    let params = GarmanKohlhagenParams::new(market, strike, volatility)?;
    Ok(GarmanKohlhagen::new(params).price(option_type))
}
