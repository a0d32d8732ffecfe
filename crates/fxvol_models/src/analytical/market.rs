//! Market inputs shared by the analytical formulas.
//!
//! [`FxMarket`] bundles spot, time to expiry and the two continuously
//! compounded zero rates. The outright forward defaults to covered interest
//! parity, `F = S·exp((r_d − r_f)·τ)`, but a quoted forward can be supplied
//! when it differs from the parity value.

use std::fmt;
use std::str::FromStr;

use super::error::AnalyticalError;

/// FX option type (Call or Put).
///
/// - Call: Right to buy the foreign currency at the strike
/// - Put: Right to sell the foreign currency at the strike
///
/// # Examples
///
/// ```
/// use fxvol_models::analytical::OptionType;
///
/// assert_eq!("c".parse::<OptionType>().unwrap(), OptionType::Call);
/// assert_eq!(OptionType::Put.sign(), -1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OptionType {
    /// Right to buy the foreign currency.
    Call,
    /// Right to sell the foreign currency.
    Put,
}

impl OptionType {
    /// +1 for a call, −1 for a put.
    #[inline]
    pub fn sign(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Returns whether this is a call option.
    #[inline]
    pub fn is_call(&self) -> bool {
        matches!(self, OptionType::Call)
    }

    /// The type whose delta has the sign of `delta`; zero maps to a call.
    #[inline]
    pub fn from_delta(delta: f64) -> Self {
        if delta < 0.0 {
            OptionType::Put
        } else {
            OptionType::Call
        }
    }
}

impl FromStr for OptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "call" | "c" | "1" => Ok(OptionType::Call),
            "put" | "p" | "-1" => Ok(OptionType::Put),
            _ => Err(format!("Unknown option type: {}", s)),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

/// Spot, expiry and rates for one expiry.
///
/// # Examples
///
/// ```
/// use fxvol_models::analytical::FxMarket;
///
/// let market = FxMarket::new(0.6629, 1.0, 0.0466, 0.05381).unwrap();
/// let parity = 0.6629 * (0.05381f64 - 0.0466).exp();
/// assert!((market.forward() - parity).abs() < 1e-12);
///
/// let quoted = market.with_forward(0.667962).unwrap();
/// assert_eq!(quoted.forward(), 0.667962);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FxMarket {
    /// Spot rate, domestic units per foreign unit.
    pub spot: f64,
    /// Time to expiry in years.
    pub tau: f64,
    /// Foreign continuously compounded zero rate.
    pub rate_foreign: f64,
    /// Domestic continuously compounded zero rate.
    pub rate_domestic: f64,
    /// Quoted outright forward, if it overrides parity.
    pub forward: Option<f64>,
}

impl FxMarket {
    /// Creates market inputs with a parity forward.
    ///
    /// # Errors
    ///
    /// * `AnalyticalError::InvalidSpot` - spot not strictly positive
    /// * `AnalyticalError::InvalidExpiry` - `tau` not strictly positive
    pub fn new(
        spot: f64,
        tau: f64,
        rate_foreign: f64,
        rate_domestic: f64,
    ) -> Result<Self, AnalyticalError> {
        if !(spot > 0.0 && spot.is_finite()) {
            return Err(AnalyticalError::InvalidSpot { spot });
        }
        if !(tau > 0.0 && tau.is_finite()) {
            return Err(AnalyticalError::InvalidExpiry { tau });
        }
        Ok(Self {
            spot,
            tau,
            rate_foreign,
            rate_domestic,
            forward: None,
        })
    }

    /// Overrides the parity forward with a quoted one.
    pub fn with_forward(mut self, forward: f64) -> Result<Self, AnalyticalError> {
        if !(forward > 0.0 && forward.is_finite()) {
            return Err(AnalyticalError::InvalidSpot { spot: forward });
        }
        self.forward = Some(forward);
        Ok(self)
    }

    /// Outright forward: the quoted one or `S·exp((r_d − r_f)·τ)`.
    #[inline]
    pub fn forward(&self) -> f64 {
        self.forward.unwrap_or_else(|| {
            self.spot * ((self.rate_domestic - self.rate_foreign) * self.tau).exp()
        })
    }

    /// e^(−r_d·τ)
    #[inline]
    pub fn df_domestic(&self) -> f64 {
        (-self.rate_domestic * self.tau).exp()
    }

    /// e^(−r_f·τ)
    #[inline]
    pub fn df_foreign(&self) -> f64 {
        (-self.rate_foreign * self.tau).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_option_type_parsing() {
        assert_eq!("CALL".parse::<OptionType>().unwrap(), OptionType::Call);
        assert_eq!(" put ".parse::<OptionType>().unwrap(), OptionType::Put);
        assert_eq!("-1".parse::<OptionType>().unwrap(), OptionType::Put);
        assert!("straddle".parse::<OptionType>().is_err());
    }

    #[test]
    fn test_option_type_from_delta() {
        assert_eq!(OptionType::from_delta(-0.25), OptionType::Put);
        assert_eq!(OptionType::from_delta(0.5), OptionType::Call);
    }

    #[test]
    fn test_market_rejects_bad_inputs() {
        assert!(matches!(
            FxMarket::new(0.0, 1.0, 0.0, 0.0),
            Err(AnalyticalError::InvalidSpot { .. })
        ));
        assert!(matches!(
            FxMarket::new(1.0, 0.0, 0.0, 0.0),
            Err(AnalyticalError::InvalidExpiry { .. })
        ));
        let market = FxMarket::new(1.0, 1.0, 0.0, 0.0).unwrap();
        assert!(market.with_forward(-1.0).is_err());
    }

    #[test]
    fn test_discount_factors() {
        let market = FxMarket::new(1.1, 2.0, 0.01, 0.03).unwrap();
        assert_relative_eq!(market.df_domestic(), (-0.06f64).exp(), epsilon = 1e-15);
        assert_relative_eq!(market.df_foreign(), (-0.02f64).exp(), epsilon = 1e-15);
        assert_relative_eq!(
            market.forward(),
            1.1 * market.df_foreign() / market.df_domestic(),
            epsilon = 1e-14
        );
    }
}
