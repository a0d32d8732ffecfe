//! FX delta conventions.
//!
//! FX smiles are quoted by delta rather than strike, and the market uses
//! four definitions of delta. With `s = σ√τ` and `φ = e^(−r_f·τ)`:
//!
//! | convention               | call delta      | put delta          |
//! |--------------------------|-----------------|--------------------|
//! | regular spot             | `φ N(d1)`       | `−φ N(−d1)`        |
//! | regular forward          | `N(d1)`         | `−N(−d1)`          |
//! | premium-adjusted spot    | `φ (K/F) N(d2)` | `−φ (K/F) N(−d2)`  |
//! | premium-adjusted forward | `(K/F) N(d2)`   | `−(K/F) N(−d2)`    |
//!
//! Premium-adjusted deltas apply when the premium is paid in the foreign
//! currency, which is the norm when USD is the foreign leg (USDJPY, USDCAD).

use std::fmt;
use std::str::FromStr;

use super::distributions::norm_cdf;
use super::error::AnalyticalError;
use super::market::{FxMarket, OptionType};

/// How a quoted delta relates to a strike.
///
/// # Examples
///
/// ```
/// use fxvol_models::analytical::DeltaConvention;
///
/// let c: DeltaConvention = "premium_adjusted_forward_Δ".parse().unwrap();
/// assert_eq!(c, DeltaConvention::PremiumAdjustedForward);
/// assert!(c.is_premium_adjusted());
/// assert!(!c.is_spot());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeltaConvention {
    /// `φ N(d1)`
    #[default]
    RegularSpot,
    /// `N(d1)`
    RegularForward,
    /// `φ (K/F) N(d2)`
    PremiumAdjustedSpot,
    /// `(K/F) N(d2)`
    PremiumAdjustedForward,
}

impl DeltaConvention {
    /// Canonical snake_case label.
    pub fn name(&self) -> &'static str {
        match self {
            DeltaConvention::RegularSpot => "regular_spot",
            DeltaConvention::RegularForward => "regular_forward",
            DeltaConvention::PremiumAdjustedSpot => "premium_adjusted_spot",
            DeltaConvention::PremiumAdjustedForward => "premium_adjusted_forward",
        }
    }

    /// True for the two premium-adjusted conventions.
    #[inline]
    pub fn is_premium_adjusted(&self) -> bool {
        matches!(
            self,
            DeltaConvention::PremiumAdjustedSpot | DeltaConvention::PremiumAdjustedForward
        )
    }

    /// True for the two spot conventions, which carry the `e^(−r_f·τ)` factor.
    #[inline]
    pub fn is_spot(&self) -> bool {
        matches!(
            self,
            DeltaConvention::RegularSpot | DeltaConvention::PremiumAdjustedSpot
        )
    }

    /// Delta of an option at `strike` under this convention.
    ///
    /// The sign follows `option_type`: positive for calls, negative for puts.
    pub fn delta(
        &self,
        market: &FxMarket,
        option_type: OptionType,
        strike: f64,
        volatility: f64,
    ) -> f64 {
        let cp = option_type.sign();
        let forward = market.forward();
        let s = volatility * market.tau.sqrt();
        let d1 = ((forward / strike).ln() + 0.5 * s * s) / s;
        let d2 = d1 - s;

        let undiscounted = if self.is_premium_adjusted() {
            cp * strike / forward * norm_cdf(cp * d2)
        } else {
            cp * norm_cdf(cp * d1)
        };
        if self.is_spot() {
            market.df_foreign() * undiscounted
        } else {
            undiscounted
        }
    }
}

impl FromStr for DeltaConvention {
    type Err = AnalyticalError;

    /// Accepts the canonical labels with or without a `_delta` / `_Δ`
    /// suffix, in any case, with `-` or spaces for underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_lowercase().replace(['-', ' '], "_");
        let stem = norm
            .strip_suffix("_delta")
            .or_else(|| norm.strip_suffix("_δ"))
            .unwrap_or(&norm);
        match stem {
            "regular_spot" | "spot" => Ok(DeltaConvention::RegularSpot),
            "regular_forward" | "forward" | "fwd" => Ok(DeltaConvention::RegularForward),
            "premium_adjusted_spot" | "pa_spot" => Ok(DeltaConvention::PremiumAdjustedSpot),
            "premium_adjusted_forward" | "pa_forward" | "pa_fwd" => {
                Ok(DeltaConvention::PremiumAdjustedForward)
            }
            _ => Err(AnalyticalError::UnknownConvention(s.to_string())),
        }
    }
}

impl fmt::Display for DeltaConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::DeltaConvention;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for DeltaConvention {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(self.name())
        }
    }

    impl<'de> Deserialize<'de> for DeltaConvention {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(de::Error::custom)
        }
    }
}
