//! Delta buckets of a quoted FX smile.
//!
//! A smile is quoted at a fixed set of deltas. Surfaces use either the
//! three-bucket set (25Δ put, ATM, 25Δ call) or the five-bucket set which
//! adds the 10Δ wings. Buckets order from low strike to high strike.

use std::fmt;
use std::str::FromStr;

use fxvol_models::analytical::OptionType;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SurfaceError;

/// One quoted point on the delta axis.
///
/// # Examples
///
/// ```
/// use fxvol_surface::DeltaBucket;
///
/// let b: DeltaBucket = "25p".parse().unwrap();
/// assert_eq!(b, DeltaBucket::Put25);
/// assert_eq!(b.signed_delta(), -0.25);
/// assert_eq!(DeltaBucket::AtmDeltaNeutral.signed_delta(), 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeltaBucket {
    /// 10-delta put
    Put10,
    /// 25-delta put
    Put25,
    /// At-the-money delta-neutral straddle
    AtmDeltaNeutral,
    /// 25-delta call
    Call25,
    /// 10-delta call
    Call10,
}

impl DeltaBucket {
    /// The three-bucket set.
    pub const THREE: [DeltaBucket; 3] = [
        DeltaBucket::Put25,
        DeltaBucket::AtmDeltaNeutral,
        DeltaBucket::Call25,
    ];

    /// The five-bucket set.
    pub const FIVE: [DeltaBucket; 5] = [
        DeltaBucket::Put10,
        DeltaBucket::Put25,
        DeltaBucket::AtmDeltaNeutral,
        DeltaBucket::Call25,
        DeltaBucket::Call10,
    ];

    /// Short label: `10P`, `25P`, `ATM`, `25C`, `10C`.
    pub fn label(&self) -> &'static str {
        match self {
            DeltaBucket::Put10 => "10P",
            DeltaBucket::Put25 => "25P",
            DeltaBucket::AtmDeltaNeutral => "ATM",
            DeltaBucket::Call25 => "25C",
            DeltaBucket::Call10 => "10C",
        }
    }

    /// Delta with the sign of the option: puts negative, calls and ATM positive.
    pub fn signed_delta(&self) -> f64 {
        match self {
            DeltaBucket::Put10 => -0.10,
            DeltaBucket::Put25 => -0.25,
            DeltaBucket::AtmDeltaNeutral => 0.5,
            DeltaBucket::Call25 => 0.25,
            DeltaBucket::Call10 => 0.10,
        }
    }

    /// The option priced for this bucket; ATM prices as a call.
    pub fn option_type(&self) -> OptionType {
        OptionType::from_delta(self.signed_delta())
    }

    /// True for the at-the-money bucket.
    #[inline]
    pub fn is_atm(&self) -> bool {
        matches!(self, DeltaBucket::AtmDeltaNeutral)
    }

    /// Whether `buckets` is exactly the three- or five-bucket set.
    pub fn is_supported_set(buckets: &[DeltaBucket]) -> bool {
        buckets == DeltaBucket::THREE.as_slice() || buckets == DeltaBucket::FIVE.as_slice()
    }
}

impl FromStr for DeltaBucket {
    type Err = SurfaceError;

    /// Accepts the short labels in any case, with an optional `Δ`, plus
    /// the long ATM names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_uppercase().replace(['Δ', '_', ' '], "");
        match norm.as_str() {
            "10P" | "10PUT" | "PUT10" => Ok(DeltaBucket::Put10),
            "25P" | "25PUT" | "PUT25" => Ok(DeltaBucket::Put25),
            "ATM" | "ATMDN" | "ATMNEUTRAL" | "ATMDELTANEUTRAL" => Ok(DeltaBucket::AtmDeltaNeutral),
            "25C" | "25CALL" | "CALL25" => Ok(DeltaBucket::Call25),
            "10C" | "10CALL" | "CALL10" => Ok(DeltaBucket::Call10),
            _ => Err(SurfaceError::InvalidPillarInput(format!(
                "unknown delta bucket '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for DeltaBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DeltaBucket {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for DeltaBucket {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
