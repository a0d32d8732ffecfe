//! FX market tenors.
//!
//! Tenors are resolved with plain calendar arithmetic: `ON` and `TN` count
//! from the curve date, everything else from the spot date. Month and year
//! tenors clamp to the end of the target month. Holiday calendars are not
//! applied.

use std::fmt;
use std::str::FromStr;

use super::error::TenorError;
use super::time::Date;

/// A market tenor label such as `SP`, `1W`, `3M` or `1Y`.
///
/// # Examples
///
/// ```
/// use fxvol_core::types::{Date, Tenor};
///
/// let spot = Date::from_ymd(2023, 7, 4).unwrap();
/// let curve = Date::from_ymd(2023, 6, 30).unwrap();
///
/// let t: Tenor = "3m".parse().unwrap();
/// assert_eq!(t.to_string(), "3M");
/// assert_eq!(t.resolve(curve, spot).unwrap(), Date::from_ymd(2023, 10, 4).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tenor {
    /// Overnight: curve date + 1 day.
    Overnight,
    /// Tom-next: curve date + 2 days.
    TomNext,
    /// The spot date itself.
    Spot,
    /// Spot-next: spot date + 1 day.
    SpotNext,
    /// Spot date + n days.
    Days(u32),
    /// Spot date + n weeks.
    Weeks(u32),
    /// Spot date + n months.
    Months(u32),
    /// Spot date + n years.
    Years(u32),
}

impl Tenor {
    /// Resolves the tenor to a delivery date.
    pub fn resolve(&self, curve_date: Date, spot_date: Date) -> Result<Date, TenorError> {
        let date = match *self {
            Tenor::Overnight => curve_date.add_days(1)?,
            Tenor::TomNext => curve_date.add_days(2)?,
            Tenor::Spot => spot_date,
            Tenor::SpotNext => spot_date.add_days(1)?,
            Tenor::Days(n) => spot_date.add_days(i64::from(n))?,
            Tenor::Weeks(n) => spot_date.add_days(7 * i64::from(n))?,
            Tenor::Months(n) => spot_date.add_months(to_i32(n)?)?,
            Tenor::Years(n) => spot_date.add_months(to_i32(n)?.saturating_mul(12))?,
        };
        Ok(date)
    }
}

fn to_i32(n: u32) -> Result<i32, TenorError> {
    i32::try_from(n).map_err(|_| TenorError::Unrecognised(n.to_string()))
}

impl FromStr for Tenor {
    type Err = TenorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_uppercase();
        match label.as_str() {
            "ON" | "O/N" => return Ok(Tenor::Overnight),
            "TN" | "T/N" => return Ok(Tenor::TomNext),
            "SP" | "SPOT" => return Ok(Tenor::Spot),
            "SN" | "S/N" => return Ok(Tenor::SpotNext),
            _ => {}
        }

        let unrecognised = || TenorError::Unrecognised(s.to_string());
        let split = label
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(unrecognised)?;
        let (count, unit) = label.split_at(split);
        let n: u32 = count.parse().map_err(|_| unrecognised())?;

        match unit {
            "D" => Ok(Tenor::Days(n)),
            "W" => Ok(Tenor::Weeks(n)),
            "M" => Ok(Tenor::Months(n)),
            "Y" => Ok(Tenor::Years(n)),
            _ => Err(unrecognised()),
        }
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tenor::Overnight => write!(f, "ON"),
            Tenor::TomNext => write!(f, "TN"),
            Tenor::Spot => write!(f, "SP"),
            Tenor::SpotNext => write!(f, "SN"),
            Tenor::Days(n) => write!(f, "{}D", n),
            Tenor::Weeks(n) => write!(f, "{}W", n),
            Tenor::Months(n) => write!(f, "{}M", n),
            Tenor::Years(n) => write!(f, "{}Y", n),
        }
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::Tenor;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;

    impl Serialize for Tenor {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for Tenor {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            Tenor::from_str(&s).map_err(de::Error::custom)
        }
    }
}
