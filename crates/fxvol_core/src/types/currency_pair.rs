//! FX currency pairs quoted as a six-letter code.
//!
//! The first three letters name the foreign (base) currency and the last
//! three the domestic (quote, pricing) currency, so `AUDUSD` quotes USD per
//! one AUD.

use std::fmt;
use std::str::FromStr;

use super::currency::Currency;
use super::error::{CurrencyError, DateError};
use super::time::Date;

/// Currencies that are customarily quoted ahead of USD.
const USD_QUOTED_CURRENCIES: [Currency; 4] =
    [Currency::AUD, Currency::EUR, Currency::GBP, Currency::NZD];

/// Currencies that settle T+1 against USD.
const T_PLUS_ONE_CURRENCIES: [Currency; 4] =
    [Currency::CAD, Currency::TRY, Currency::PHP, Currency::RUB];

/// A foreign/domestic currency pair.
///
/// # Examples
///
/// ```
/// use fxvol_core::types::{Currency, CurrencyPair};
///
/// let pair: CurrencyPair = "audusd".parse().unwrap();
/// assert_eq!(pair.foreign(), Currency::AUD);
/// assert_eq!(pair.domestic(), Currency::USD);
/// assert_eq!(pair.code(), "AUDUSD");
/// assert!(pair.convention_warning().is_none());
///
/// assert!("AUDUS".parse::<CurrencyPair>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    foreign: Currency,
    domestic: Currency,
}

impl CurrencyPair {
    /// Creates a pair from its two legs.
    ///
    /// # Errors
    ///
    /// `CurrencyError::SameCurrency` when both legs are equal.
    pub fn new(foreign: Currency, domestic: Currency) -> Result<Self, CurrencyError> {
        if foreign == domestic {
            return Err(CurrencyError::SameCurrency(foreign.code().to_string()));
        }
        Ok(Self { foreign, domestic })
    }

    /// The foreign (base) currency.
    pub fn foreign(&self) -> Currency {
        self.foreign
    }

    /// The domestic (quote) currency.
    pub fn domestic(&self) -> Currency {
        self.domestic
    }

    /// The six-letter upper-case code.
    pub fn code(&self) -> String {
        format!("{}{}", self.foreign.code(), self.domestic.code())
    }

    /// Business days between trade date and spot date.
    ///
    /// USDCAD, USDTRY, USDPHP and USDRUB (in either order) settle T+1,
    /// everything else T+2.
    pub fn spot_offset_days(&self) -> u32 {
        let usd_leg_t1 = |ccy: Currency| T_PLUS_ONE_CURRENCIES.contains(&ccy);
        match (self.foreign, self.domestic) {
            (Currency::USD, other) | (other, Currency::USD) if usd_leg_t1(other) => 1,
            _ => 2,
        }
    }

    /// Spot date for a trade on `curve_date`, skipping weekends only.
    pub fn spot_date(&self, curve_date: Date) -> Result<Date, DateError> {
        curve_date.add_weekdays(self.spot_offset_days())
    }

    /// Describes a non-conventional USD placement, if any.
    ///
    /// USD is normally the domestic currency for AUD, EUR, GBP and NZD and
    /// the foreign currency otherwise. A reversed quote is legal but unusual.
    pub fn convention_warning(&self) -> Option<String> {
        let code = self.code();
        if self.foreign == Currency::USD && USD_QUOTED_CURRENCIES.contains(&self.domestic) {
            Some(format!(
                "non conventional fx market {}: USD is typically the domestic currency for AUDUSD, EURUSD, GBPUSD and NZDUSD",
                code
            ))
        } else if self.domestic == Currency::USD && !USD_QUOTED_CURRENCIES.contains(&self.foreign)
        {
            Some(format!(
                "non conventional fx market {}: USD is typically the foreign currency except for AUDUSD, EURUSD, GBPUSD and NZDUSD",
                code
            ))
        } else {
            None
        }
    }
}

impl FromStr for CurrencyPair {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != 6 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyError::InvalidPairCode(s.to_string()));
        }
        let foreign: Currency = trimmed[..3].parse()?;
        let domestic: Currency = trimmed[3..].parse()?;
        Self::new(foreign, domestic)
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.foreign, self.domestic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================
    // Parsing
    // ==========================================================

    #[test]
    fn test_parse_lower_case() {
        let pair: CurrencyPair = "usdjpy".parse().unwrap();
        assert_eq!(pair.foreign(), Currency::USD);
        assert_eq!(pair.domestic(), Currency::JPY);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(matches!(
            "AUDUSDX".parse::<CurrencyPair>(),
            Err(CurrencyError::InvalidPairCode(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_letters() {
        assert!(matches!(
            "AUD/US".parse::<CurrencyPair>(),
            Err(CurrencyError::InvalidPairCode(_))
        ));
    }

    #[test]
    fn test_parse_rejects_same_currency() {
        assert!(matches!(
            "USDUSD".parse::<CurrencyPair>(),
            Err(CurrencyError::SameCurrency(_))
        ));
    }

    // ==========================================================
    // Market conventions
    // ==========================================================

    #[test]
    fn test_convention_warning_reversed_major() {
        let pair: CurrencyPair = "USDAUD".parse().unwrap();
        assert!(pair.convention_warning().is_some());
    }

    #[test]
    fn test_convention_warning_usd_domestic_for_minor() {
        let pair: CurrencyPair = "JPYUSD".parse().unwrap();
        assert!(pair.convention_warning().is_some());
    }

    #[test]
    fn test_conventional_pairs_do_not_warn() {
        for code in ["AUDUSD", "EURUSD", "USDJPY", "EURGBP"] {
            let pair: CurrencyPair = code.parse().unwrap();
            assert!(pair.convention_warning().is_none(), "{}", code);
        }
    }

    #[test]
    fn test_spot_offset() {
        assert_eq!("USDCAD".parse::<CurrencyPair>().unwrap().spot_offset_days(), 1);
        assert_eq!("CADUSD".parse::<CurrencyPair>().unwrap().spot_offset_days(), 1);
        assert_eq!("AUDUSD".parse::<CurrencyPair>().unwrap().spot_offset_days(), 2);
        assert_eq!("EURCAD".parse::<CurrencyPair>().unwrap().spot_offset_days(), 2);
    }

    #[test]
    fn test_spot_date_skips_weekend() {
        let friday = Date::from_ymd(2023, 6, 30).unwrap();
        let audusd: CurrencyPair = "AUDUSD".parse().unwrap();
        let usdcad: CurrencyPair = "USDCAD".parse().unwrap();
        assert_eq!(audusd.spot_date(friday).unwrap(), Date::from_ymd(2023, 7, 4).unwrap());
        assert_eq!(usdcad.spot_date(friday).unwrap(), Date::from_ymd(2023, 7, 3).unwrap());
    }
}
