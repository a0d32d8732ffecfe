//! ISO 4217 currency codes.
//!
//! # Examples
//!
//! ```
//! use fxvol_core::types::currency::Currency;
//!
//! let aud: Currency = "aud".parse().unwrap();
//! assert_eq!(aud, Currency::AUD);
//! assert_eq!(aud.code(), "AUD");
//! assert_eq!(Currency::JPY.decimal_places(), 0);
//! ```

use std::fmt;
use std::str::FromStr;

use super::error::CurrencyError;

macro_rules! currencies {
    ($($ccy:ident => $name:literal, $dp:literal;)+) => {
        /// ISO 4217 currency codes traded in the FX options market.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum Currency {
            $(
                #[doc = $name]
                $ccy,
            )+
        }

        impl Currency {
            /// Returns the ISO 4217 three-letter currency code.
            pub fn code(&self) -> &'static str {
                match self {
                    $(Currency::$ccy => stringify!($ccy),)+
                }
            }

            /// Returns the standard number of decimal places for this currency.
            pub fn decimal_places(&self) -> u8 {
                match self {
                    $(Currency::$ccy => $dp,)+
                }
            }
        }

        impl FromStr for Currency {
            type Err = CurrencyError;

            /// Parses an ISO 4217 code (case-insensitive).
            fn from_str(s: &str) -> Result<Self, CurrencyError> {
                match s.trim().to_uppercase().as_str() {
                    $(stringify!($ccy) => Ok(Currency::$ccy),)+
                    _ => Err(CurrencyError::UnknownCurrency(s.to_string())),
                }
            }
        }
    };
}

currencies! {
    USD => "United States Dollar", 2;
    EUR => "Euro", 2;
    GBP => "British Pound Sterling", 2;
    JPY => "Japanese Yen", 0;
    CHF => "Swiss Franc", 2;
    AUD => "Australian Dollar", 2;
    NZD => "New Zealand Dollar", 2;
    CAD => "Canadian Dollar", 2;
    NOK => "Norwegian Krone", 2;
    SEK => "Swedish Krona", 2;
    DKK => "Danish Krone", 2;
    SGD => "Singapore Dollar", 2;
    HKD => "Hong Kong Dollar", 2;
    CNH => "Offshore Chinese Yuan", 2;
    CNY => "Chinese Yuan", 2;
    KRW => "South Korean Won", 0;
    INR => "Indian Rupee", 2;
    MXN => "Mexican Peso", 2;
    BRL => "Brazilian Real", 2;
    ZAR => "South African Rand", 2;
    TRY => "Turkish Lira", 2;
    PLN => "Polish Zloty", 2;
    HUF => "Hungarian Forint", 2;
    CZK => "Czech Koruna", 2;
    ILS => "Israeli New Shekel", 2;
    PHP => "Philippine Peso", 2;
    RUB => "Russian Ruble", 2;
    THB => "Thai Baht", 2;
    TWD => "New Taiwan Dollar", 2;
}

impl fmt::Display for Currency {
    /// Formats as ISO 4217 code.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code_roundtrip() {
        for ccy in [Currency::USD, Currency::AUD, Currency::JPY, Currency::TRY] {
            assert_eq!(ccy.code().parse::<Currency>().unwrap(), ccy);
        }
    }

    #[test]
    fn test_currency_from_str_case_insensitive() {
        assert_eq!("nzd".parse::<Currency>().unwrap(), Currency::NZD);
        assert_eq!("Eur".parse::<Currency>().unwrap(), Currency::EUR);
    }

    #[test]
    fn test_currency_from_str_unknown() {
        match "XYZ".parse::<Currency>() {
            Err(CurrencyError::UnknownCurrency(code)) => assert_eq!(code, "XYZ"),
            other => panic!("Expected UnknownCurrency error, got {:?}", other),
        }
    }

    #[test]
    fn test_decimal_places() {
        assert_eq!(Currency::USD.decimal_places(), 2);
        assert_eq!(Currency::KRW.decimal_places(), 0);
    }
}
