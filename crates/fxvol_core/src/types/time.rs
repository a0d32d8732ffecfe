//! Dates and day count conventions for FX market data.
//!
//! This module provides:
//! - `Date`: Type-safe date wrapper around chrono::NaiveDate
//! - `DayCountConvention`: Year fraction conventions used to turn expiry
//!   dates into option time-to-expiry
//!
//! # Examples
//!
//! ```
//! use fxvol_core::types::time::{Date, DayCountConvention};
//!
//! let start = Date::from_ymd(2024, 1, 1).unwrap();
//! let end = Date::from_ymd(2024, 7, 1).unwrap();
//!
//! let yf = DayCountConvention::Actual365Fixed.year_fraction(start, end);
//! assert!((yf - 0.4986).abs() < 0.001);
//! ```

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use super::error::DateError;

/// Type-safe date wrapper around chrono::NaiveDate.
///
/// Serialises as an ISO 8601 string. Subtraction yields a signed day count.
///
/// # Examples
///
/// ```
/// use fxvol_core::types::time::Date;
///
/// let date = Date::from_ymd(2024, 6, 15).unwrap();
/// let parsed: Date = "2024-06-15".parse().unwrap();
/// assert_eq!(date, parsed);
///
/// let start = Date::from_ymd(2024, 1, 1).unwrap();
/// let end = Date::from_ymd(2024, 1, 11).unwrap();
/// assert_eq!(end - start, 10);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a Date from year, month, and day components.
    ///
    /// # Returns
    /// `Ok(Date)` if the date is valid, `Err(DateError::InvalidDate)` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use fxvol_core::types::time::Date;
    ///
    /// assert!(Date::from_ymd(2024, 2, 29).is_ok());
    /// assert!(Date::from_ymd(2023, 2, 29).is_err());
    /// ```
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or(DateError::InvalidDate { year, month, day })
    }

    /// Parses a date from ISO 8601 format string (YYYY-MM-DD).
    ///
    /// # Examples
    ///
    /// ```
    /// use fxvol_core::types::time::Date;
    ///
    /// let date = Date::parse("2023-06-30").unwrap();
    /// assert_eq!(date.month(), 6);
    /// assert!(Date::parse("30/06/2023").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Date)
            .map_err(|e| DateError::ParseError(format!("'{}': {}", s, e)))
    }

    /// Returns the underlying NaiveDate.
    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// Returns the year component.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Shifts the date by a signed number of calendar days.
    ///
    /// # Examples
    ///
    /// ```
    /// use fxvol_core::types::time::Date;
    ///
    /// let d = Date::from_ymd(2024, 2, 28).unwrap();
    /// assert_eq!(d.add_days(2).unwrap(), Date::from_ymd(2024, 3, 1).unwrap());
    /// assert_eq!(d.add_days(-28).unwrap(), Date::from_ymd(2024, 1, 31).unwrap());
    /// ```
    pub fn add_days(self, days: i64) -> Result<Self, DateError> {
        let shifted = if days >= 0 {
            self.0.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.0.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        shifted
            .map(Date)
            .ok_or_else(|| DateError::Overflow(format!("{} {:+} days", self, days)))
    }

    /// Shifts the date by a signed number of months.
    ///
    /// Days past the end of the target month are clamped to its last day.
    ///
    /// # Examples
    ///
    /// ```
    /// use fxvol_core::types::time::Date;
    ///
    /// let d = Date::from_ymd(2024, 1, 31).unwrap();
    /// assert_eq!(d.add_months(1).unwrap(), Date::from_ymd(2024, 2, 29).unwrap());
    /// ```
    pub fn add_months(self, months: i32) -> Result<Self, DateError> {
        let shifted = if months >= 0 {
            self.0.checked_add_months(Months::new(months.unsigned_abs()))
        } else {
            self.0.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        shifted
            .map(Date)
            .ok_or_else(|| DateError::Overflow(format!("{} {:+} months", self, months)))
    }

    /// True on Saturdays and Sundays.
    pub fn is_weekend(&self) -> bool {
        matches!(self.0.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Moves forward `n` weekdays, skipping Saturdays and Sundays.
    ///
    /// # Examples
    ///
    /// ```
    /// use fxvol_core::types::time::Date;
    ///
    /// // Friday 2023-06-30 + 2 weekdays = Tuesday 2023-07-04
    /// let fri = Date::from_ymd(2023, 6, 30).unwrap();
    /// assert_eq!(fri.add_weekdays(2).unwrap(), Date::from_ymd(2023, 7, 4).unwrap());
    /// ```
    pub fn add_weekdays(self, n: u32) -> Result<Self, DateError> {
        let mut date = self;
        let mut remaining = n;
        while remaining > 0 {
            date = date.add_days(1)?;
            if !date.is_weekend() {
                remaining -= 1;
            }
        }
        Ok(date)
    }

    /// Moves back `n` weekdays.
    ///
    /// A weekend date first rolls back to the preceding Friday.
    ///
    /// # Examples
    ///
    /// ```
    /// use fxvol_core::types::time::Date;
    ///
    /// // Thursday 2024-07-04 - 2 weekdays = Tuesday 2024-07-02
    /// let thu = Date::from_ymd(2024, 7, 4).unwrap();
    /// assert_eq!(thu.sub_weekdays(2).unwrap(), Date::from_ymd(2024, 7, 2).unwrap());
    /// ```
    pub fn sub_weekdays(self, n: u32) -> Result<Self, DateError> {
        let mut date = self;
        while date.is_weekend() {
            date = date.add_days(-1)?;
        }
        let mut remaining = n;
        while remaining > 0 {
            date = date.add_days(-1)?;
            if !date.is_weekend() {
                remaining -= 1;
            }
        }
        Ok(date)
    }

    /// Every calendar date from `self` to `end`, both inclusive.
    ///
    /// Empty when `end` precedes `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fxvol_core::types::time::Date;
    ///
    /// let start = Date::from_ymd(2024, 2, 27).unwrap();
    /// let end = Date::from_ymd(2024, 3, 1).unwrap();
    /// assert_eq!(start.days_through(end).count(), 4);
    /// ```
    pub fn days_through(self, end: Date) -> impl Iterator<Item = Date> {
        self.0
            .iter_days()
            .take_while(move |d| *d <= end.0)
            .map(Date)
    }
}

impl From<NaiveDate> for Date {
    fn from(value: NaiveDate) -> Self {
        Date(value)
    }
}

impl Sub for Date {
    type Output = i64;

    /// Returns the number of days between two dates.
    ///
    /// The result is positive if `self` is after `other`, negative otherwise.
    fn sub(self, other: Self) -> i64 {
        (self.0 - other.0).num_days()
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, DateError> {
        Date::parse(s)
    }
}

impl fmt::Display for Date {
    /// Formats the date as ISO 8601 (YYYY-MM-DD).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Day Count Convention (year fraction convention).
///
/// # Variants
/// - `ActualActual`: ISDA actual/actual, splitting the period at year ends
/// - `Actual365Fixed`: Actual days / 365
/// - `Actual360`: Actual days / 360
/// - `Thirty360`: 30/360 US bond basis
///
/// # Usage
///
/// ```
/// use fxvol_core::types::time::{Date, DayCountConvention};
///
/// let start = Date::from_ymd(2023, 6, 30).unwrap();
/// let end = Date::from_ymd(2024, 6, 30).unwrap();
///
/// let yf = DayCountConvention::ActualActual.year_fraction(start, end);
/// assert!((yf - 1.0).abs() < 0.003);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DayCountConvention {
    /// Actual/Actual (ISDA).
    ///
    /// Days falling in a leap year count 1/366, other days 1/365.
    #[default]
    ActualActual,

    /// Actual/365 Fixed: actual_days / 365.0
    Actual365Fixed,

    /// Actual/360: actual_days / 360.0
    Actual360,

    /// 30/360 US Bond Basis
    ///
    /// Each month is treated as having 30 days, and the year as 360 days.
    Thirty360,
}

impl DayCountConvention {
    /// Returns the standard convention name.
    ///
    /// # Examples
    ///
    /// ```
    /// use fxvol_core::types::time::DayCountConvention;
    ///
    /// assert_eq!(DayCountConvention::ActualActual.name(), "ACT/ACT");
    /// assert_eq!(DayCountConvention::Actual360.name(), "ACT/360");
    /// ```
    pub fn name(&self) -> &'static str {
        match self {
            DayCountConvention::ActualActual => "ACT/ACT",
            DayCountConvention::Actual365Fixed => "ACT/365",
            DayCountConvention::Actual360 => "ACT/360",
            DayCountConvention::Thirty360 => "30/360",
        }
    }

    /// Year fraction between two dates.
    ///
    /// Returns a negative value when `start > end`.
    pub fn year_fraction(&self, start: Date, end: Date) -> f64 {
        if start > end {
            return -self.year_fraction(end, start);
        }

        match self {
            DayCountConvention::ActualActual => actual_actual_isda(start.0, end.0),
            DayCountConvention::Actual365Fixed => (end - start) as f64 / 365.0,
            DayCountConvention::Actual360 => (end - start) as f64 / 360.0,
            DayCountConvention::Thirty360 => {
                let d1 = start.day().min(30);
                let d2 = if end.day() == 31 && d1 == 30 { 30 } else { end.day() };

                let days = 360 * (end.year() - start.year())
                    + 30 * (end.month() as i32 - start.month() as i32)
                    + (d2 as i32 - d1 as i32);
                days as f64 / 360.0
            }
        }
    }

    /// Year fractions from a fixed start to each of `ends`.
    pub fn year_fractions(&self, start: Date, ends: &[Date]) -> Vec<f64> {
        ends.iter().map(|&end| self.year_fraction(start, end)).collect()
    }
}

fn days_in_year(year: i32) -> f64 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366.0
    } else {
        365.0
    }
}

// Assumes start <= end.
fn actual_actual_isda(start: NaiveDate, end: NaiveDate) -> f64 {
    if start.year() == end.year() {
        return (end - start).num_days() as f64 / days_in_year(start.year());
    }

    let mut fraction = 0.0;
    let mut cursor = start;
    for year in start.year()..end.year() {
        // Year boundaries are always representable for years reachable from a valid date.
        let next = NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap_or(end);
        fraction += (next - cursor).num_days() as f64 / days_in_year(year);
        cursor = next;
    }
    fraction + (end - cursor).num_days() as f64 / days_in_year(end.year())
}

impl FromStr for DayCountConvention {
    type Err = String;

    /// Parses day count convention from string (case-insensitive).
    ///
    /// Supports the aliases "ACT/ACT", "ACT/365", "ACT/365F", "ACT/360", "30/360"
    /// with or without separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace(['/', ' ', '_', '-'], "").as_str() {
            "ACTACT" | "ACTUALACTUAL" | "ACTACTISDA" => Ok(DayCountConvention::ActualActual),
            "ACT365" | "ACT365F" | "ACTUAL365" | "ACT365FIXED" | "A365" => {
                Ok(DayCountConvention::Actual365Fixed)
            }
            "ACT360" | "ACTUAL360" | "A360" => Ok(DayCountConvention::Actual360),
            "30360" | "THIRTY360" => Ok(DayCountConvention::Thirty360),
            _ => Err(format!("Unknown day count convention: {}", s)),
        }
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::DayCountConvention;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;

    impl Serialize for DayCountConvention {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(self.name())
        }
    }

    impl<'de> Deserialize<'de> for DayCountConvention {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            DayCountConvention::from_str(&s).map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    // ==========================================================
    // Date arithmetic
    // ==========================================================

    #[test]
    fn test_add_months_clamps_to_month_end() {
        assert_eq!(d(2023, 1, 31).add_months(1).unwrap(), d(2023, 2, 28));
        assert_eq!(d(2023, 3, 31).add_months(-1).unwrap(), d(2023, 2, 28));
    }

    #[test]
    fn test_sub_weekdays_skips_weekend() {
        // Tuesday back over the weekend to Friday
        assert_eq!(d(2023, 7, 4).sub_weekdays(2).unwrap(), d(2023, 6, 30));
        // Saturday rolls to Friday before stepping
        assert_eq!(d(2024, 8, 3).sub_weekdays(2).unwrap(), d(2024, 7, 31));
        assert_eq!(d(2024, 8, 3).sub_weekdays(0).unwrap(), d(2024, 8, 2));
    }

    #[test]
    fn test_days_through_inclusive() {
        let days: Vec<Date> = d(2023, 12, 30).days_through(d(2024, 1, 2)).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], d(2023, 12, 30));
        assert_eq!(days[3], d(2024, 1, 2));
    }

    #[test]
    fn test_days_through_empty_when_reversed() {
        assert_eq!(d(2024, 1, 2).days_through(d(2024, 1, 1)).count(), 0);
    }

    #[test]
    fn test_parse_display_roundtrip() {
        let date = d(2023, 6, 30);
        assert_eq!(date.to_string(), "2023-06-30");
        assert_eq!(Date::parse(" 2023-06-30 ").unwrap(), date);
    }

    // ==========================================================
    // Day count conventions
    // ==========================================================

    #[test]
    fn test_act_365_known_dates() {
        let yf = DayCountConvention::Actual365Fixed.year_fraction(d(2024, 1, 1), d(2024, 7, 1));
        assert_relative_eq!(yf, 182.0 / 365.0, epsilon = 1e-12);
    }

    #[test]
    fn test_act_360_known_dates() {
        let yf = DayCountConvention::Actual360.year_fraction(d(2024, 1, 1), d(2024, 7, 1));
        assert_relative_eq!(yf, 182.0 / 360.0, epsilon = 1e-12);
    }

    #[test]
    fn test_thirty_360_known_dates() {
        let yf = DayCountConvention::Thirty360.year_fraction(d(2024, 1, 31), d(2024, 7, 31));
        assert_relative_eq!(yf, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_act_act_isda_spans_leap_year() {
        // 2023-07-01 -> 2024-01-01: 184/365, then 2024-01-01 -> 2024-07-01: 182/366
        let yf = DayCountConvention::ActualActual.year_fraction(d(2023, 7, 1), d(2024, 7, 1));
        assert_relative_eq!(yf, 184.0 / 365.0 + 182.0 / 366.0, epsilon = 1e-12);
    }

    #[test]
    fn test_act_act_same_year() {
        let yf = DayCountConvention::ActualActual.year_fraction(d(2023, 1, 1), d(2023, 12, 31));
        assert_relative_eq!(yf, 364.0 / 365.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reversed_dates_negative() {
        let fwd = DayCountConvention::ActualActual.year_fraction(d(2023, 6, 30), d(2024, 3, 1));
        let back = DayCountConvention::ActualActual.year_fraction(d(2024, 3, 1), d(2023, 6, 30));
        assert_relative_eq!(fwd, -back, epsilon = 1e-14);
    }

    #[test]
    fn test_day_count_from_str_aliases() {
        assert_eq!(
            "act/act".parse::<DayCountConvention>().unwrap(),
            DayCountConvention::ActualActual
        );
        assert_eq!(
            "ACT/365F".parse::<DayCountConvention>().unwrap(),
            DayCountConvention::Actual365Fixed
        );
        assert_eq!(
            "30/360".parse::<DayCountConvention>().unwrap(),
            DayCountConvention::Thirty360
        );
        assert!("bus/252".parse::<DayCountConvention>().is_err());
    }
}
