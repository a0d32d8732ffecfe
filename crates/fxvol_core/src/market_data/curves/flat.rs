//! Flat zero curve.

use super::ZeroCurve;
use crate::market_data::error::MarketDataError;
use crate::types::{Date, DayCountConvention};

/// Zero curve with the same rate at every date.
///
/// # Example
///
/// ```
/// use fxvol_core::market_data::curves::{FlatZeroCurve, ZeroCurve};
/// use fxvol_core::types::{Date, DayCountConvention};
///
/// let today = Date::from_ymd(2024, 1, 2).unwrap();
/// let curve = FlatZeroCurve::new(today, DayCountConvention::ActualActual, 0.03);
/// assert_eq!(curve.zero_rate(today.add_days(700).unwrap()).unwrap(), 0.03);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatZeroCurve {
    curve_date: Date,
    day_count: DayCountConvention,
    rate: f64,
}

impl FlatZeroCurve {
    /// Creates a flat curve.
    pub fn new(curve_date: Date, day_count: DayCountConvention, rate: f64) -> Self {
        Self {
            curve_date,
            day_count,
            rate,
        }
    }

    /// The constant rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl ZeroCurve for FlatZeroCurve {
    fn curve_date(&self) -> Date {
        self.curve_date
    }

    fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    fn zero_rate(&self, _date: Date) -> Result<f64, MarketDataError> {
        Ok(self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_discount_factor_act365() {
        let today = Date::from_ymd(2023, 6, 30).unwrap();
        let curve = FlatZeroCurve::new(today, DayCountConvention::Actual365Fixed, 0.05);
        let df = curve.discount_factor(today.add_days(730).unwrap()).unwrap();
        assert_relative_eq!(df, (-0.1f64).exp(), epsilon = 1e-14);
    }

    #[test]
    fn test_negative_rate() {
        let today = Date::from_ymd(2023, 6, 30).unwrap();
        let curve = FlatZeroCurve::new(today, DayCountConvention::Actual365Fixed, -0.005);
        assert!(curve.discount_factor(today.add_days(365).unwrap()).unwrap() > 1.0);
    }
}
