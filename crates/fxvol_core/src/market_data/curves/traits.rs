//! Zero curve trait definition.

use std::fmt::Debug;

use crate::market_data::error::MarketDataError;
use crate::types::{Date, DayCountConvention};

/// A continuously compounded zero-rate curve keyed by date.
///
/// Curves are shared between the surface and its consumers behind an
/// `Arc<dyn ZeroCurve>`, hence the `Send + Sync` bound.
///
/// # Contract
///
/// - `zero_rate(d)` is the continuously compounded rate from the curve date to `d`
/// - `discount_factor(d) = exp(−r(d)·τ(d))` with `τ` from `day_count()`
/// - `discount_factor(curve_date) = 1`
///
/// # Example
///
/// ```
/// use fxvol_core::market_data::curves::{FlatZeroCurve, ZeroCurve};
/// use fxvol_core::types::{Date, DayCountConvention};
///
/// let today = Date::from_ymd(2024, 1, 2).unwrap();
/// let curve = FlatZeroCurve::new(today, DayCountConvention::Actual365Fixed, 0.05);
/// let one_year = today.add_days(365).unwrap();
/// assert!((curve.discount_factor(one_year).unwrap() - (-0.05f64).exp()).abs() < 1e-12);
/// ```
pub trait ZeroCurve: Send + Sync + Debug {
    /// The valuation date of the curve.
    fn curve_date(&self) -> Date;

    /// Day count used to turn dates into year fractions.
    fn day_count(&self) -> DayCountConvention;

    /// Continuously compounded zero rate to `date`.
    fn zero_rate(&self, date: Date) -> Result<f64, MarketDataError>;

    /// Year fraction from the curve date to `date`.
    fn year_fraction(&self, date: Date) -> f64 {
        self.day_count().year_fraction(self.curve_date(), date)
    }

    /// Discount factor to `date`.
    fn discount_factor(&self, date: Date) -> Result<f64, MarketDataError> {
        let r = self.zero_rate(date)?;
        Ok((-r * self.year_fraction(date)).exp())
    }

    /// Zero rates for a batch of dates.
    fn zero_rates(&self, dates: &[Date]) -> Result<Vec<f64>, MarketDataError> {
        dates.iter().map(|&d| self.zero_rate(d)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct MockCurve {
        today: Date,
        rate: f64,
    }

    impl ZeroCurve for MockCurve {
        fn curve_date(&self) -> Date {
            self.today
        }

        fn day_count(&self) -> DayCountConvention {
            DayCountConvention::Actual360
        }

        fn zero_rate(&self, _date: Date) -> Result<f64, MarketDataError> {
            Ok(self.rate)
        }
    }

    #[test]
    fn test_default_discount_factor() {
        let today = Date::from_ymd(2024, 1, 1).unwrap();
        let curve = MockCurve { today, rate: 0.036 };
        let df = curve.discount_factor(today.add_days(360).unwrap()).unwrap();
        assert!((df - (-0.036f64).exp()).abs() < 1e-14);
        assert_eq!(curve.discount_factor(today).unwrap(), 1.0);
    }

    #[test]
    fn test_default_zero_rates_batch() {
        let today = Date::from_ymd(2024, 1, 1).unwrap();
        let curve = MockCurve { today, rate: 0.01 };
        let dates = [today, today.add_days(10).unwrap()];
        assert_eq!(curve.zero_rates(&dates).unwrap(), vec![0.01, 0.01]);
    }
}
