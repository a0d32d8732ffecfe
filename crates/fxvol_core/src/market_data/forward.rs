//! FX forward curve.
//!
//! Outright forward rates keyed by expiry date. The quote on the curve date
//! is the spot rate. Between quotes the curve is linear in `ln F` over year
//! fraction, which is the same as a piecewise-constant interest-rate
//! differential.

use crate::market_data::error::MarketDataError;
use crate::math::interpolators::{Interpolator, LinearInterpolator};
use crate::types::{Date, DayCountConvention};

/// Immutable outright forward curve.
///
/// # Example
///
/// ```
/// use fxvol_core::market_data::ForwardCurve;
/// use fxvol_core::types::{Date, DayCountConvention};
///
/// let today = Date::from_ymd(2023, 6, 30).unwrap();
/// let one_year = Date::from_ymd(2024, 6, 30).unwrap();
/// let curve = ForwardCurve::new(
///     today,
///     DayCountConvention::Actual365Fixed,
///     &[(one_year, 0.6695), (today, 0.6629)],
/// )
/// .unwrap();
///
/// assert_eq!(curve.spot(), 0.6629);
/// assert_eq!(curve.rate(one_year).unwrap(), 0.6695);
/// assert!(curve.interpolate(&[Date::from_ymd(2025, 1, 1).unwrap()], false).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ForwardCurve {
    curve_date: Date,
    day_count: DayCountConvention,
    dates: Vec<Date>,
    rates: Vec<f64>,
    /// `ln F` against year fraction; `None` for a spot-only curve.
    log_interp: Option<LinearInterpolator<f64>>,
}

impl ForwardCurve {
    /// Builds the curve from (date, forward) quotes in any order.
    ///
    /// # Errors
    ///
    /// * `MarketDataError::InvalidRate` - a non-positive or non-finite rate
    /// * `MarketDataError::BeforeCurveDate` - a quote dated before the curve date
    /// * `MarketDataError::DuplicateDate` - a date quoted twice
    /// * `MarketDataError::MissingSpotQuote` - no quote on the curve date
    pub fn new(
        curve_date: Date,
        day_count: DayCountConvention,
        points: &[(Date, f64)],
    ) -> Result<Self, MarketDataError> {
        if let Some(&(date, rate)) = points.iter().find(|p| !(p.1 > 0.0 && p.1.is_finite())) {
            return Err(MarketDataError::InvalidRate { date, rate });
        }

        let mut points = points.to_vec();
        points.sort_by_key(|p| p.0);

        if let Some(&(date, _)) = points.iter().find(|p| p.0 < curve_date) {
            return Err(MarketDataError::BeforeCurveDate { date, curve_date });
        }
        if let Some(w) = points.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(MarketDataError::DuplicateDate(w[0].0));
        }
        if points.first().map(|p| p.0) != Some(curve_date) {
            return Err(MarketDataError::MissingSpotQuote { curve_date });
        }

        let (dates, rates): (Vec<Date>, Vec<f64>) = points.into_iter().unzip();
        let log_interp = if dates.len() >= 2 {
            let taus = day_count.year_fractions(curve_date, &dates);
            let logs: Vec<f64> = rates.iter().map(|r| r.ln()).collect();
            Some(LinearInterpolator::new(&taus, &logs)?)
        } else {
            None
        };

        Ok(Self {
            curve_date,
            day_count,
            dates,
            rates,
            log_interp,
        })
    }

    /// The curve date.
    pub fn curve_date(&self) -> Date {
        self.curve_date
    }

    /// Day count used for interpolation.
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// The spot rate, i.e. the quote on the curve date.
    pub fn spot(&self) -> f64 {
        self.rates[0]
    }

    /// The sorted quote dates, starting with the curve date.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// The quoted rates in date order.
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    /// The last quoted date.
    pub fn last_date(&self) -> Date {
        self.dates[self.dates.len() - 1]
    }

    /// Forward rate at one date, without extrapolation.
    pub fn rate(&self, date: Date) -> Result<f64, MarketDataError> {
        self.rate_at(date, false)
    }

    /// Forward rates at `dates`.
    ///
    /// Quoted dates are returned exactly. Dates outside the quoted range
    /// take the nearest boundary rate when `flat_extrapolate` is set and
    /// fail with `MarketDataError::OutOfRange` otherwise.
    pub fn interpolate(
        &self,
        dates: &[Date],
        flat_extrapolate: bool,
    ) -> Result<Vec<f64>, MarketDataError> {
        dates
            .iter()
            .map(|&d| self.rate_at(d, flat_extrapolate))
            .collect()
    }

    fn rate_at(&self, date: Date, flat_extrapolate: bool) -> Result<f64, MarketDataError> {
        let first = self.curve_date;
        let last = self.last_date();
        if date < first || date > last {
            if !flat_extrapolate {
                return Err(MarketDataError::OutOfRange { date, first, last });
            }
            let boundary = if date < first { 0 } else { self.rates.len() - 1 };
            return Ok(self.rates[boundary]);
        }

        if let Ok(i) = self.dates.binary_search(&date) {
            return Ok(self.rates[i]);
        }

        match &self.log_interp {
            Some(interp) => {
                let t = self.day_count.year_fraction(self.curve_date, date);
                Ok(interp.interpolate_flat(t)?.exp())
            }
            None => Ok(self.spot()),
        }
    }
}
