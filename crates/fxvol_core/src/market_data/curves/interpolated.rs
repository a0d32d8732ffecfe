//! Zero curve interpolated between dated pillars.

use super::ZeroCurve;
use crate::market_data::error::MarketDataError;
use crate::math::interpolators::{Interpolator, LinearInterpolator};
use crate::types::{Date, DayCountConvention};

/// Interpolation method for zero curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CurveInterpolation {
    /// Linear in the zero rate over year fraction.
    #[default]
    Linear,

    /// Linear in `r·τ` (log discount factor), i.e. piecewise-constant
    /// instantaneous forwards.
    LogLinear,
}

/// Zero curve built from (date, rate) pillars.
///
/// Rates are held flat before the first and after the last pillar.
///
/// # Example
///
/// ```
/// use fxvol_core::market_data::curves::{CurveInterpolation, InterpolatedZeroCurve, ZeroCurve};
/// use fxvol_core::types::{Date, DayCountConvention};
///
/// let today = Date::from_ymd(2023, 6, 30).unwrap();
/// let dates = [today.add_days(30).unwrap(), today.add_days(365).unwrap()];
/// let curve = InterpolatedZeroCurve::new(
///     today,
///     DayCountConvention::Actual365Fixed,
///     &dates,
///     &[0.04, 0.05],
///     CurveInterpolation::Linear,
/// )
/// .unwrap();
///
/// assert_eq!(curve.zero_rate(today).unwrap(), 0.04);
/// assert_eq!(curve.zero_rate(today.add_days(1000).unwrap()).unwrap(), 0.05);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedZeroCurve {
    curve_date: Date,
    day_count: DayCountConvention,
    dates: Vec<Date>,
    rates: Vec<f64>,
    method: CurveInterpolation,
    interpolator: LinearInterpolator<f64>,
}

impl InterpolatedZeroCurve {
    /// Builds a curve from pillar dates and continuously compounded rates.
    ///
    /// # Errors
    ///
    /// * `MarketDataError::InsufficientData` - fewer than two pillars or mismatched lengths
    /// * `MarketDataError::BeforeCurveDate` - a pillar precedes the curve date
    /// * `MarketDataError::DuplicateDate` - a pillar date repeats
    pub fn new(
        curve_date: Date,
        day_count: DayCountConvention,
        dates: &[Date],
        rates: &[f64],
        method: CurveInterpolation,
    ) -> Result<Self, MarketDataError> {
        if dates.len() != rates.len() || dates.len() < 2 {
            return Err(MarketDataError::InsufficientData {
                got: dates.len().min(rates.len()),
                need: 2.max(dates.len()),
            });
        }

        let mut pillars: Vec<(Date, f64)> = dates.iter().copied().zip(rates.iter().copied()).collect();
        pillars.sort_by_key(|p| p.0);

        if let Some(&(date, _)) = pillars.iter().find(|p| p.0 < curve_date) {
            return Err(MarketDataError::BeforeCurveDate { date, curve_date });
        }
        if let Some(w) = pillars.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(MarketDataError::DuplicateDate(w[0].0));
        }

        let (dates, rates): (Vec<Date>, Vec<f64>) = pillars.into_iter().unzip();
        let taus = day_count.year_fractions(curve_date, &dates);
        let ys: Vec<f64> = match method {
            CurveInterpolation::Linear => rates.clone(),
            CurveInterpolation::LogLinear => taus.iter().zip(&rates).map(|(t, r)| t * r).collect(),
        };
        let interpolator = LinearInterpolator::new(&taus, &ys)?;

        Ok(Self {
            curve_date,
            day_count,
            dates,
            rates,
            method,
            interpolator,
        })
    }

    /// The sorted pillar dates.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// The pillar rates in date order.
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }
}

impl ZeroCurve for InterpolatedZeroCurve {
    fn curve_date(&self) -> Date {
        self.curve_date
    }

    fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    fn zero_rate(&self, date: Date) -> Result<f64, MarketDataError> {
        let t = self.year_fraction(date);
        let (t_first, t_last) = self.interpolator.domain();
        if t <= t_first {
            return Ok(self.rates[0]);
        }
        if t >= t_last {
            return Ok(self.rates[self.rates.len() - 1]);
        }
        let y = self.interpolator.interpolate(t)?;
        Ok(match self.method {
            CurveInterpolation::Linear => y,
            CurveInterpolation::LogLinear => y / t,
        })
    }
}
