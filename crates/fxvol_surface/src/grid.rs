//! Daily volatility term structure.
//!
//! Between two pillars each bucket's vol follows the flat-forward rule:
//! the forward variance between the pillars is constant, so
//!
//! ```text
//! σ_fwd² = (σ2²·t2 − σ1²·t1) / (t2 − t1)
//! σ(t)²  = (σ1²·t1 + σ_fwd²·(t − t1)) / t
//! ```
//!
//! and total variance `σ(t)²·t` is linear in `t` between pillars.

use std::collections::BTreeMap;

use fxvol_core::market_data::{ForwardCurve, ZeroCurve};
use fxvol_core::types::{Date, DayCountConvention};
use fxvol_models::analytical::DeltaConvention;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bucket::DeltaBucket;
use crate::error::{SurfaceError, SurfaceResult};
use crate::pillar::PillarTable;

/// Forward vol between `t1` and `t2`.
///
/// # Errors
///
/// * `SurfaceError::InvalidPillarInput` - `t2 < t1`
/// * `SurfaceError::NegativeVariance` - total variance decreases from `t1` to `t2`
///
/// # Examples
///
/// ```
/// use fxvol_surface::forward_volatility;
///
/// // 10% to 0.5y then 12% to 1y: the second half runs at about 13.7%.
/// let fwd = forward_volatility(0.5, 0.10, 1.0, 0.12).unwrap();
/// assert!((fwd * fwd - (0.0144 - 0.005) / 0.5).abs() < 1e-15);
///
/// assert!(forward_volatility(0.5, 0.20, 1.0, 0.10).is_err());
/// ```
pub fn forward_volatility(t1: f64, sigma1: f64, t2: f64, sigma2: f64) -> SurfaceResult<f64> {
    if t2 < t1 {
        return Err(SurfaceError::InvalidPillarInput(format!(
            "forward volatility needs t2 >= t1, got t1 = {} and t2 = {}",
            t1, t2
        )));
    }
    debug_assert!(t2 > t1, "forward volatility over an empty interval at t = {}", t1);

    let variance = (sigma2 * sigma2 * t2 - sigma1 * sigma1 * t1) / (t2 - t1);
    if variance < 0.0 {
        return Err(SurfaceError::NegativeVariance { tau: t2, variance });
    }
    Ok(variance.sqrt())
}

/// Vol at `t` between `(t1, σ1)` and `(t2, σ2)` under constant forward variance.
///
/// # Examples
///
/// ```
/// use fxvol_surface::flat_forward_interp;
///
/// let mid = flat_forward_interp(0.25, 0.09, 1.0, 0.10, 0.5).unwrap();
/// assert!(mid > 0.09 && mid < 0.10);
/// assert!((flat_forward_interp(0.25, 0.09, 1.0, 0.10, 1.0).unwrap() - 0.10).abs() < 1e-15);
/// ```
pub fn flat_forward_interp(t1: f64, sigma1: f64, t2: f64, sigma2: f64, t: f64) -> SurfaceResult<f64> {
    let forward = forward_volatility(t1, sigma1, t2, sigma2)?;
    let variance = (sigma1 * sigma1 * t1 + forward * forward * (t - t1)) / t;
    if variance < 0.0 {
        return Err(SurfaceError::NegativeVariance { tau: t, variance });
    }
    Ok(variance.sqrt())
}

/// One calendar day of the term structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRow {
    /// Calendar date.
    pub date: Date,
    /// Year fraction from the curve date.
    pub tau: f64,
    /// Flat-forward vol per bucket.
    pub vols: BTreeMap<DeltaBucket, f64>,
    /// Foreign continuously compounded zero rate.
    pub rate_foreign: f64,
    /// Domestic continuously compounded zero rate.
    pub rate_domestic: f64,
    /// Outright forward.
    pub forward: f64,
    /// Delta convention the bucket vols are read with.
    pub convention: DeltaConvention,
}

/// Flat-forward vols for every day from the first to the last pillar.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyVolatilityGrid {
    rows: Vec<DailyRow>,
}

/// Everything the daily grid reads from the market.
pub(crate) struct GridMarket<'a> {
    pub curve_date: Date,
    pub day_count: DayCountConvention,
    pub forward_curve: &'a ForwardCurve,
    pub foreign: &'a dyn ZeroCurve,
    pub domestic: &'a dyn ZeroCurve,
    pub flat_extrapolation: bool,
}

impl DailyVolatilityGrid {
    /// Interpolates `table` onto every calendar day it spans.
    ///
    /// Every row is tagged [`DeltaConvention::RegularForward`] whatever the
    /// pillar conventions are.
    pub(crate) fn build(table: &PillarTable, market: &GridMarket<'_>) -> SurfaceResult<Self> {
        let pillars = table.pillars();
        let dates: Vec<Date> = table.first_date().days_through(table.last_date()).collect();

        let rates_foreign = market.foreign.zero_rates(&dates)?;
        let rates_domestic = market.domestic.zero_rates(&dates)?;
        let forwards = market
            .forward_curve
            .interpolate(&dates, market.flat_extrapolation)?;

        let mut rows = Vec::with_capacity(dates.len());
        for (i, &date) in dates.iter().enumerate() {
            let after = pillars.partition_point(|p| p.date <= date);
            let back = &pillars[after - 1];
            let tau = market.day_count.year_fraction(market.curve_date, date);

            let vols = if back.date == date {
                back.vols.clone()
            } else {
                let next = &pillars[after];
                back.vols
                    .iter()
                    .map(|(&bucket, &sigma1)| -> SurfaceResult<(DeltaBucket, f64)> {
                        let sigma2 = next.vols[&bucket];
                        let vol = flat_forward_interp(back.tau, sigma1, next.tau, sigma2, tau)?;
                        Ok((bucket, vol))
                    })
                    .collect::<SurfaceResult<BTreeMap<_, _>>>()?
            };

            rows.push(DailyRow {
                date,
                tau,
                vols,
                rate_foreign: rates_foreign[i],
                rate_domestic: rates_domestic[i],
                forward: forwards[i],
                convention: DeltaConvention::RegularForward,
            });
        }

        debug!(
            rows = rows.len(),
            first = %table.first_date(),
            last = %table.last_date(),
            "daily volatility grid built"
        );
        Ok(Self { rows })
    }

    /// All rows, one per day.
    pub fn rows(&self) -> &[DailyRow] {
        &self.rows
    }

    /// First date.
    pub fn first_date(&self) -> Date {
        self.rows[0].date
    }

    /// Last date.
    pub fn last_date(&self) -> Date {
        self.rows[self.rows.len() - 1].date
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always false for a built grid.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row for `date`, if inside the grid.
    pub fn row(&self, date: Date) -> Option<&DailyRow> {
        let offset = usize::try_from(date - self.first_date()).ok()?;
        self.rows.get(offset)
    }

    /// Like [`row`](Self::row) but failing with `OutOfRangeQuery`.
    pub fn try_row(&self, date: Date) -> SurfaceResult<&DailyRow> {
        self.row(date).ok_or_else(|| SurfaceError::OutOfRangeQuery {
            date,
            first: self.first_date(),
            last: self.last_date(),
        })
    }

    /// Vol of `bucket` on `date`.
    pub fn vol(&self, date: Date, bucket: DeltaBucket) -> Option<f64> {
        self.row(date).and_then(|r| r.vols.get(&bucket).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    // ==========================================================
    // Flat-forward formulas
    // ==========================================================

    #[test]
    fn test_equal_vols_give_flat_forward() {
        assert_relative_eq!(forward_volatility(0.25, 0.1, 1.0, 0.1).unwrap(), 0.1, epsilon = 1e-15);
        assert_relative_eq!(
            flat_forward_interp(0.25, 0.1, 1.0, 0.1, 0.6).unwrap(),
            0.1,
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_flat_forward_endpoints() {
        assert_relative_eq!(
            flat_forward_interp(0.25, 0.09, 1.0, 0.11, 0.25).unwrap(),
            0.09,
            epsilon = 1e-15
        );
        assert_relative_eq!(
            flat_forward_interp(0.25, 0.09, 1.0, 0.11, 1.0).unwrap(),
            0.11,
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_negative_forward_variance() {
        // σ1²t1 = 0.04·0.5 = 0.02 > σ2²t2 = 0.01·1.0
        assert!(matches!(
            forward_volatility(0.5, 0.2, 1.0, 0.1),
            Err(SurfaceError::NegativeVariance { .. })
        ));
        assert!(matches!(
            flat_forward_interp(0.5, 0.2, 1.0, 0.1, 0.75),
            Err(SurfaceError::NegativeVariance { .. })
        ));
    }

    #[test]
    fn test_reversed_interval_rejected() {
        assert!(matches!(
            forward_volatility(1.0, 0.1, 0.5, 0.1),
            Err(SurfaceError::InvalidPillarInput(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_total_variance_is_linear(
            t1 in 0.01f64..2.0,
            gap in 0.01f64..3.0,
            s1 in 0.02f64..0.5,
            bump in 0.0f64..0.3,
            w in 0.0f64..1.0,
        ) {
            let t2 = t1 + gap;
            let s2 = (s1 * s1 * t1 / t2 + bump * bump).sqrt();
            let t = t1 + w * gap;
            let sigma = flat_forward_interp(t1, s1, t2, s2, t).unwrap();
            let expected = s1 * s1 * t1 + w * (s2 * s2 * t2 - s1 * s1 * t1);
            prop_assert!((sigma * sigma * t - expected).abs() < 1e-12);
        }

        #[test]
        fn prop_forward_vol_round_trip(
            t1 in 0.01f64..2.0,
            gap in 0.01f64..3.0,
            s1 in 0.02f64..0.5,
            fwd in 0.02f64..0.5,
        ) {
            let t2 = t1 + gap;
            let s2 = ((s1 * s1 * t1 + fwd * fwd * gap) / t2).sqrt();
            let solved = forward_volatility(t1, s1, t2, s2).unwrap();
            prop_assert!((solved - fwd).abs() < 1e-9);
        }
    }
}
