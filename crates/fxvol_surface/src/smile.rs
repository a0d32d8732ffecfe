//! Per-date smile fits and their cache.
//!
//! A smile turns the delta-bucket vols of one daily row into a function of
//! strike. Spline methods solve the bucket strikes and interpolate vol
//! across them. Heston methods calibrate the model to the bucket quotes and
//! read vols back by pricing and inverting Garman-Kohlhagen.
//!
//! Fits are expensive and a date is fitted at most once per surface.
//! [`SmileCache`] keeps one slot per date: a `OnceLock` for the fit and a
//! `parking_lot::Mutex` held only while that date is being fitted. Two
//! threads asking for the same new date observe the same `Arc<SmileFit>`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use fxvol_core::math::interpolators::{
    CubicSplineInterpolator, Interpolator, MonotonicInterpolator,
};
use fxvol_core::types::{Date, InterpolationError};
use fxvol_models::analytical::{solve_implied_vol, FxMarket, OptionType};
use fxvol_models::heston::{
    calibrate_heston_smile, HestonEngine, HestonPricer, HestonPricingConfig, HestonSmileFit,
};
use parking_lot::Mutex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, instrument};

use crate::error::{SurfaceError, SurfaceResult};
use crate::grid::DailyRow;
use crate::pillar::bucket_strikes;

/// How a smile is interpolated across strike.
///
/// Labels match the market-data configuration strings, e.g.
/// `"cubic_spline"` or `"heston_carr_madan_fft_w_simpsons"`.
///
/// # Examples
///
/// ```
/// use fxvol_surface::SmileMethod;
///
/// let m: SmileMethod = "heston_analytical_1993".parse().unwrap();
/// assert!(m.is_heston());
/// assert_eq!(SmileMethod::default(), SmileMethod::CubicSpline);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SmileMethod {
    /// Monotone (Fritsch-Carlson) cubic through the bucket strikes.
    UnivariateSpline,
    /// Natural cubic spline through the bucket strikes.
    #[default]
    CubicSpline,
    /// Heston calibrated and priced with the 1993 closed form.
    HestonAnalytical1993,
    /// Heston priced by Carr-Madan with adaptive quadrature.
    HestonCarrMadanQuadrature,
    /// Heston priced by Carr-Madan FFT with Simpson weights.
    HestonCarrMadanFft,
    /// Recognised; not implemented.
    VannaVolga,
    /// Recognised; not implemented.
    Sabr,
    /// Recognised; not implemented.
    SviSabr,
}

impl SmileMethod {
    /// Canonical label.
    pub fn name(&self) -> &'static str {
        match self {
            SmileMethod::UnivariateSpline => "univariate_spline",
            SmileMethod::CubicSpline => "cubic_spline",
            SmileMethod::HestonAnalytical1993 => "heston_analytical_1993",
            SmileMethod::HestonCarrMadanQuadrature => "heston_carr_madan_gauss_kronrod_quadrature",
            SmileMethod::HestonCarrMadanFft => "heston_carr_madan_fft_w_simpsons",
            SmileMethod::VannaVolga => "vanna_volga",
            SmileMethod::Sabr => "sabr",
            SmileMethod::SviSabr => "svi_sabr",
        }
    }

    /// The Heston pricer behind this method, if any.
    pub fn heston_pricer(&self) -> Option<HestonPricer> {
        match self {
            SmileMethod::HestonAnalytical1993 => Some(HestonPricer::Heston1993),
            SmileMethod::HestonCarrMadanQuadrature => Some(HestonPricer::CarrMadanQuadrature),
            SmileMethod::HestonCarrMadanFft => Some(HestonPricer::CarrMadanFft),
            _ => None,
        }
    }

    /// True for the three Heston methods.
    pub fn is_heston(&self) -> bool {
        self.heston_pricer().is_some()
    }

    /// True for methods that can actually fit a smile.
    pub fn is_supported(&self) -> bool {
        !matches!(
            self,
            SmileMethod::VannaVolga | SmileMethod::Sabr | SmileMethod::SviSabr
        )
    }
}

impl FromStr for SmileMethod {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_lowercase().replace(['-', ' '], "_");
        match norm.as_str() {
            "univariate_spline" | "monotonic" => Ok(SmileMethod::UnivariateSpline),
            "cubic_spline" | "cubic" => Ok(SmileMethod::CubicSpline),
            "heston_analytical_1993" | "heston" => Ok(SmileMethod::HestonAnalytical1993),
            "heston_carr_madan_gauss_kronrod_quadrature" | "heston_quadrature" => {
                Ok(SmileMethod::HestonCarrMadanQuadrature)
            }
            "heston_carr_madan_fft_w_simpsons" | "heston_fft" => Ok(SmileMethod::HestonCarrMadanFft),
            "vanna_volga" => Ok(SmileMethod::VannaVolga),
            "sabr" => Ok(SmileMethod::Sabr),
            "svi_sabr" => Ok(SmileMethod::SviSabr),
            _ => Err(SurfaceError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl fmt::Display for SmileMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for SmileMethod {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for SmileMethod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone)]
enum SmileSpline {
    Monotonic(MonotonicInterpolator<f64>),
    Cubic(CubicSplineInterpolator<f64>),
}

impl SmileSpline {
    fn vol_at(&self, strike: f64) -> Result<f64, InterpolationError> {
        match self {
            SmileSpline::Monotonic(s) => s.interpolate_flat(strike),
            SmileSpline::Cubic(s) => s.interpolate_flat(strike),
        }
    }
}

/// A fitted smile for one date.
#[derive(Debug, Clone)]
pub enum SmileFit {
    /// Strike-to-vol spline, flat beyond the outer strikes.
    Spline {
        /// Date of the smile
        date: Date,
        /// Bucket strikes, ascending
        strikes: Vec<f64>,
        /// Bucket vols, aligned with `strikes`
        vols: Vec<f64>,
        /// Interpolant
        spline: SplineHandle,
    },
    /// Calibrated Heston parameters.
    Heston {
        /// Date of the smile
        date: Date,
        /// Market inputs at the date
        market: FxMarket,
        /// Calibration result
        fit: HestonSmileFit,
        /// Engine used for both calibration and queries
        engine: HestonEngine,
    },
}

/// Opaque spline interpolant inside [`SmileFit::Spline`].
#[derive(Debug, Clone)]
pub struct SplineHandle(SmileSpline);

impl SmileFit {
    /// Date the smile belongs to.
    pub fn date(&self) -> Date {
        match self {
            SmileFit::Spline { date, .. } | SmileFit::Heston { date, .. } => *date,
        }
    }

    /// Implied vol at `strike`.
    ///
    /// Spline fits ignore `option_type`. Heston fits price that option and
    /// invert Garman-Kohlhagen starting from `√v0`.
    ///
    /// # Errors
    ///
    /// * `SurfaceError::InvalidSmileQuery` - a spline value that is not positive
    /// * `SurfaceError::Model` - Heston pricing or the inversion failed
    pub fn implied_vol(&self, strike: f64, option_type: OptionType) -> SurfaceResult<f64> {
        match self {
            SmileFit::Spline {
                date,
                spline: SplineHandle(spline),
                ..
            } => {
                let invalid = |reason: String| SurfaceError::InvalidSmileQuery {
                    date: *date,
                    strike,
                    reason,
                };
                let vol = spline.vol_at(strike).map_err(|e| invalid(e.to_string()))?;
                if !(vol > 0.0) {
                    return Err(invalid(format!("non-positive vol {}", vol)));
                }
                Ok(vol)
            }
            SmileFit::Heston {
                market,
                fit,
                engine,
                ..
            } => {
                let price = engine.price(&fit.params, market, option_type, strike)?;
                let guess = fit.params.v0.sqrt();
                Ok(solve_implied_vol(market, option_type, strike, price, guess)?)
            }
        }
    }

    /// Heston calibration, if this is a Heston fit.
    pub fn heston(&self) -> Option<&HestonSmileFit> {
        match self {
            SmileFit::Heston { fit, .. } => Some(fit),
            SmileFit::Spline { .. } => None,
        }
    }
}

/// Inputs shared by every smile fit on one surface.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SmileContext {
    pub spot: f64,
    pub method: SmileMethod,
    pub heston: HestonPricingConfig,
    pub sse_threshold: f64,
    /// ATM strike is the forward rather than the delta-neutral strike.
    pub atm_forward: bool,
}

/// Fits the smile of one daily row.
#[instrument(skip_all, fields(date = %row.date, method = %ctx.method))]
pub(crate) fn fit_smile(row: &DailyRow, ctx: &SmileContext) -> SurfaceResult<SmileFit> {
    if !ctx.method.is_supported() {
        return Err(SurfaceError::UnsupportedMethod(ctx.method.name().to_string()));
    }

    let market = FxMarket::new(ctx.spot, row.tau, row.rate_foreign, row.rate_domestic)?
        .with_forward(row.forward)?;
    let bucket_strikes = bucket_strikes(&market, &row.vols, row.convention, ctx.atm_forward)?;

    if let Some(pricer) = ctx.method.heston_pricer() {
        let strikes: Vec<f64> = bucket_strikes.values().copied().collect();
        let vols: Vec<f64> = row.vols.values().copied().collect();
        let option_types: Vec<OptionType> = row.vols.keys().map(|b| b.option_type()).collect();
        let engine = HestonEngine::new(pricer, ctx.heston)?;
        let fit = calibrate_heston_smile(&market, &strikes, &vols, &option_types, &engine, None)?;
        debug!(sse = fit.sse, iterations = fit.iterations, "heston smile fitted");
        if fit.sse >= ctx.sse_threshold {
            return Err(SurfaceError::PoorCalibrationFit {
                date: row.date,
                sse: fit.sse,
            });
        }
        return Ok(SmileFit::Heston {
            date: row.date,
            market,
            fit,
            engine,
        });
    }

    let mut knots: Vec<(f64, f64)> = bucket_strikes
        .values()
        .copied()
        .zip(row.vols.values().copied())
        .collect();
    knots.sort_by(|a, b| a.0.total_cmp(&b.0));
    let (strikes, vols): (Vec<f64>, Vec<f64>) = knots.into_iter().unzip();

    let to_pillar_error = |e: InterpolationError| {
        SurfaceError::InvalidPillarInput(format!("smile on {}: {}", row.date, e))
    };
    let spline = match ctx.method {
        SmileMethod::UnivariateSpline => SmileSpline::Monotonic(
            MonotonicInterpolator::new(&strikes, &vols).map_err(to_pillar_error)?,
        ),
        _ => SmileSpline::Cubic(
            CubicSplineInterpolator::new(&strikes, &vols).map_err(to_pillar_error)?,
        ),
    };
    debug!(strikes = ?strikes, "spline smile fitted");

    Ok(SmileFit::Spline {
        date: row.date,
        strikes,
        vols,
        spline: SplineHandle(spline),
    })
}

/// One date's fit. `guard` serialises fitting for that date only.
#[derive(Debug, Default)]
struct FitSlot {
    fit: OnceLock<Arc<SmileFit>>,
    guard: Mutex<()>,
}

/// Get-or-compute store of smile fits keyed by date.
///
/// Each date is fitted at most once. Fits for different dates run in
/// parallel and never block reads of dates already fitted.
///
/// # Examples
///
/// ```
/// use fxvol_core::types::Date;
/// use fxvol_surface::SmileCache;
///
/// let cache = SmileCache::new();
/// assert_eq!(cache.fit_count(), 0);
/// assert!(cache.get(Date::from_ymd(2024, 1, 2).unwrap()).is_none());
/// ```
#[derive(Debug, Default)]
pub struct SmileCache {
    slots: Mutex<HashMap<Date, Arc<FitSlot>>>,
    computed: AtomicUsize,
}

impl SmileCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, date: Date) -> Arc<FitSlot> {
        Arc::clone(self.slots.lock().entry(date).or_default())
    }

    /// The cached fit for `date`, if any.
    pub fn get(&self, date: Date) -> Option<Arc<SmileFit>> {
        self.slots.lock().get(&date).and_then(|slot| slot.fit.get().cloned())
    }

    /// Returns the fit for `date`, running `fit` on a miss.
    ///
    /// Concurrent misses on one date wait for a single fit. A failed fit
    /// is not cached; the next request retries.
    pub fn get_or_fit<F>(&self, date: Date, fit: F) -> SurfaceResult<Arc<SmileFit>>
    where
        F: FnOnce() -> SurfaceResult<SmileFit>,
    {
        let slot = self.slot(date);
        if let Some(existing) = slot.fit.get() {
            return Ok(Arc::clone(existing));
        }
        let _fitting = slot.guard.lock();
        if let Some(existing) = slot.fit.get() {
            return Ok(Arc::clone(existing));
        }
        let fitted = Arc::new(fit()?);
        self.computed.fetch_add(1, Ordering::Relaxed);
        Ok(Arc::clone(slot.fit.get_or_init(|| fitted)))
    }

    /// Number of fits computed so far.
    pub fn fit_count(&self) -> usize {
        self.computed.load(Ordering::Relaxed)
    }

    /// Dates with a cached fit, ascending.
    pub fn cached_dates(&self) -> Vec<Date> {
        let mut dates: Vec<Date> = self
            .slots
            .lock()
            .iter()
            .filter(|(_, slot)| slot.fit.get().is_some())
            .map(|(date, _)| *date)
            .collect();
        dates.sort();
        dates
    }
}
