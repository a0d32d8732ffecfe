//! The volatility surface and its builder.

use std::sync::Arc;

use fxvol_core::market_data::{ForwardCurve, MarketDataError, ZeroCurve};
use fxvol_core::types::{Currency, CurrencyError, CurrencyPair, Date, DayCountConvention, Tenor};
use fxvol_models::analytical::{
    FxMarket, GarmanKohlhagen, GarmanKohlhagenParams, Greeks, IntrinsicSplit, OptionType,
};
use fxvol_models::heston::{
    calibrate_heston_smile, HestonEngine, HestonParams, HestonPricer,
};
use fxvol_models::simulation::{simulate_gbm_paths, GbmStep, PathMatrix, SimulationRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::bucket::DeltaBucket;
use crate::config::SurfaceConfig;
use crate::error::{SurfaceError, SurfaceResult};
use crate::grid::{forward_volatility, DailyVolatilityGrid, GridMarket};
use crate::pillar::{Expiry, PillarMarket, PillarQuote, PillarTable};
use crate::smile::{fit_smile, SmileCache, SmileContext, SmileFit, SmileMethod};

/// One outright forward quote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardPoint {
    /// Delivery date or tenor. `SP` is the curve-date spot quote.
    pub expiry: Expiry,
    /// Outright forward rate.
    pub rate: f64,
}

impl ForwardPoint {
    /// Quote keyed by date.
    pub fn on(date: Date, rate: f64) -> Self {
        Self {
            expiry: Expiry::Date(date),
            rate,
        }
    }
}

/// Builder for [`VolatilitySurface`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use fxvol_core::market_data::FlatZeroCurve;
/// use fxvol_core::types::{Date, DayCountConvention};
/// use fxvol_models::analytical::DeltaConvention;
/// use fxvol_surface::{DeltaBucket, ForwardPoint, PillarQuote, VolatilitySurfaceBuilder};
///
/// let today = Date::from_ymd(2023, 6, 30).unwrap();
/// let dc = DayCountConvention::ActualActual;
/// let surface = VolatilitySurfaceBuilder::new(
///     today,
///     "AUDUSD",
///     Arc::new(FlatZeroCurve::new(today, dc, 0.03)),
///     Arc::new(FlatZeroCurve::new(today, dc, 0.05)),
/// )
/// .forward_points(vec![
///     ForwardPoint::on(today, 0.66),
///     ForwardPoint::on(Date::from_ymd(2024, 7, 5).unwrap(), 0.673),
/// ])
/// .pillars(vec![PillarQuote::new(
///     "1Y".parse().unwrap(),
///     DeltaConvention::RegularSpot,
///     [
///         (DeltaBucket::Put25, 0.11),
///         (DeltaBucket::AtmDeltaNeutral, 0.10),
///         (DeltaBucket::Call25, 0.105),
///     ],
/// )])
/// .build()
/// .unwrap();
///
/// assert_eq!(surface.spot(), 0.66);
/// assert_eq!(surface.spot_date(), Date::from_ymd(2023, 7, 4).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct VolatilitySurfaceBuilder {
    curve_date: Date,
    pair: String,
    foreign_curve: Arc<dyn ZeroCurve>,
    domestic_curve: Arc<dyn ZeroCurve>,
    forward_points: Vec<ForwardPoint>,
    spot_date: Option<Date>,
    pillars: Option<Vec<PillarQuote>>,
    config: SurfaceConfig,
}

impl VolatilitySurfaceBuilder {
    /// Starts a surface for `pair` (e.g. `"EURUSD"`) on `curve_date`.
    pub fn new(
        curve_date: Date,
        pair: impl Into<String>,
        foreign_curve: Arc<dyn ZeroCurve>,
        domestic_curve: Arc<dyn ZeroCurve>,
    ) -> Self {
        Self {
            curve_date,
            pair: pair.into(),
            foreign_curve,
            domestic_curve,
            forward_points: Vec::new(),
            spot_date: None,
            pillars: None,
            config: SurfaceConfig::default(),
        }
    }

    /// Adds one forward quote.
    pub fn forward_point(mut self, point: ForwardPoint) -> Self {
        self.forward_points.push(point);
        self
    }

    /// Adds forward quotes.
    pub fn forward_points(mut self, points: impl IntoIterator<Item = ForwardPoint>) -> Self {
        self.forward_points.extend(points);
        self
    }

    /// Overrides the conventional spot date.
    pub fn spot_date(mut self, spot_date: Date) -> Self {
        self.spot_date = Some(spot_date);
        self
    }

    /// Sets the volatility pillars.
    pub fn pillars(mut self, pillars: Vec<PillarQuote>) -> Self {
        self.pillars = Some(pillars);
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: SurfaceConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the day count.
    pub fn day_count(mut self, day_count: DayCountConvention) -> Self {
        self.config.day_count = day_count;
        self
    }

    /// Sets the smile method.
    pub fn smile_method(mut self, method: SmileMethod) -> Self {
        self.config.smile_method = method;
        self
    }

    /// Builds the surface.
    ///
    /// # Errors
    ///
    /// * `SurfaceError::InvalidCurrencyPair` - unparseable pair code
    /// * `SurfaceError::MissingSpotQuote` - no forward quote on the curve date
    /// * `SurfaceError::InvalidPillarInput` - empty, inconsistent or expired pillars
    /// * `SurfaceError::NegativeVariance` - pillars with decreasing total variance
    /// * `SurfaceError::Model` - a bucket strike could not be solved
    #[instrument(skip_all, fields(pair = %self.pair, curve_date = %self.curve_date))]
    pub fn build(self) -> SurfaceResult<VolatilitySurface> {
        self.config.validate()?;

        let pair: CurrencyPair = self
            .pair
            .parse()
            .map_err(|e: CurrencyError| {
                SurfaceError::InvalidCurrencyPair(e.to_string())
            })?;
        if let Some(message) = pair.convention_warning() {
            warn!("{}", message);
        }

        let curve_date = self.curve_date;
        let spot_date = match self.spot_date {
            Some(d) => d,
            None => pair.spot_date(curve_date)?,
        };
        for curve in [&self.foreign_curve, &self.domestic_curve] {
            if curve.curve_date() != curve_date {
                warn!(
                    zero_curve_date = %curve.curve_date(),
                    "zero curve date differs from the surface curve date"
                );
            }
        }

        let day_count = self.config.day_count;
        // Tenor forwards are keyed by expiry: delivery less the spot lag.
        let spot_lag = pair.spot_offset_days();
        let quotes = self
            .forward_points
            .iter()
            .map(|p| -> SurfaceResult<(Date, f64)> {
                let date = match p.expiry {
                    Expiry::Date(d) => d,
                    Expiry::Tenor(Tenor::Spot) => curve_date,
                    tenor => tenor.resolve(curve_date, spot_date)?.sub_weekdays(spot_lag)?,
                };
                Ok((date, p.rate))
            })
            .collect::<SurfaceResult<Vec<(Date, f64)>>>()?;
        let forward_curve = ForwardCurve::new(curve_date, day_count, &quotes).map_err(|e| match e {
            MarketDataError::MissingSpotQuote { curve_date } => {
                SurfaceError::MissingSpotQuote { curve_date }
            }
            other => SurfaceError::InvalidPillarInput(format!("forward curve: {}", other)),
        })?;

        let (pillars, grid) = match &self.pillars {
            None => (None, None),
            Some(quotes) => {
                let table = PillarTable::build(
                    quotes,
                    &PillarMarket {
                        curve_date,
                        spot_date,
                        day_count,
                        forward_curve: &forward_curve,
                        foreign: self.foreign_curve.as_ref(),
                        domestic: self.domestic_curve.as_ref(),
                        flat_extrapolation: self.config.flat_extrapolation,
                    },
                )?;
                let grid = DailyVolatilityGrid::build(
                    &table,
                    &GridMarket {
                        curve_date,
                        day_count,
                        forward_curve: &forward_curve,
                        foreign: self.foreign_curve.as_ref(),
                        domestic: self.domestic_curve.as_ref(),
                        flat_extrapolation: self.config.flat_extrapolation,
                    },
                )?;
                (Some(table), Some(grid))
            }
        };

        info!(
            spot = forward_curve.spot(),
            %spot_date,
            forwards = forward_curve.dates().len(),
            pillars = pillars.as_ref().map_or(0, |p| p.len()),
            smile_method = %self.config.smile_method,
            "volatility surface built"
        );

        Ok(VolatilitySurface {
            curve_date,
            pair,
            spot_date,
            forward_curve,
            foreign_curve: self.foreign_curve,
            domestic_curve: self.domestic_curve,
            pillars,
            grid,
            smiles: SmileCache::new(),
            config: self.config,
        })
    }
}

/// Market inputs behind one price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Implied vol, NaN outside the pillar range.
    pub volatility: f64,
    /// Foreign zero rate.
    pub rate_foreign: f64,
    /// Domestic zero rate.
    pub rate_domestic: f64,
    /// Outright forward, flat beyond the quoted curve.
    pub forward: f64,
    /// Year fraction to expiry.
    pub tau: f64,
}

/// Price of one vanilla option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VanillaPrice {
    /// Expiry date.
    pub expiry: Date,
    /// Strike.
    pub strike: f64,
    /// Call or put.
    pub option_type: OptionType,
    /// Premium in domestic currency per unit of foreign notional.
    pub price: f64,
    /// Analytical Greeks, when requested.
    pub greeks: Option<Greeks>,
    /// Intrinsic and time value, when requested.
    pub split: Option<IntrinsicSplit>,
    /// Inputs used.
    pub market: MarketSnapshot,
}

/// Path simulation methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMethod {
    /// Lognormal spot with forward drift and forward ATM vol per step.
    #[default]
    GeometricBrownianMotion,
}

impl std::str::FromStr for SimulationMethod {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "geometric_brownian_motion" | "gbm" => Ok(SimulationMethod::GeometricBrownianMotion),
            _ => Err(SurfaceError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// Market data behind one simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathDiagnostics {
    /// Grid date; the first row is the curve date.
    pub date: Date,
    /// Year fraction from the curve date.
    pub tau: f64,
    /// Step length; zero on the first row.
    pub dt: f64,
    /// Forward at the date; spot on the first row.
    pub fx_forward_rate: f64,
    /// `ln(F2/F1)/dt`; NaN on the first row.
    pub drift: f64,
    /// ATM vol at the date.
    pub atm_volatility: f64,
    /// Forward ATM vol over the step ending at the date; NaN on the first row.
    pub forward_atm_volatility: f64,
}

/// Simulated spot paths with per-step diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedPaths {
    /// Rows are grid points including the curve date, columns are simulations.
    pub paths: PathMatrix,
    /// One row per path row.
    pub diagnostics: Vec<PathDiagnostics>,
}

/// Heston calibration of one pillar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarSmileReport {
    /// Tenor label.
    pub tenor_name: String,
    /// Expiry date.
    pub date: Date,
    /// Fitted parameters.
    pub params: HestonParams,
    /// Bucket strikes.
    pub strikes: Vec<f64>,
    /// Quoted vols.
    pub market_vols: Vec<f64>,
    /// Model vols at the same strikes.
    pub model_vols: Vec<f64>,
    /// Sum of squared vol errors.
    pub sse: f64,
    /// Whether the least-squares solver converged.
    pub converged: bool,
}

/// Implied volatility surface of one currency pair.
///
/// Immutable after construction apart from the smile cache, which fills
/// as dates are queried.
#[derive(Debug)]
pub struct VolatilitySurface {
    curve_date: Date,
    pair: CurrencyPair,
    spot_date: Date,
    forward_curve: ForwardCurve,
    foreign_curve: Arc<dyn ZeroCurve>,
    domestic_curve: Arc<dyn ZeroCurve>,
    pillars: Option<PillarTable>,
    grid: Option<DailyVolatilityGrid>,
    smiles: SmileCache,
    config: SurfaceConfig,
}

impl VolatilitySurface {
    /// Valuation date.
    pub fn curve_date(&self) -> Date {
        self.curve_date
    }

    /// Currency pair.
    pub fn pair(&self) -> CurrencyPair {
        self.pair
    }

    /// Foreign (base) currency.
    pub fn foreign_currency(&self) -> Currency {
        self.pair.foreign()
    }

    /// Domestic (quote) currency.
    pub fn domestic_currency(&self) -> Currency {
        self.pair.domestic()
    }

    /// Spot date.
    pub fn spot_date(&self) -> Date {
        self.spot_date
    }

    /// Spot rate: the forward quote on the curve date.
    pub fn spot(&self) -> f64 {
        self.forward_curve.spot()
    }

    /// Day count of the volatility axis.
    pub fn day_count(&self) -> DayCountConvention {
        self.config.day_count
    }

    /// Smile interpolation method.
    pub fn smile_method(&self) -> SmileMethod {
        self.config.smile_method
    }

    /// Configuration the surface was built with.
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Forward curve.
    pub fn forward_curve(&self) -> &ForwardCurve {
        &self.forward_curve
    }

    /// Foreign zero curve.
    pub fn foreign_curve(&self) -> &Arc<dyn ZeroCurve> {
        &self.foreign_curve
    }

    /// Domestic zero curve.
    pub fn domestic_curve(&self) -> &Arc<dyn ZeroCurve> {
        &self.domestic_curve
    }

    /// Resolved pillars, if the surface has any.
    pub fn pillars(&self) -> Option<&PillarTable> {
        self.pillars.as_ref()
    }

    /// Daily term structure, if the surface has pillars.
    pub fn daily_grid(&self) -> Option<&DailyVolatilityGrid> {
        self.grid.as_ref()
    }

    /// Smile cache.
    pub fn smile_cache(&self) -> &SmileCache {
        &self.smiles
    }

    /// Forward rates at `dates`; see [`ForwardCurve::interpolate`].
    pub fn interpolate_forwards(
        &self,
        dates: &[Date],
        flat_extrapolate: bool,
    ) -> SurfaceResult<Vec<f64>> {
        Ok(self.forward_curve.interpolate(dates, flat_extrapolate)?)
    }

    fn require_grid(&self) -> SurfaceResult<&DailyVolatilityGrid> {
        self.grid
            .as_ref()
            .ok_or_else(|| SurfaceError::InvalidPillarInput("surface has no volatility pillars".to_string()))
    }

    /// Whether `date` lies within the pillar range.
    pub fn in_range(&self, date: Date) -> bool {
        self.pillars.as_ref().is_some_and(|p| p.contains(date))
    }

    /// The smile on `date`, fitted on first use.
    ///
    /// # Errors
    ///
    /// * `SurfaceError::OutOfRangeQuery` - `date` outside the pillar range
    /// * `SurfaceError::PoorCalibrationFit` - a Heston fit above the SSE threshold
    /// * `SurfaceError::UnsupportedMethod` - a recognised but unimplemented method
    pub fn smile(&self, date: Date) -> SurfaceResult<Arc<SmileFit>> {
        let row = self.require_grid()?.try_row(date)?;
        let ctx = SmileContext {
            spot: self.spot(),
            method: self.config.smile_method,
            heston: self.config.heston,
            sse_threshold: self.config.sse_threshold,
            atm_forward: self.pillars.as_ref().is_some_and(|p| p.atm_forward()),
        };
        self.smiles.get_or_fit(date, || fit_smile(row, &ctx))
    }

    /// Implied vols for `(date, strike, option type)` triples.
    ///
    /// Dates outside the pillar range give NaN for that entry.
    ///
    /// # Errors
    ///
    /// * `SurfaceError::InvalidPillarInput` - the surface has no pillars
    /// * `SurfaceError::ShapeMismatch` - inputs of different lengths
    /// * `SurfaceError::PoorCalibrationFit` - a Heston fit above the SSE threshold
    pub fn implied_vol(
        &self,
        dates: &[Date],
        strikes: &[f64],
        option_types: &[OptionType],
    ) -> SurfaceResult<Vec<f64>> {
        self.require_grid()?;
        check_shape(dates, strikes, option_types)?;
        self.masked_vols(dates, strikes, option_types)
    }

    fn masked_vols(
        &self,
        dates: &[Date],
        strikes: &[f64],
        option_types: &[OptionType],
    ) -> SurfaceResult<Vec<f64>> {
        let vols = dates
            .par_iter()
            .zip(strikes.par_iter())
            .zip(option_types.par_iter())
            .map(|((&date, &strike), &cp)| {
                if self.in_range(date) {
                    self.smile(date)?.implied_vol(strike, cp)
                } else {
                    Ok(f64::NAN)
                }
            })
            .collect::<SurfaceResult<Vec<f64>>>()?;

        let skipped = vols.iter().filter(|v| v.is_nan()).count();
        if skipped > 0 {
            debug!(skipped, "dates outside the pillar range give NaN");
        }
        Ok(vols)
    }

    /// Prices European vanillas off the surface.
    ///
    /// Entries with an expiry outside the pillar range get a NaN vol, price
    /// and Greeks; the rest of the batch is priced normally.
    ///
    /// # Errors
    ///
    /// * `SurfaceError::ShapeMismatch` - inputs of different lengths
    /// * any smile or pricing error for an in-range entry
    #[instrument(skip_all, fields(n = expiries.len()))]
    pub fn price_vanilla(
        &self,
        expiries: &[Date],
        strikes: &[f64],
        option_types: &[OptionType],
        analytical_greeks: bool,
        intrinsic_time_split: bool,
    ) -> SurfaceResult<Vec<VanillaPrice>> {
        check_shape(expiries, strikes, option_types)?;

        let vols = self.masked_vols(expiries, strikes, option_types)?;
        let rates_foreign = self.foreign_curve.zero_rates(expiries)?;
        let rates_domestic = self.domestic_curve.zero_rates(expiries)?;
        let forwards = self.forward_curve.interpolate(expiries, true)?;

        (0..expiries.len())
            .map(|i| {
                let market = MarketSnapshot {
                    volatility: vols[i],
                    rate_foreign: rates_foreign[i],
                    rate_domestic: rates_domestic[i],
                    forward: forwards[i],
                    tau: self.config.day_count.year_fraction(self.curve_date, expiries[i]),
                };
                self.price_one(expiries[i], strikes[i], option_types[i], market, analytical_greeks, intrinsic_time_split)
            })
            .collect()
    }

    fn price_one(
        &self,
        expiry: Date,
        strike: f64,
        option_type: OptionType,
        market: MarketSnapshot,
        analytical_greeks: bool,
        intrinsic_time_split: bool,
    ) -> SurfaceResult<VanillaPrice> {
        let mut result = VanillaPrice {
            expiry,
            strike,
            option_type,
            price: f64::NAN,
            greeks: analytical_greeks.then_some(Greeks {
                delta: f64::NAN,
                gamma: f64::NAN,
                vega: f64::NAN,
                theta: f64::NAN,
                rho_domestic: f64::NAN,
                rho_foreign: f64::NAN,
            }),
            split: intrinsic_time_split.then_some(IntrinsicSplit {
                intrinsic: f64::NAN,
                time_value: f64::NAN,
            }),
            market,
        };
        if market.volatility.is_nan() {
            return Ok(result);
        }

        let fx = FxMarket::new(self.spot(), market.tau, market.rate_foreign, market.rate_domestic)?
            .with_forward(market.forward)?;
        let model = GarmanKohlhagen::new(GarmanKohlhagenParams::new(fx, strike, market.volatility)?);
        result.price = model.price(option_type);
        if analytical_greeks {
            result.greeks = Some(model.greeks(option_type));
        }
        if intrinsic_time_split {
            result.split = Some(model.intrinsic_split(option_type));
        }
        Ok(result)
    }

    /// Simulates spot paths over `date_grid`, or over the pillar dates.
    ///
    /// Each step drifts at the forward-implied rate and diffuses at the
    /// forward ATM vol between its end points.
    ///
    /// # Errors
    ///
    /// * `SurfaceError::OutOfRangeQuery` - a grid date outside the pillar range
    /// * `SurfaceError::InvalidPillarInput` - a grid that is empty or not increasing
    /// * `SurfaceError::Model` - invalid path or step counts
    #[instrument(skip(self, date_grid), fields(points = date_grid.map_or(0, |g| g.len())))]
    pub fn simulate_path(
        &self,
        date_grid: Option<&[Date]>,
        n_sims: usize,
        antithetic: bool,
        method: SimulationMethod,
        seed: u64,
    ) -> SurfaceResult<SimulatedPaths> {
        match method {
            SimulationMethod::GeometricBrownianMotion => {}
        }
        let grid = self.require_grid()?;
        let pillar_dates: Vec<Date>;
        let dates = match date_grid {
            Some(d) => d,
            None => {
                pillar_dates = self
                    .pillars
                    .as_ref()
                    .map(|t| t.pillars().iter().map(|p| p.date).collect())
                    .unwrap_or_default();
                &pillar_dates
            }
        };
        if dates.is_empty() {
            return Err(SurfaceError::InvalidPillarInput("empty simulation date grid".to_string()));
        }
        if dates.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SurfaceError::InvalidPillarInput(
                "simulation date grid must be strictly increasing".to_string(),
            ));
        }

        let atm = dates
            .iter()
            .map(|&d| {
                grid.try_row(d)?
                    .vols
                    .get(&DeltaBucket::AtmDeltaNeutral)
                    .copied()
                    .ok_or_else(|| SurfaceError::InvalidPillarInput("no ATM bucket".to_string()))
            })
            .collect::<SurfaceResult<Vec<f64>>>()?;

        let tau: Vec<f64> = std::iter::once(0.0)
            .chain(self.config.day_count.year_fractions(self.curve_date, dates))
            .collect();
        let forwards = self
            .forward_curve
            .interpolate(dates, self.config.flat_extrapolation)?;
        let spot = self.spot();

        let mut diagnostics = Vec::with_capacity(dates.len() + 1);
        diagnostics.push(PathDiagnostics {
            date: self.curve_date,
            tau: 0.0,
            dt: 0.0,
            fx_forward_rate: spot,
            drift: f64::NAN,
            atm_volatility: atm[0],
            forward_atm_volatility: f64::NAN,
        });

        let mut steps = Vec::with_capacity(dates.len());
        for (i, &date) in dates.iter().enumerate() {
            let dt = tau[i + 1] - tau[i];
            let previous_forward = if i == 0 { spot } else { forwards[i - 1] };
            let drift = (forwards[i] / previous_forward).ln() / dt;
            let forward_vol = if i == 0 {
                atm[0]
            } else {
                forward_volatility(tau[i], atm[i - 1], tau[i + 1], atm[i])?
            };
            steps.push(GbmStep {
                dt,
                drift,
                volatility: forward_vol,
            });
            diagnostics.push(PathDiagnostics {
                date,
                tau: tau[i + 1],
                dt,
                fx_forward_rate: forwards[i],
                drift,
                atm_volatility: atm[i],
                forward_atm_volatility: forward_vol,
            });
        }

        let mut rng = SimulationRng::from_seed(seed);
        let paths = simulate_gbm_paths(spot, &steps, n_sims, antithetic, &mut rng)?;
        debug!(steps = steps.len(), n_sims, antithetic, seed, "spot paths simulated");
        Ok(SimulatedPaths { paths, diagnostics })
    }

    /// Calibrates Heston to every pillar's quoted smile.
    ///
    /// Fits are reported whatever their SSE; the threshold only decides
    /// whether a warning is logged.
    #[instrument(skip(self))]
    pub fn calibrate_pillar_smiles(&self, pricer: HestonPricer) -> SurfaceResult<Vec<PillarSmileReport>> {
        let table = self
            .pillars
            .as_ref()
            .ok_or_else(|| SurfaceError::InvalidPillarInput("surface has no volatility pillars".to_string()))?;
        let engine = HestonEngine::new(pricer, self.config.heston)?;

        table
            .pillars()
            .iter()
            .zip(table.strikes())
            .map(|(pillar, strikes)| -> SurfaceResult<PillarSmileReport> {
                let market = FxMarket::new(self.spot(), pillar.tau, pillar.rate_foreign, pillar.rate_domestic)?
                    .with_forward(pillar.forward)?;
                let strike_values: Vec<f64> = strikes.strikes.values().copied().collect();
                let market_vols: Vec<f64> = pillar.vols.values().copied().collect();
                let option_types: Vec<OptionType> =
                    pillar.vols.keys().map(|b| b.option_type()).collect();

                let fit = calibrate_heston_smile(
                    &market,
                    &strike_values,
                    &market_vols,
                    &option_types,
                    &engine,
                    None,
                )?;
                info!(
                    tenor = %pillar.tenor_name,
                    v0 = fit.params.v0,
                    vv = fit.params.vv,
                    kappa = fit.params.kappa,
                    theta = fit.params.theta,
                    rho = fit.params.rho,
                    sse = fit.sse,
                    "pillar smile calibrated"
                );
                if fit.sse >= self.config.sse_threshold {
                    warn!(tenor = %pillar.tenor_name, sse = fit.sse, "heston fit is likely poor");
                }
                Ok(PillarSmileReport {
                    tenor_name: pillar.tenor_name.clone(),
                    date: pillar.date,
                    params: fit.params,
                    strikes: strike_values,
                    market_vols,
                    model_vols: fit.model_vols,
                    sse: fit.sse,
                    converged: fit.converged,
                })
            })
            .collect()
    }
}

fn check_shape(dates: &[Date], strikes: &[f64], option_types: &[OptionType]) -> SurfaceResult<()> {
    if dates.len() != strikes.len() || dates.len() != option_types.len() {
        return Err(SurfaceError::ShapeMismatch {
            dates: dates.len(),
            strikes: strikes.len(),
            option_types: option_types.len(),
        });
    }
    Ok(())
}
