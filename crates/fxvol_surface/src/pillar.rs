//! Volatility pillars: quoted expiries with their rates and strikes.
//!
//! A pillar is one row of the quoted surface: an expiry, a delta
//! convention and a vol per delta bucket. Building the pillar table
//! resolves expiries to dates, attaches the zero rates and the forward at
//! each date, and solves the strike of every bucket.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use fxvol_core::market_data::{ForwardCurve, ZeroCurve};
use fxvol_core::types::{Date, DayCountConvention, Tenor};
use fxvol_models::analytical::{solve_strike, DeltaConvention, FxMarket};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bucket::DeltaBucket;
use crate::error::{SurfaceError, SurfaceResult};

/// An expiry given either as a tenor or as a date.
///
/// # Examples
///
/// ```
/// use fxvol_surface::Expiry;
///
/// assert!(matches!("3M".parse::<Expiry>().unwrap(), Expiry::Tenor(_)));
/// assert!(matches!("2024-06-28".parse::<Expiry>().unwrap(), Expiry::Date(_)));
/// assert!("soon".parse::<Expiry>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Resolved against the spot date.
    Tenor(Tenor),
    /// Used as is.
    Date(Date),
}

impl Expiry {
    /// Resolves to a date. Tenors follow [`Tenor::resolve`].
    pub fn resolve(&self, curve_date: Date, spot_date: Date) -> SurfaceResult<Date> {
        match self {
            Expiry::Date(d) => Ok(*d),
            Expiry::Tenor(t) => t.resolve(curve_date, spot_date).map_err(|e| {
                SurfaceError::InvalidPillarInput(format!("cannot resolve tenor {}: {}", t, e))
            }),
        }
    }

    /// The tenor label, or the ISO date.
    pub fn label(&self) -> String {
        match self {
            Expiry::Tenor(t) => t.to_string(),
            Expiry::Date(d) => d.to_string(),
        }
    }
}

impl FromStr for Expiry {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(date) = Date::parse(s.trim()) {
            return Ok(Expiry::Date(date));
        }
        s.parse::<Tenor>()
            .map(Expiry::Tenor)
            .map_err(|e| SurfaceError::InvalidPillarInput(e.to_string()))
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Quoted smile at one expiry, before resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PillarQuote {
    /// Tenor or date of the expiry.
    pub expiry: Expiry,
    /// How the bucket deltas are defined.
    pub convention: DeltaConvention,
    /// Vol per delta bucket.
    pub vols: BTreeMap<DeltaBucket, f64>,
    /// ATM-forward vol. It replaces the ATM bucket vol and puts the ATM
    /// strike on the forward.
    pub atm_forward: Option<f64>,
}

impl PillarQuote {
    /// A quote from `(bucket, vol)` pairs.
    pub fn new<I>(expiry: Expiry, convention: DeltaConvention, vols: I) -> Self
    where
        I: IntoIterator<Item = (DeltaBucket, f64)>,
    {
        Self {
            expiry,
            convention,
            vols: vols.into_iter().collect(),
            atm_forward: None,
        }
    }

    /// Adds an ATM-forward vol.
    pub fn with_atm_forward(mut self, vol: f64) -> Self {
        self.atm_forward = Some(vol);
        self
    }
}

/// A resolved pillar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityPillar {
    /// Expiry date.
    pub date: Date,
    /// Tenor label as quoted, or the ISO date.
    pub tenor_name: String,
    /// Year fraction from the curve date.
    pub tau: f64,
    /// Delta convention of the quotes.
    pub convention: DeltaConvention,
    /// Vol per bucket; the ATM vol is the ATM-forward vol when one was quoted.
    pub vols: BTreeMap<DeltaBucket, f64>,
    /// Foreign continuously compounded zero rate.
    pub rate_foreign: f64,
    /// Domestic continuously compounded zero rate.
    pub rate_domestic: f64,
    /// Outright forward at the expiry.
    pub forward: f64,
}

/// Strikes of one pillar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikePillar {
    /// Expiry date.
    pub date: Date,
    /// Strike per bucket.
    pub strikes: BTreeMap<DeltaBucket, f64>,
}

/// Resolved pillars sorted by date, with their strikes.
#[derive(Debug, Clone, PartialEq)]
pub struct PillarTable {
    pillars: Vec<VolatilityPillar>,
    strikes: Vec<StrikePillar>,
    buckets: Vec<DeltaBucket>,
    atm_forward: bool,
}

/// Everything pillar resolution reads from the market.
pub(crate) struct PillarMarket<'a> {
    pub curve_date: Date,
    pub spot_date: Date,
    pub day_count: DayCountConvention,
    pub forward_curve: &'a ForwardCurve,
    pub foreign: &'a dyn ZeroCurve,
    pub domestic: &'a dyn ZeroCurve,
    pub flat_extrapolation: bool,
}

impl PillarTable {
    /// Pillars, earliest first.
    pub fn pillars(&self) -> &[VolatilityPillar] {
        &self.pillars
    }

    /// Strikes aligned with [`pillars`](Self::pillars).
    pub fn strikes(&self) -> &[StrikePillar] {
        &self.strikes
    }

    /// The bucket set shared by every pillar.
    pub fn buckets(&self) -> &[DeltaBucket] {
        &self.buckets
    }

    /// Whether ATM strikes sit on the forward.
    pub fn atm_forward(&self) -> bool {
        self.atm_forward
    }

    /// First pillar date.
    pub fn first_date(&self) -> Date {
        self.pillars[0].date
    }

    /// Last pillar date.
    pub fn last_date(&self) -> Date {
        self.pillars[self.pillars.len() - 1].date
    }

    /// Number of pillars.
    pub fn len(&self) -> usize {
        self.pillars.len()
    }

    /// Always false; an empty table cannot be built.
    pub fn is_empty(&self) -> bool {
        self.pillars.is_empty()
    }

    /// Whether `date` lies within `[first_date, last_date]`.
    pub fn contains(&self, date: Date) -> bool {
        date >= self.first_date() && date <= self.last_date()
    }

    /// Resolves and validates `quotes`.
    pub(crate) fn build(quotes: &[PillarQuote], market: &PillarMarket<'_>) -> SurfaceResult<Self> {
        let first = quotes
            .first()
            .ok_or_else(|| SurfaceError::InvalidPillarInput("no volatility pillars".to_string()))?;

        let atm_forward = first.atm_forward.is_some();
        if quotes.iter().any(|q| q.atm_forward.is_some() != atm_forward) {
            return Err(SurfaceError::InvalidPillarInput(
                "ATM-forward vols must be quoted on every pillar or on none".to_string(),
            ));
        }

        let mut pillars = quotes
            .iter()
            .map(|q| resolve_pillar(q, market))
            .collect::<SurfaceResult<Vec<_>>>()?;
        pillars.sort_by_key(|p| p.date);

        if let Some(w) = pillars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(SurfaceError::InvalidPillarInput(format!(
                "pillars {} and {} share the date {}",
                w[0].tenor_name, w[1].tenor_name, w[0].date
            )));
        }

        let buckets: Vec<DeltaBucket> = pillars[0].vols.keys().copied().collect();
        if !DeltaBucket::is_supported_set(&buckets) {
            return Err(SurfaceError::InvalidPillarInput(format!(
                "bucket set {:?} is neither the three- nor the five-bucket set",
                buckets.iter().map(|b| b.label()).collect::<Vec<_>>()
            )));
        }
        if let Some(p) = pillars
            .iter()
            .find(|p| !p.vols.keys().copied().eq(buckets.iter().copied()))
        {
            return Err(SurfaceError::InvalidPillarInput(format!(
                "pillar {} quotes a different bucket set",
                p.tenor_name
            )));
        }

        let strikes = pillars
            .iter()
            .map(|p| pillar_strikes(p, market.forward_curve.spot(), atm_forward))
            .collect::<SurfaceResult<Vec<_>>>()?;

        debug!(pillars = pillars.len(), buckets = buckets.len(), atm_forward, "pillar table built");
        Ok(Self {
            pillars,
            strikes,
            buckets,
            atm_forward,
        })
    }
}

fn resolve_pillar(quote: &PillarQuote, market: &PillarMarket<'_>) -> SurfaceResult<VolatilityPillar> {
    let date = quote.expiry.resolve(market.curve_date, market.spot_date)?;
    let tenor_name = quote.expiry.label();
    if date <= market.curve_date {
        return Err(SurfaceError::InvalidPillarInput(format!(
            "pillar {} expires on {}, not after the curve date {}",
            tenor_name, date, market.curve_date
        )));
    }

    let mut vols = quote.vols.clone();
    if let Some(atmf) = quote.atm_forward {
        vols.insert(DeltaBucket::AtmDeltaNeutral, atmf);
    }
    if let Some((bucket, vol)) = vols.iter().find(|(_, v)| !(**v > 0.0 && v.is_finite())) {
        return Err(SurfaceError::InvalidPillarInput(format!(
            "pillar {} has an invalid {} vol {}",
            tenor_name, bucket, vol
        )));
    }

    let forward = market
        .forward_curve
        .interpolate(&[date], market.flat_extrapolation)?[0];
    Ok(VolatilityPillar {
        date,
        tau: market.day_count.year_fraction(market.curve_date, date),
        convention: quote.convention,
        vols,
        rate_foreign: market.foreign.zero_rate(date)?,
        rate_domestic: market.domestic.zero_rate(date)?,
        forward,
        tenor_name,
    })
}

fn pillar_strikes(pillar: &VolatilityPillar, spot: f64, atm_forward: bool) -> SurfaceResult<StrikePillar> {
    let market = FxMarket::new(spot, pillar.tau, pillar.rate_foreign, pillar.rate_domestic)?
        .with_forward(pillar.forward)?;
    Ok(StrikePillar {
        date: pillar.date,
        strikes: bucket_strikes(&market, &pillar.vols, pillar.convention, atm_forward)?,
    })
}

/// Strike of every bucket in `vols`.
///
/// With `atm_forward` the ATM strike is the market forward; every other
/// strike comes from [`solve_strike`].
pub(crate) fn bucket_strikes(
    market: &FxMarket,
    vols: &BTreeMap<DeltaBucket, f64>,
    convention: DeltaConvention,
    atm_forward: bool,
) -> SurfaceResult<BTreeMap<DeltaBucket, f64>> {
    vols.iter()
        .map(|(&bucket, &vol)| -> SurfaceResult<(DeltaBucket, f64)> {
            let strike = if atm_forward && bucket.is_atm() {
                market.forward()
            } else {
                solve_strike(market, vol, bucket.signed_delta(), convention)?
            };
            Ok((bucket, strike))
        })
        .collect()
}
