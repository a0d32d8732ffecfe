//! Market files.
//!
//! A market file is TOML describing one surface:
//!
//! ```toml
//! curve_date = "2023-06-30"
//! pair = "AUDUSD"
//! day_count = "ACT/ACT"
//!
//! [[forward]]
//! tenor = "SP"
//! rate = 0.6629
//!
//! [[forward]]
//! date = "2024-07-05"
//! rate = 0.6676
//!
//! [foreign_curve]
//! flat = 0.0466
//!
//! [domestic_curve]
//! dates = ["2023-07-31", "2024-06-28"]
//! rates = [0.0510, 0.0538]
//!
//! [[pillar]]
//! tenor = "1Y"
//! convention = "regular_forward"
//! vols = { 25P = 0.112, ATM = 0.104, 25C = 0.106 }
//! ```
//!
//! Dates are quoted strings.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use fxvol_core::market_data::{CurveInterpolation, FlatZeroCurve, InterpolatedZeroCurve, ZeroCurve};
use fxvol_core::types::{Date, DayCountConvention};
use fxvol_models::analytical::DeltaConvention;
use fxvol_surface::{
    DeltaBucket, Expiry, ForwardPoint, PillarQuote, SmileMethod, SurfaceConfig,
    VolatilitySurfaceBuilder,
};
use serde::Deserialize;

use crate::{CliError, Result};

/// Parsed market file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarketFile {
    pub curve_date: Date,
    pub pair: String,
    #[serde(default)]
    pub spot_date: Option<Date>,
    #[serde(default)]
    pub day_count: Option<DayCountConvention>,
    #[serde(default)]
    pub smile_method: Option<SmileMethod>,
    #[serde(default, rename = "forward")]
    pub forwards: Vec<ForwardRow>,
    pub foreign_curve: ZeroCurveSpec,
    pub domestic_curve: ZeroCurveSpec,
    #[serde(default, rename = "pillar")]
    pub pillars: Vec<PillarRow>,
}

/// One `[[forward]]` row.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForwardRow {
    #[serde(default)]
    pub date: Option<Date>,
    #[serde(default)]
    pub tenor: Option<String>,
    pub rate: f64,
}

/// A zero curve: either `flat` or `dates` with `rates`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZeroCurveSpec {
    #[serde(default)]
    pub flat: Option<f64>,
    #[serde(default)]
    pub dates: Vec<Date>,
    #[serde(default)]
    pub rates: Vec<f64>,
    #[serde(default)]
    pub interpolation: CurveInterpolation,
}

/// One `[[pillar]]` row.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PillarRow {
    #[serde(default)]
    pub date: Option<Date>,
    #[serde(default)]
    pub tenor: Option<String>,
    pub convention: DeltaConvention,
    pub vols: BTreeMap<DeltaBucket, f64>,
    #[serde(default)]
    pub atm_forward: Option<f64>,
}

fn parse_expiry(date: Option<Date>, tenor: Option<&str>, what: &str) -> std::result::Result<Expiry, String> {
    match (date, tenor) {
        (Some(d), None) => Ok(Expiry::Date(d)),
        (None, Some(t)) => t.parse().map_err(|e| format!("{}: {}", what, e)),
        _ => Err(format!("{} needs exactly one of `date` or `tenor`", what)),
    }
}

impl ZeroCurveSpec {
    fn to_curve(
        &self,
        curve_date: Date,
        day_count: DayCountConvention,
        name: &str,
    ) -> std::result::Result<Arc<dyn ZeroCurve>, String> {
        match self.flat {
            Some(rate) if self.dates.is_empty() => {
                Ok(Arc::new(FlatZeroCurve::new(curve_date, day_count, rate)))
            }
            Some(_) => Err(format!("{}: `flat` cannot be combined with `dates`", name)),
            None => InterpolatedZeroCurve::new(
                curve_date,
                day_count,
                &self.dates,
                &self.rates,
                self.interpolation,
            )
            .map(|c| Arc::new(c) as Arc<dyn ZeroCurve>)
            .map_err(|e| format!("{}: {}", name, e)),
        }
    }
}

impl MarketFile {
    /// Reads and parses `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|message| CliError::MarketFile {
            path: path.display().to_string(),
            message,
        })
    }

    /// Parses TOML content.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// A surface builder for this market.
    ///
    /// The file's day count and smile method apply only where `config`
    /// still has the values the command line left unset.
    pub fn builder(
        &self,
        mut config: SurfaceConfig,
        cli_day_count: bool,
        cli_smile_method: bool,
    ) -> std::result::Result<VolatilitySurfaceBuilder, String> {
        if let (Some(dc), false) = (self.day_count, cli_day_count) {
            config.day_count = dc;
        }
        if let (Some(method), false) = (self.smile_method, cli_smile_method) {
            config.smile_method = method;
        }

        let foreign = self
            .foreign_curve
            .to_curve(self.curve_date, config.day_count, "foreign_curve")?;
        let domestic = self
            .domestic_curve
            .to_curve(self.curve_date, config.day_count, "domestic_curve")?;

        let forwards = self
            .forwards
            .iter()
            .enumerate()
            .map(|(i, row)| -> std::result::Result<ForwardPoint, String> {
                let expiry = parse_expiry(row.date, row.tenor.as_deref(), &format!("forward row {}", i + 1))?;
                Ok(ForwardPoint {
                    expiry,
                    rate: row.rate,
                })
            })
            .collect::<std::result::Result<Vec<_>, String>>()?;

        let mut builder = VolatilitySurfaceBuilder::new(self.curve_date, self.pair.clone(), foreign, domestic)
            .forward_points(forwards)
            .config(config);
        if let Some(spot_date) = self.spot_date {
            builder = builder.spot_date(spot_date);
        }

        if !self.pillars.is_empty() {
            let quotes = self
                .pillars
                .iter()
                .enumerate()
                .map(|(i, row)| -> std::result::Result<PillarQuote, String> {
                    let expiry = parse_expiry(row.date, row.tenor.as_deref(), &format!("pillar row {}", i + 1))?;
                    let quote = PillarQuote::new(expiry, row.convention, row.vols.clone());
                    Ok(match row.atm_forward {
                        Some(vol) => quote.with_atm_forward(vol),
                        None => quote,
                    })
                })
                .collect::<std::result::Result<Vec<_>, String>>()?;
            builder = builder.pillars(quotes);
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxvol_surface::SurfaceError;

    const SAMPLE: &str = r#"
curve_date = "2023-06-30"
pair = "AUDUSD"

[[forward]]
tenor = "SP"
rate = 0.6629

[[forward]]
date = "2024-07-05"
rate = 0.6676

[foreign_curve]
flat = 0.0466

[domestic_curve]
dates = ["2023-07-31", "2024-06-28"]
rates = [0.0510, 0.0538]

[[pillar]]
tenor = "3M"
convention = "regular_spot"
vols = { 25P = 0.110, ATM = 0.102, 25C = 0.103 }

[[pillar]]
tenor = "1Y"
convention = "regular_forward"
vols = { 25P = 0.112, ATM = 0.104, 25C = 0.106 }
"#;

    // ==========================================================
    // Parsing
    // ==========================================================

    #[test]
    fn test_parse_sample() {
        let market = MarketFile::parse(SAMPLE).unwrap();
        assert_eq!(market.pair, "AUDUSD");
        assert_eq!(market.forwards.len(), 2);
        assert_eq!(market.pillars.len(), 2);
        assert_eq!(market.pillars[0].vols[&DeltaBucket::Put25], 0.110);
        assert_eq!(market.foreign_curve.flat, Some(0.0466));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let bad = SAMPLE.replace("pair = \"AUDUSD\"", "pair = \"AUDUSD\"\nspot = 0.66");
        assert!(MarketFile::parse(&bad).is_err());
    }

    #[test]
    fn test_forward_row_needs_one_key() {
        let bad = SAMPLE.replace("tenor = \"SP\"\n", "tenor = \"SP\"\ndate = \"2023-06-30\"\n");
        let market = MarketFile::parse(&bad).unwrap();
        assert!(market.builder(SurfaceConfig::default(), false, false).is_err());
    }

    // ==========================================================
    // Surface construction
    // ==========================================================

    #[test]
    fn test_sample_builds_surface() {
        let market = MarketFile::parse(SAMPLE).unwrap();
        let surface = market
            .builder(SurfaceConfig::default(), false, false)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(surface.spot(), 0.6629);
        assert_eq!(surface.pillars().unwrap().len(), 2);
    }

    #[test]
    fn test_file_day_count_yields_to_cli() {
        let with_dc = SAMPLE.replace("pair = \"AUDUSD\"", "pair = \"AUDUSD\"\nday_count = \"ACT/365\"");
        let market = MarketFile::parse(&with_dc).unwrap();

        let from_file = market.builder(SurfaceConfig::default(), false, false).unwrap();
        assert_eq!(from_file.build().unwrap().day_count(), DayCountConvention::Actual365Fixed);

        let from_cli = market.builder(SurfaceConfig::default(), true, false).unwrap();
        assert_eq!(from_cli.build().unwrap().day_count(), DayCountConvention::ActualActual);
    }

    #[test]
    fn test_missing_spot_quote_reported() {
        let no_spot = SAMPLE.replace("tenor = \"SP\"\nrate = 0.6629", "tenor = \"6M\"\nrate = 0.665");
        let market = MarketFile::parse(&no_spot).unwrap();
        let err = market
            .builder(SurfaceConfig::default(), false, false)
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, SurfaceError::MissingSpotQuote { .. }));
    }

    #[test]
    fn test_shipped_market_file_builds() {
        let market = MarketFile::parse(include_str!("../markets/audusd.toml")).unwrap();
        let surface = market
            .builder(SurfaceConfig::default(), false, false)
            .unwrap()
            .build()
            .unwrap();
        let table = surface.pillars().unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.buckets().len(), 5);
        assert_eq!(surface.spot(), 0.662866);
    }
}
