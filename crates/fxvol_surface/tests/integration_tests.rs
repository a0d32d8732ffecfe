//! Integration tests for the volatility surface.
//!
//! These tests build complete surfaces from forward, zero-curve and pillar
//! quotes and check the properties callers depend on: pillar pass-through,
//! interpolation between pillars, the smile cache, batch pricing and path
//! simulation.

use std::sync::Arc;

use approx::assert_relative_eq;
use fxvol_core::market_data::FlatZeroCurve;
use fxvol_core::types::{Date, DayCountConvention};
use fxvol_models::analytical::{gk_price, DeltaConvention, FxMarket, OptionType};
use fxvol_models::heston::HestonPricer;
use fxvol_surface::{
    DeltaBucket, ForwardPoint, PillarQuote, SimulationMethod, SmileMethod, SurfaceConfig,
    SurfaceError, VolatilitySurface, VolatilitySurfaceBuilder,
};

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd(y, m, day).unwrap()
}

const CURVE_DATE: (i32, u32, u32) = (2023, 6, 30);
const SPOT: f64 = 0.66;
const R_DOMESTIC: f64 = 0.05;
const R_FOREIGN: f64 = 0.03;

fn curve_date() -> Date {
    d(CURVE_DATE.0, CURVE_DATE.1, CURVE_DATE.2)
}

/// Forward implied by the flat rates.
fn forward_at(date: Date) -> f64 {
    let tau = DayCountConvention::ActualActual.year_fraction(curve_date(), date);
    SPOT * ((R_DOMESTIC - R_FOREIGN) * tau).exp()
}

fn smile(atm: f64, put_premium: f64, call_premium: f64) -> [(DeltaBucket, f64); 3] {
    [
        (DeltaBucket::Put25, atm + put_premium),
        (DeltaBucket::AtmDeltaNeutral, atm),
        (DeltaBucket::Call25, atm + call_premium),
    ]
}

fn builder(pillars: Vec<PillarQuote>) -> VolatilitySurfaceBuilder {
    let today = curve_date();
    let dc = DayCountConvention::ActualActual;
    let far = d(2025, 7, 4);
    VolatilitySurfaceBuilder::new(
        today,
        "AUDUSD",
        Arc::new(FlatZeroCurve::new(today, dc, R_FOREIGN)),
        Arc::new(FlatZeroCurve::new(today, dc, R_DOMESTIC)),
    )
    .forward_points(vec![
        ForwardPoint::on(today, SPOT),
        ForwardPoint::on(far, forward_at(far)),
    ])
    .pillars(pillars)
}

/// 3M at 10% and 1Y at 11% ATM, both with a put skew.
fn two_pillar_surface(method: SmileMethod) -> VolatilitySurface {
    builder(vec![
        PillarQuote::new(
            "3M".parse().unwrap(),
            DeltaConvention::RegularSpot,
            smile(0.100, 0.006, 0.002),
        ),
        PillarQuote::new(
            "1Y".parse().unwrap(),
            DeltaConvention::RegularForward,
            smile(0.110, 0.008, 0.003),
        ),
    ])
    .smile_method(method)
    .build()
    .unwrap()
}

// ============================================================================
// Construction and Term Structure
// ============================================================================

/// Two pillars interpolated to six months land strictly between the pillar ATM vols.
#[test]
fn test_six_month_vol_between_pillars() {
    let surface = two_pillar_surface(SmileMethod::CubicSpline);
    let table = surface.pillars().unwrap();
    assert_eq!(table.len(), 2);

    // AUDUSD spot is T+2: Friday 30 June -> Tuesday 4 July.
    assert_eq!(surface.spot_date(), d(2023, 7, 4));
    assert_eq!(table.first_date(), d(2023, 10, 4));
    assert_eq!(table.last_date(), d(2024, 7, 4));

    let six_month = d(2024, 1, 4);
    let grid = surface.daily_grid().unwrap();
    let atm = grid.vol(six_month, DeltaBucket::AtmDeltaNeutral).unwrap();
    assert!(atm > 0.100 && atm < 0.110, "6M ATM vol {} not between pillars", atm);

    // Total variance grows along the grid.
    let variance = |date: Date| {
        let row = grid.row(date).unwrap();
        let vol = row.vols[&DeltaBucket::AtmDeltaNeutral];
        vol * vol * row.tau
    };
    assert!(variance(six_month) > variance(table.first_date()));
    assert!(variance(table.last_date()) > variance(six_month));
}

/// Every pillar date reproduces its own quotes on the daily grid.
#[test]
fn test_pillar_pass_through() {
    let surface = two_pillar_surface(SmileMethod::CubicSpline);
    let grid = surface.daily_grid().unwrap();
    for pillar in surface.pillars().unwrap().pillars() {
        let row = grid.row(pillar.date).unwrap();
        for (bucket, &quoted) in &pillar.vols {
            assert_relative_eq!(row.vols[bucket], quoted, epsilon = 1e-14);
        }
        assert_relative_eq!(row.tau, pillar.tau, epsilon = 1e-14);
    }
}

/// The grid covers every calendar day between the pillars.
#[test]
fn test_grid_is_daily() {
    let surface = two_pillar_surface(SmileMethod::CubicSpline);
    let grid = surface.daily_grid().unwrap();
    let expected = (grid.last_date() - grid.first_date()) as usize + 1;
    assert_eq!(grid.len(), expected);
    for pair in grid.rows().windows(2) {
        assert_eq!(pair[1].date - pair[0].date, 1);
        assert_eq!(pair[1].convention, DeltaConvention::RegularForward);
    }
}

/// Short-dated vol too high for the long-dated one is rejected at construction.
#[test]
fn test_negative_forward_variance_rejected() {
    let result = builder(vec![
        PillarQuote::new(
            "6M".parse().unwrap(),
            DeltaConvention::RegularSpot,
            smile(0.30, 0.01, 0.005),
        ),
        PillarQuote::new(
            "1Y".parse().unwrap(),
            DeltaConvention::RegularSpot,
            smile(0.10, 0.01, 0.005),
        ),
    ])
    .build();
    assert!(matches!(result, Err(SurfaceError::NegativeVariance { .. })));
}

/// USD as foreign against AUD is unusual but still builds.
#[test]
fn test_non_conventional_pair_builds() {
    let today = curve_date();
    let dc = DayCountConvention::ActualActual;
    let surface = VolatilitySurfaceBuilder::new(
        today,
        "USDAUD",
        Arc::new(FlatZeroCurve::new(today, dc, R_DOMESTIC)),
        Arc::new(FlatZeroCurve::new(today, dc, R_FOREIGN)),
    )
    .forward_point(ForwardPoint::on(today, 1.0 / SPOT))
    .build()
    .unwrap();
    assert_eq!(surface.pair().code(), "USDAUD");
}

// ============================================================================
// Smile Cache
// ============================================================================

/// Queries at one date share a single fit.
#[test]
fn test_smile_fitted_once_per_date() {
    let surface = two_pillar_surface(SmileMethod::CubicSpline);
    let date = d(2024, 1, 4);
    let strikes = [0.62, 0.64, 0.66, 0.68, 0.70];
    let cps = [OptionType::Put, OptionType::Put, OptionType::Call, OptionType::Call, OptionType::Call];

    let first = surface.implied_vol(&[date; 5], &strikes, &cps).unwrap();
    let second = surface.implied_vol(&[date; 5], &strikes, &cps).unwrap();

    assert_eq!(first, second);
    assert_eq!(surface.smile_cache().fit_count(), 1);
    assert!(Arc::ptr_eq(&surface.smile(date).unwrap(), &surface.smile(date).unwrap()));
    assert_eq!(surface.smile_cache().cached_dates(), vec![date]);

    surface.implied_vol(&[d(2024, 3, 1)], &[0.66], &[OptionType::Call]).unwrap();
    assert_eq!(surface.smile_cache().fit_count(), 2);
}

/// The spline smile reproduces the daily bucket vols at the bucket strikes.
#[test]
fn test_pillar_smile_hits_quotes() {
    let surface = two_pillar_surface(SmileMethod::CubicSpline);
    let table = surface.pillars().unwrap();
    let pillar = &table.pillars()[1];
    let strikes = &table.strikes()[1];

    for (bucket, &strike) in &strikes.strikes {
        let vol = surface
            .implied_vol(&[pillar.date], &[strike], &[bucket.option_type()])
            .unwrap()[0];
        assert_relative_eq!(vol, pillar.vols[bucket], epsilon = 1e-10);
    }
}

/// Wings beyond the bucket strikes stay flat and positive.
#[test]
fn test_smile_wings_flat() {
    let surface = two_pillar_surface(SmileMethod::UnivariateSpline);
    let date = d(2024, 1, 4);
    let vols = surface
        .implied_vol(&[date, date], &[0.30, 1.50], &[OptionType::Put, OptionType::Call])
        .unwrap();
    let row = surface.daily_grid().unwrap().row(date).unwrap();
    assert_relative_eq!(vols[0], row.vols[&DeltaBucket::Put25], epsilon = 1e-10);
    assert_relative_eq!(vols[1], row.vols[&DeltaBucket::Call25], epsilon = 1e-10);
}

/// Every pillar gets a Heston calibration report.
#[test]
fn test_pillar_heston_calibration_reports() {
    let surface = two_pillar_surface(SmileMethod::CubicSpline);
    let reports = surface
        .calibrate_pillar_smiles(HestonPricer::CarrMadanFft)
        .unwrap();
    assert_eq!(reports.len(), 2);
    for report in &reports {
        assert_eq!(report.model_vols.len(), 3);
        assert_eq!(report.market_vols.len(), 3);
        assert!(report.sse.is_finite());
        assert!(report.params.v0 > 0.0);
    }
    assert_eq!(reports[0].tenor_name, "3M");
}

/// Heston smiles go through the same cache and give sane vols for every pricer.
#[test]
fn test_heston_smile_queries_share_one_fit() {
    let date = d(2024, 1, 4);
    let strikes = [0.62, 0.64, 0.66, 0.68, 0.70];
    let cps = [OptionType::Put, OptionType::Put, OptionType::Call, OptionType::Call, OptionType::Call];

    for method in [
        SmileMethod::HestonAnalytical1993,
        SmileMethod::HestonCarrMadanQuadrature,
        SmileMethod::HestonCarrMadanFft,
    ] {
        let surface = two_pillar_surface(method);
        let vols = surface.implied_vol(&[date; 5], &strikes, &cps).unwrap();
        for vol in &vols {
            assert!(*vol > 0.05 && *vol < 0.20, "{}: vol {}", method.name(), vol);
        }
        assert_eq!(surface.smile_cache().fit_count(), 1, "{}", method.name());

        let priced = surface
            .price_vanilla(&[date; 5], &strikes, &cps, false, false)
            .unwrap();
        for (p, vol) in priced.iter().zip(&vols) {
            assert_eq!(p.market.volatility, *vol);
            assert!(p.price > 0.0);
        }
        assert_eq!(surface.smile_cache().fit_count(), 1, "{}", method.name());
    }
}

/// A Heston fit above the SSE threshold aborts the whole batch.
#[test]
fn test_poor_heston_fit_aborts_batch() {
    let date = d(2024, 1, 4);
    let config = SurfaceConfig {
        sse_threshold: f64::MIN_POSITIVE,
        ..SurfaceConfig::default()
    };
    let surface = builder(vec![
        PillarQuote::new("3M".parse().unwrap(), DeltaConvention::RegularSpot, smile(0.100, 0.006, 0.002)),
        PillarQuote::new("1Y".parse().unwrap(), DeltaConvention::RegularSpot, smile(0.110, 0.008, 0.003)),
    ])
    .config(config)
    .smile_method(SmileMethod::HestonAnalytical1993)
    .build()
    .unwrap();

    // The out-of-range entry alone would only give NaN.
    let err = surface
        .price_vanilla(
            &[date, d(2026, 1, 5), date],
            &[0.64, 0.66, 0.68],
            &[OptionType::Put, OptionType::Call, OptionType::Call],
            true,
            false,
        )
        .unwrap_err();
    match err {
        SurfaceError::PoorCalibrationFit { date: failed, sse } => {
            assert_eq!(failed, date);
            assert!(sse >= f64::MIN_POSITIVE);
        }
        other => panic!("expected PoorCalibrationFit, got {:?}", other),
    }
    assert_eq!(surface.smile_cache().fit_count(), 0);
}

// ============================================================================
// Pricing
// ============================================================================

/// 1Y AUDUSD call against the reference Garman-Kohlhagen value.
#[test]
fn test_reference_gk_call() {
    let market = FxMarket::new(0.6629, 1.0, 0.0466, 0.05381).unwrap();
    let price = gk_price(market, OptionType::Call, 0.7882, 0.098408).unwrap();
    assert!((price - 0.00133006).abs() < 0.0006, "price {}", price);
}

/// The same call priced through a flat-smile surface.
#[test]
fn test_reference_call_through_surface() {
    let today = curve_date();
    let dc = DayCountConvention::ActualActual;
    let expiry = d(2024, 7, 1);
    let tau = dc.year_fraction(today, expiry);
    let forward = 0.6629 * ((0.05381 - 0.0466) * tau).exp();

    let surface = VolatilitySurfaceBuilder::new(
        today,
        "AUDUSD",
        Arc::new(FlatZeroCurve::new(today, dc, 0.0466)),
        Arc::new(FlatZeroCurve::new(today, dc, 0.05381)),
    )
    .forward_points(vec![ForwardPoint::on(today, 0.6629), ForwardPoint::on(expiry, forward)])
    .pillars(vec![PillarQuote::new(
        fxvol_surface::Expiry::Date(expiry),
        DeltaConvention::RegularSpot,
        smile(0.098408, 0.0, 0.0),
    )])
    .build()
    .unwrap();

    let priced = surface
        .price_vanilla(&[expiry], &[0.7882], &[OptionType::Call], true, true)
        .unwrap();
    let result = &priced[0];
    assert_relative_eq!(result.market.volatility, 0.098408, epsilon = 1e-10);
    assert_relative_eq!(result.market.forward, forward, epsilon = 1e-12);
    assert!((result.price - 0.00133006).abs() < 0.0006, "price {}", result.price);

    let split = result.split.unwrap();
    assert_eq!(split.intrinsic, 0.0);
    assert_relative_eq!(split.time_value, result.price, epsilon = 1e-15);
    let greeks = result.greeks.unwrap();
    assert!(greeks.delta > 0.0 && greeks.delta < 0.5);
    assert!(greeks.vega > 0.0);
}

/// One out-of-range expiry yields NaN without failing the batch.
#[test]
fn test_batch_with_out_of_range_expiry() {
    let surface = two_pillar_surface(SmileMethod::CubicSpline);
    let expiries = [d(2023, 12, 1), d(2025, 3, 3), d(2024, 5, 2)];
    let strikes = [0.66, 0.66, 0.64];
    let cps = [OptionType::Call, OptionType::Call, OptionType::Put];

    let priced = surface
        .price_vanilla(&expiries, &strikes, &cps, true, false)
        .unwrap();

    assert_eq!(priced.len(), 3);
    assert_eq!(priced.iter().filter(|p| p.price.is_nan()).count(), 1);
    assert!(priced[1].price.is_nan());
    assert!(priced[1].market.volatility.is_nan());
    assert!(priced[1].greeks.unwrap().delta.is_nan());
    assert!(priced[1].market.forward.is_finite());
    assert!(priced[0].price > 0.0);
    assert!(priced[2].price > 0.0);
    assert_eq!(priced[2].option_type, OptionType::Put);
}

/// Mismatched batch inputs fail as a whole.
#[test]
fn test_batch_shape_mismatch() {
    let surface = two_pillar_surface(SmileMethod::CubicSpline);
    let err = surface
        .price_vanilla(&[d(2024, 1, 4)], &[0.66], &[], false, false)
        .unwrap_err();
    assert!(matches!(err, SurfaceError::ShapeMismatch { .. }));
}

/// Put-call parity holds on surface prices.
#[test]
fn test_surface_put_call_parity() {
    let surface = two_pillar_surface(SmileMethod::CubicSpline);
    let expiry = d(2024, 1, 4);
    let priced = surface
        .price_vanilla(&[expiry, expiry], &[0.67, 0.67], &[OptionType::Call, OptionType::Put], false, false)
        .unwrap();
    let m = priced[0].market;
    let parity = (m.forward - 0.67) * (-m.rate_domestic * m.tau).exp();
    assert_relative_eq!(priced[0].price - priced[1].price, parity, epsilon = 1e-10);
}

// ============================================================================
// Simulation
// ============================================================================

/// Inputs table follows the grid and the first step uses spot and ATM vol directly.
#[test]
fn test_simulation_diagnostics() {
    let surface = two_pillar_surface(SmileMethod::CubicSpline);
    let grid = [d(2023, 10, 4), d(2024, 1, 4), d(2024, 7, 4)];
    let sim = surface
        .simulate_path(Some(&grid), 64, true, SimulationMethod::GeometricBrownianMotion, 7)
        .unwrap();

    assert_eq!(sim.paths.rows(), 4);
    assert_eq!(sim.paths.cols(), 64);
    assert_eq!(sim.diagnostics.len(), 4);

    let first = &sim.diagnostics[0];
    assert_eq!(first.date, curve_date());
    assert_eq!(first.fx_forward_rate, SPOT);
    assert!(first.drift.is_nan());
    assert!(first.forward_atm_volatility.is_nan());
    assert_relative_eq!(first.atm_volatility, 0.100, epsilon = 1e-14);
    assert!(sim.paths.row(0).iter().all(|&s| s == SPOT));

    let step1 = &sim.diagnostics[1];
    assert_relative_eq!(step1.forward_atm_volatility, 0.100, epsilon = 1e-14);
    assert_relative_eq!(step1.drift, R_DOMESTIC - R_FOREIGN, epsilon = 1e-10);

    // Later steps carry the forward vol between consecutive grid dates.
    for w in sim.diagnostics[1..].windows(2) {
        let (a, b) = (&w[0], &w[1]);
        let fwd_var = (b.atm_volatility.powi(2) * b.tau - a.atm_volatility.powi(2) * a.tau) / b.dt;
        assert_relative_eq!(b.forward_atm_volatility.powi(2), fwd_var, epsilon = 1e-12);
        assert_relative_eq!(b.dt, b.tau - a.tau, epsilon = 1e-15);
    }
}

/// The Monte-Carlo mean of the terminal spot matches the forward.
#[test]
fn test_simulated_mean_matches_forward() {
    let surface = two_pillar_surface(SmileMethod::CubicSpline);
    let sim = surface
        .simulate_path(None, 20_000, true, SimulationMethod::GeometricBrownianMotion, 42)
        .unwrap();
    let last = sim.diagnostics.last().unwrap();
    let mean = sim.paths.row_mean(sim.paths.rows() - 1);
    assert_relative_eq!(mean, last.fx_forward_rate, max_relative = 5e-3);
}

/// Same seed, same paths.
#[test]
fn test_simulation_reproducible() {
    let surface = two_pillar_surface(SmileMethod::CubicSpline);
    let run = |seed| {
        surface
            .simulate_path(None, 100, false, SimulationMethod::GeometricBrownianMotion, seed)
            .unwrap()
            .paths
    };
    assert_eq!(run(3), run(3));
    assert_ne!(run(3), run(4));
}

/// Grids must be increasing and inside the pillar range.
#[test]
fn test_simulation_grid_validation() {
    let surface = two_pillar_surface(SmileMethod::CubicSpline);
    let method = SimulationMethod::GeometricBrownianMotion;
    assert!(matches!(
        surface.simulate_path(Some(&[d(2024, 1, 4), d(2023, 12, 1)]), 10, false, method, 1),
        Err(SurfaceError::InvalidPillarInput(_))
    ));
    assert!(matches!(
        surface.simulate_path(Some(&[d(2023, 8, 1)]), 10, false, method, 1),
        Err(SurfaceError::OutOfRangeQuery { .. })
    ));
}
