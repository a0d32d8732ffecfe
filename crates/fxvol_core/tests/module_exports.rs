//! Integration tests for the public module layout.

use fxvol_core::market_data::curves::{CurveInterpolation, InterpolatedZeroCurve, ZeroCurve};
use fxvol_core::market_data::{FlatZeroCurve, ForwardCurve, MarketDataError};
use fxvol_core::math::interpolators::{
    CubicSplineInterpolator, Interpolator, LinearInterpolator, MonotonicInterpolator,
};
use fxvol_core::math::quadrature::GaussKronrod;
use fxvol_core::math::solvers::{
    BrentSolver, LevenbergMarquardtSolver, NewtonRaphsonSolver, ParameterBounds,
};
use fxvol_core::types::{Currency, CurrencyPair, Date, DayCountConvention, Tenor};
use std::sync::Arc;

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd(y, m, day).unwrap()
}

#[test]
fn test_types_module_exports() {
    let pair: CurrencyPair = "EURUSD".parse().unwrap();
    assert_eq!(pair.foreign(), Currency::EUR);
    let spot = pair.spot_date(d(2024, 3, 1)).unwrap();
    assert_eq!(spot, d(2024, 3, 5));
    let expiry = Tenor::Months(3).resolve(d(2024, 3, 1), spot).unwrap();
    assert_eq!(expiry, d(2024, 6, 5));
    assert!(DayCountConvention::Actual360.year_fraction(spot, expiry) > 0.25);
}

#[test]
fn test_math_module_exports() {
    let xs = [0.0, 1.0, 2.0];
    let ys = [1.0, 0.0, 1.0];
    let linear = LinearInterpolator::new(&xs, &ys).unwrap();
    let spline = CubicSplineInterpolator::new(&xs, &ys).unwrap();
    let mono = MonotonicInterpolator::new(&xs, &ys).unwrap();
    for interp in [&linear as &dyn Interpolator<f64>, &spline, &mono] {
        assert_eq!(interp.interpolate(1.0).unwrap(), 0.0);
    }

    let root = BrentSolver::with_defaults().find_root(|x| x - 0.25, 0.0, 1.0).unwrap();
    assert!((root - 0.25).abs() < 1e-10);
    let root = NewtonRaphsonSolver::with_defaults()
        .find_root(|x| x - 0.25, |_| 1.0, 0.0)
        .unwrap();
    assert!((root - 0.25).abs() < 1e-10);
    let bounds = ParameterBounds::new(vec![0.0], vec![1.0]).unwrap();
    let fit = LevenbergMarquardtSolver::with_defaults()
        .solve_bounded(|p: &[f64]| vec![p[0] - 0.25], vec![0.0], &bounds)
        .unwrap();
    assert!((fit.params[0] - 0.25).abs() < 1e-8);
    let area = GaussKronrod::default().integrate(|x| x, 0.0, 1.0).unwrap();
    assert!((area.value - 0.5).abs() < 1e-14);
}

#[test]
fn test_market_data_curves_behind_arc() {
    let today = d(2023, 6, 30);
    let curves: Vec<Arc<dyn ZeroCurve>> = vec![
        Arc::new(FlatZeroCurve::new(today, DayCountConvention::ActualActual, 0.0466)),
        Arc::new(
            InterpolatedZeroCurve::new(
                today,
                DayCountConvention::ActualActual,
                &[d(2023, 7, 31), d(2024, 7, 1)],
                &[0.0466, 0.0538],
                CurveInterpolation::Linear,
            )
            .unwrap(),
        ),
    ];
    for curve in &curves {
        let df = curve.discount_factor(d(2024, 1, 2)).unwrap();
        assert!(df < 1.0 && df > 0.95);
    }

    let fwd = ForwardCurve::new(today, DayCountConvention::ActualActual, &[(today, 0.6629)]);
    assert!(fwd.is_ok());
    let missing = ForwardCurve::new(today, DayCountConvention::ActualActual, &[]);
    assert!(matches!(missing, Err(MarketDataError::MissingSpotQuote { .. })));
}
