//! Criterion benchmarks for surface construction, smile queries and batch pricing.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use fxvol_core::market_data::FlatZeroCurve;
use fxvol_core::types::{Date, DayCountConvention};
use fxvol_models::analytical::{DeltaConvention, OptionType};
use fxvol_surface::{
    DeltaBucket, ForwardPoint, PillarQuote, SimulationMethod, SmileMethod, VolatilitySurfaceBuilder,
};

fn builder() -> VolatilitySurfaceBuilder {
    let today = Date::from_ymd(2023, 6, 30).unwrap();
    let dc = DayCountConvention::ActualActual;
    let pillars = [("1M", 0.102), ("3M", 0.105), ("6M", 0.107), ("1Y", 0.110), ("2Y", 0.112)]
        .iter()
        .map(|&(tenor, atm)| {
            PillarQuote::new(
                tenor.parse().unwrap(),
                DeltaConvention::RegularSpot,
                [
                    (DeltaBucket::Put10, atm + 0.018),
                    (DeltaBucket::Put25, atm + 0.007),
                    (DeltaBucket::AtmDeltaNeutral, atm),
                    (DeltaBucket::Call25, atm + 0.002),
                    (DeltaBucket::Call10, atm + 0.006),
                ],
            )
        })
        .collect();

    VolatilitySurfaceBuilder::new(
        today,
        "AUDUSD",
        Arc::new(FlatZeroCurve::new(today, dc, 0.0466)),
        Arc::new(FlatZeroCurve::new(today, dc, 0.0538)),
    )
    .forward_points(vec![
        ForwardPoint::on(today, 0.6629),
        ForwardPoint::on(Date::from_ymd(2025, 7, 7).unwrap(), 0.6726),
    ])
    .pillars(pillars)
}

fn bench_construction(c: &mut Criterion) {
    c.bench_function("surface_build_five_pillars", |b| {
        b.iter_batched(builder, |b| b.build(), BatchSize::SmallInput)
    });
}

fn bench_option_chain(c: &mut Criterion) {
    let expiry = Date::from_ymd(2024, 2, 15).unwrap();
    let strikes: Vec<f64> = (0..41).map(|i| 0.60 + 0.0035 * i as f64).collect();
    let cps: Vec<OptionType> = strikes
        .iter()
        .map(|&k| if k < 0.665 { OptionType::Put } else { OptionType::Call })
        .collect();
    let dates = vec![expiry; strikes.len()];

    let mut group = c.benchmark_group("option_chain");
    for method in [SmileMethod::CubicSpline, SmileMethod::UnivariateSpline] {
        let surface = builder().smile_method(method).build().unwrap();
        // Warm the cache so the loop measures queries only.
        surface.smile(expiry).unwrap();
        group.bench_with_input(BenchmarkId::new("price_41", method.name()), &surface, |b, s| {
            b.iter(|| s.price_vanilla(black_box(&dates), &strikes, &cps, true, false))
        });
    }
    group.finish();
}

fn bench_simulation(c: &mut Criterion) {
    let surface = builder().build().unwrap();
    c.bench_function("simulate_pillar_grid_10k", |b| {
        b.iter(|| {
            surface.simulate_path(
                None,
                black_box(10_000),
                true,
                SimulationMethod::GeometricBrownianMotion,
                42,
            )
        })
    });
}

criterion_group!(benches, bench_construction, bench_option_chain, bench_simulation);
criterion_main!(benches);
