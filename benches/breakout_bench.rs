//! Breakout Engine Benchmarks
//!
//! Benchmarks the per-cycle domain work: window aggregation, the
//! breakout decision, and quantity sizing.
//!
//! Run with: cargo bench --bench breakout_bench

use chrono::DateTime;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use breakout_futures_bot::domain::breakout::{BreakoutEngine, DEFAULT_QUANTITY_PRECISION};
use breakout_futures_bot::domain::candle::{Candle, CandleWindow};
use breakout_futures_bot::domain::trade::PositionState;

fn window(len: usize) -> CandleWindow {
    let candles = (0..len)
        .map(|i| {
            let base = Decimal::from(2000 + (i % 7) as i64);
            Candle {
                open_time: DateTime::from_timestamp(1_700_000_000 + i as i64 * 60, 0).unwrap(),
                open: base,
                high: base + dec!(3.5),
                low: base - dec!(2.25),
                close: base + dec!(1),
                volume: dec!(42.1),
            }
        })
        .collect();
    CandleWindow::new(candles).unwrap()
}

/// Benchmark a full evaluation on the default 15-candle window.
fn bench_evaluate(c: &mut Criterion) {
    let engine = BreakoutEngine::new(dec!(0.05), dec!(10), DEFAULT_QUANTITY_PRECISION);
    let w = window(15);

    c.bench_function("evaluate_15_flat", |b| {
        b.iter(|| engine.evaluate(black_box(&w), black_box(&PositionState::Flat)));
    });
}

/// Benchmark evaluation on the exchange's maximum window.
fn bench_evaluate_large(c: &mut Criterion) {
    let engine = BreakoutEngine::new(dec!(0.05), dec!(10), DEFAULT_QUANTITY_PRECISION);
    let w = window(1500);

    c.bench_function("evaluate_1500_flat", |b| {
        b.iter(|| engine.evaluate(black_box(&w), black_box(&PositionState::Flat)));
    });
}

fn bench_size_entry(c: &mut Criterion) {
    let engine = BreakoutEngine::new(dec!(0.05), dec!(10), DEFAULT_QUANTITY_PRECISION);

    c.bench_function("size_entry", |b| {
        b.iter(|| engine.size_entry(black_box(dec!(2003.17))));
    });
}

criterion_group!(benches, bench_evaluate, bench_evaluate_large, bench_size_entry);
criterion_main!(benches);
