//! benches/order_book.rs
//! Run with:  cargo bench --bench order_book
//! HTML:      target/criterion/report/index.html

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use microsim::{LimitOrderBook, Order, Side};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::hint::black_box;

// ────────────────────────────────────────────────────────────────────────────
//  Parameter grids
// ────────────────────────────────────────────────────────────────────────────
const BOOK_SIZES: &[usize] = &[10_000, 50_000, 100_000];
const SWEEP_SIZES: &[u64] = &[5_000, 25_000, 100_000];

/// Build a fresh book with `n_orders` resting sell orders.
/// Prices cycle over 10 levels above 100.00; sizes random 1-256.
fn setup_book(n_orders: usize) -> LimitOrderBook {
    let mut rng = StdRng::seed_from_u64(42);
    let mut book = LimitOrderBook::new(0.01);
    for i in 0..n_orders as u64 {
        let price = 100.0 + (i % 10) as f64 * 0.01;
        let size = rng.gen_range(1..=256);
        book.process(Order::limit(i, Side::Sell, price, size, 0.0));
    }
    book
}

pub fn bench_market_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_matching_scaling");

    for &n in BOOK_SIZES {
        group.throughput(Throughput::Elements(n as u64));

        for &sweep in SWEEP_SIZES {
            let id = BenchmarkId::from_parameter(format!("book_{}_sweep_{}", n, sweep));

            group.bench_function(id, |b| {
                // rebuild a fresh book each iteration
                b.iter_batched(
                    || setup_book(n),
                    |mut book| {
                        let events =
                            book.process(Order::market(u64::MAX, Side::Buy, black_box(sweep), 1.0));
                        black_box(events);
                    },
                    BatchSize::LargeInput,
                );
            });
        }
    }
    group.finish();
}

pub fn bench_cancel(c: &mut Criterion) {
    let mut group = c.benchmark_group("cancel_by_id");

    for &n in BOOK_SIZES {
        let id = BenchmarkId::from_parameter(format!("book_{}", n));
        group.bench_function(id, |b| {
            b.iter_batched(
                || setup_book(n),
                |mut book| {
                    // Cancel from the middle of the id range.
                    let events = book.process(Order::cancel(black_box(n as u64 / 2), 1.0));
                    black_box(events);
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_market_sweep, bench_cancel);
criterion_main!(benches);
