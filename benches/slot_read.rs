//! Benchmarks for price slot access

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pricefeed::feed::{FeedReading, FixedPriceFeed, PriceFeed, PriceSlot, ScaledFeed};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

fn benchmark_slot_price(c: &mut Criterion) {
    let slot = PriceSlot::new("bench", Duration::from_secs(120));
    slot.publish(FeedReading::observed_now(dec!(305.12)));

    c.bench_function("slot_price", |b| b.iter(|| black_box(slot.price())));
}

fn benchmark_slot_publish(c: &mut Criterion) {
    let slot = PriceSlot::new("bench", Duration::from_secs(120));

    c.bench_function("slot_publish", |b| {
        b.iter(|| slot.publish(black_box(FeedReading::observed_now(dec!(305.12)))))
    });
}

fn benchmark_scaled_price(c: &mut Criterion) {
    let base: Arc<dyn PriceFeed> = Arc::new(FixedPriceFeed::new(dec!(305.12)));
    let scale: Arc<dyn PriceFeed> = Arc::new(FixedPriceFeed::new(dec!(1.0012)));
    let feed = ScaledFeed::new(base, scale);

    c.bench_function("scaled_price", |b| b.iter(|| black_box(feed.get_price())));
}

criterion_group!(
    benches,
    benchmark_slot_price,
    benchmark_slot_publish,
    benchmark_scaled_price
);
criterion_main!(benches);
