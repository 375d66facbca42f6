//! Benchmarks for the pricing strategy hot paths
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal_macros::dec;

use amm_lp_oracle::pools::{NormalizedParams, NormalizedPool};
use amm_lp_oracle::strategies::compute_price_usd;
use amm_lp_oracle::{Address, EclpParams, StrategyKind};

fn addr(last_byte: u8) -> Address {
    Address::parse(&format!("0x{}{:02x}", "00".repeat(19), last_byte)).unwrap()
}

fn pool(params: NormalizedParams) -> NormalizedPool {
    NormalizedPool {
        assets: vec![addr(1), addr(2)],
        reserves: vec![dec!(1532.75), dec!(4098.2)],
        token_decimals: vec![18, 6],
        total_supply: dec!(1000),
        params,
    }
}

fn bench_constant_product(c: &mut Criterion) {
    let pool = pool(NormalizedParams::ConstantProduct);
    let prices = [dec!(1834.21), dec!(0.9998)];

    c.bench_function("constant_product_price", |b| {
        b.iter(|| {
            compute_price_usd(
                StrategyKind::ConstantProduct,
                black_box(&pool),
                black_box(&prices),
                false,
            )
            .unwrap()
        })
    });
}

fn bench_weighted(c: &mut Criterion) {
    let pool = pool(NormalizedParams::Weighted {
        weights: vec![dec!(0.8), dec!(0.2)],
    });
    let prices = [dec!(1834.21), dec!(0.9998)];

    c.bench_function("weighted_price", |b| {
        b.iter(|| {
            compute_price_usd(
                StrategyKind::Weighted,
                black_box(&pool),
                black_box(&prices),
                false,
            )
            .unwrap()
        })
    });
}

fn bench_eclp(c: &mut Criterion) {
    let pool = pool(NormalizedParams::Eclp(EclpParams {
        alpha: dec!(0.25),
        beta: dec!(4),
        c: dec!(0.70710678),
        s: dec!(0.70710678),
        lambda: dec!(10),
    }));
    let prices = [dec!(1.05), dec!(1)];

    c.bench_function("eclp_price", |b| {
        b.iter(|| {
            compute_price_usd(
                StrategyKind::ConcentratedLiquidity,
                black_box(&pool),
                black_box(&prices),
                false,
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_constant_product, bench_weighted, bench_eclp);
criterion_main!(benches);
