//! Pricing Benchmarks - Per-record Hot Path
//!
//! Benchmarks the domain functions applied to every token on every run:
//! baseline reconstruction, record assembly and cross-rate conversion.
//!
//! Run with: cargo bench --bench pricing_bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use virtual_price_oracle::domain::baseline::derive_baseline;
use virtual_price_oracle::domain::price::{NormalizedQuote, PriceRecord, SourceRole};
use virtual_price_oracle::domain::token::{Token, DEFAULT_NETWORK};

fn foo() -> Token {
    Token {
        id: "foo".to_string(),
        symbol: "FOO".to_string(),
        name: "Foo".to_string(),
        network: DEFAULT_NETWORK.to_string(),
        pool_address: Some("0x1111111111111111111111111111111111111111".to_string()),
    }
}

/// Benchmark baseline derivation from a 24h change.
fn bench_derive_baseline(c: &mut Criterion) {
    c.bench_function("derive_baseline", |b| {
        b.iter(|| {
            let _p0 = derive_baseline(black_box(10.0), black_box(Some(-50.0)));
        });
    });
}

/// Benchmark building a record from a quote and converting it.
fn bench_record_cross_rate(c: &mut Criterion) {
    let token = foo();
    let quote = NormalizedQuote {
        price_usd: Some(10.0),
        percent_change: Some(-50.0),
        fully_diluted_value: Some(1_000_000.0),
    };

    c.bench_function("record_with_cross_rate", |b| {
        b.iter(|| {
            let Some(pool) = token.pool_ref() else { return };
            let _record = PriceRecord::from_quote(
                black_box(&token),
                &pool,
                SourceRole::Primary,
                "dexscreener",
                black_box(&quote),
            )
            .map(|r| r.with_cross_rate(black_box(2.0)));
        });
    });
}

criterion_group!(benches, bench_derive_baseline, bench_record_cross_rate);
criterion_main!(benches);
