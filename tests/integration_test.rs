//! Integration Tests - End-to-end Oracle Component Testing
//!
//! Tests the interaction between usecases, ports, and mock adapters.
//! Uses mockall for trait mocking and tokio::test for async tests.

use std::sync::Arc;

use mockall::mock;
use mockall::predicate::*;

use virtual_price_oracle::adapters::metrics::MetricsRegistry;
use virtual_price_oracle::domain::price::{Denomination, NormalizedQuote, PriceRecord, SourceRole};
use virtual_price_oracle::domain::token::{Token, DEFAULT_NETWORK};
use virtual_price_oracle::ports::price_cache::PriceCache;
use virtual_price_oracle::ports::quote_source::{QuoteError, QuoteSource};
use virtual_price_oracle::usecases::{PriceOrchestrator, RefreshError, RefreshService};

// ---- Mock Definitions ----

mock! {
    pub Source {}

    #[async_trait::async_trait]
    impl QuoteSource for Source {
        fn name(&self) -> &'static str;

        async fn fetch_quote(
            &self,
            network: &str,
            pool_address: &str,
            symbol: &str,
        ) -> Result<Option<NormalizedQuote>, QuoteError>;
    }
}

mock! {
    pub Cache {}

    #[async_trait::async_trait]
    impl PriceCache for Cache {
        async fn store(&self, key: &str, records: &[PriceRecord]) -> anyhow::Result<()>;
        async fn load(&self, key: &str) -> anyhow::Result<Option<Vec<PriceRecord>>>;
        async fn is_healthy(&self) -> bool;
    }
}

// ---- Fixtures ----

const VIRTUAL_POOL: &str = "0x0b3e328455c4059eeb9e3743215830db5a980191";
const FOO_POOL: &str = "0x1111111111111111111111111111111111111111";

fn token(id: &str, symbol: &str, pool: Option<&str>) -> Token {
    Token {
        id: id.to_string(),
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        network: DEFAULT_NETWORK.to_string(),
        pool_address: pool.map(str::to_string),
    }
}

fn registry() -> Vec<Token> {
    vec![
        token("virtual", "VIRTUAL", Some(VIRTUAL_POOL)),
        token("foo", "FOO", Some(FOO_POOL)),
    ]
}

fn quote(price: f64, change: f64, fdv: f64) -> NormalizedQuote {
    NormalizedQuote {
        price_usd: Some(price),
        percent_change: Some(change),
        fully_diluted_value: Some(fdv),
    }
}

fn named(name: &'static str) -> MockSource {
    let mut source = MockSource::new();
    source.expect_name().return_const(name);
    source
}

fn orchestrator(tokens: Vec<Token>, primary: MockSource, secondary: MockSource) -> PriceOrchestrator {
    let sources: Vec<Arc<dyn QuoteSource>> = vec![Arc::new(primary), Arc::new(secondary)];
    PriceOrchestrator::new(tokens, sources, "virtual", Arc::new(MetricsRegistry::new().unwrap()))
}

fn find<'a>(records: &'a [PriceRecord], symbol: &str) -> &'a PriceRecord {
    records
        .iter()
        .find(|r| r.symbol == symbol)
        .unwrap_or_else(|| panic!("no record for {symbol}"))
}

// ---- Integration Tests ----

#[tokio::test]
async fn test_reference_anchored_snapshot() {
    let mut primary = named("dexscreener");
    primary
        .expect_fetch_quote()
        .with(eq(DEFAULT_NETWORK), eq(VIRTUAL_POOL), eq("VIRTUAL"))
        .times(1)
        .returning(|_, _, _| Ok(Some(quote(2.0, 25.0, 1_000.0))));
    primary
        .expect_fetch_quote()
        .with(eq(DEFAULT_NETWORK), eq(FOO_POOL), eq("FOO"))
        .times(1)
        .returning(|_, _, _| Ok(Some(quote(10.0, -50.0, 500.0))));

    let mut secondary = named("geckoterminal");
    secondary.expect_fetch_quote().never();

    let oracle = orchestrator(registry(), primary, secondary);
    let records = oracle.run().await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].symbol, "VIRTUAL");

    let virtual_token = find(&records, "VIRTUAL");
    assert!((virtual_token.live_price - 2.0).abs() < 1e-9);
    assert!((virtual_token.baseline_price - 1.6).abs() < 1e-9);
    assert!((virtual_token.fully_diluted_value - 1_000.0).abs() < 1e-9);

    let foo = find(&records, "FOO");
    assert!((foo.live_price - 20.0).abs() < 1e-9);
    assert!((foo.baseline_price - 40.0).abs() < 1e-9);
    assert!((foo.fully_diluted_value - 1_000.0).abs() < 1e-9);
    assert_eq!(foo.source_name, SourceRole::Primary);
    assert_eq!(foo.provider, "dexscreener");
    assert_eq!(foo.denomination, Denomination::Usd);

    assert!((oracle.reference_price().await - 2.0).abs() < 1e-9);
    assert_eq!(oracle.get_all().await, records);
}

#[tokio::test]
async fn test_reference_failure_publishes_raw_values() {
    let mut primary = named("dexscreener");
    primary
        .expect_fetch_quote()
        .with(always(), eq(VIRTUAL_POOL), always())
        .returning(|_, _, _| {
            Err(QuoteError::Status {
                provider: "dexscreener".to_string(),
                status: 502,
            })
        });
    primary
        .expect_fetch_quote()
        .with(always(), eq(FOO_POOL), always())
        .returning(|_, _, _| Ok(Some(quote(10.0, -50.0, 0.0))));

    let mut secondary = named("geckoterminal");
    secondary
        .expect_fetch_quote()
        .with(always(), eq(VIRTUAL_POOL), always())
        .returning(|_, _, _| Ok(None));

    let oracle = orchestrator(registry(), primary, secondary);
    let records = oracle.run().await;

    assert_eq!(records.len(), 1);
    assert!(records.iter().all(|r| r.symbol != "VIRTUAL"));
    assert!((records[0].live_price - 10.0).abs() < 1e-9);
    assert!((records[0].baseline_price - 20.0).abs() < 1e-9);
    assert_eq!(records[0].denomination, Denomination::Reference);
    assert_eq!(oracle.reference_price().await, 0.0);
}

#[tokio::test]
async fn test_primary_error_falls_back_to_secondary() {
    let mut primary = named("dexscreener");
    primary
        .expect_fetch_quote()
        .with(always(), eq(VIRTUAL_POOL), always())
        .returning(|_, _, _| Ok(Some(quote(2.0, 0.0, 0.0))));
    primary
        .expect_fetch_quote()
        .with(always(), eq(FOO_POOL), always())
        .returning(|_, _, _| {
            Err(QuoteError::Http {
                provider: "dexscreener".to_string(),
                message: "connection reset".to_string(),
            })
        });

    let mut secondary = named("geckoterminal");
    secondary
        .expect_fetch_quote()
        .with(always(), eq(FOO_POOL), eq("FOO"))
        .times(1)
        .returning(|_, _, _| Ok(Some(quote(3.0, 50.0, 9_999.0))));

    let oracle = orchestrator(registry(), primary, secondary);
    let records = oracle.run().await;

    let foo = find(&records, "FOO");
    assert_eq!(foo.source_name, SourceRole::Secondary);
    assert_eq!(foo.provider, "geckoterminal");
    assert_eq!(foo.fully_diluted_value, 0.0);
    assert!((foo.live_price - 6.0).abs() < 1e-9);
    assert!((foo.baseline_price - 4.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_unquotable_tokens_are_omitted() {
    let tokens = vec![
        token("virtual", "VIRTUAL", Some(VIRTUAL_POOL)),
        token("nopool", "NOPOOL", None),
        token("foo", "FOO", Some(FOO_POOL)),
    ];

    let mut primary = named("dexscreener");
    primary
        .expect_fetch_quote()
        .with(always(), eq(VIRTUAL_POOL), always())
        .returning(|_, _, _| Ok(Some(quote(2.0, 0.0, 0.0))));
    primary
        .expect_fetch_quote()
        .with(always(), eq(FOO_POOL), always())
        .returning(|_, _, _| Ok(None));

    let mut secondary = named("geckoterminal");
    secondary
        .expect_fetch_quote()
        .with(always(), eq(FOO_POOL), always())
        .returning(|_, _, _| Ok(Some(NormalizedQuote::default())));

    let oracle = orchestrator(tokens, primary, secondary);
    let records = oracle.run().await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].symbol, "VIRTUAL");
}

#[tokio::test]
async fn test_refresh_publishes_snapshot() {
    let mut primary = named("dexscreener");
    primary
        .expect_fetch_quote()
        .returning(|_, _, _| Ok(Some(quote(2.0, 0.0, 0.0))));
    let secondary = named("geckoterminal");

    let mut cache = MockCache::new();
    cache
        .expect_store()
        .withf(|key, records| key == "GLOBAL_PRICE_CACHE" && records.len() == 2)
        .times(1)
        .returning(|_, _| Ok(()));

    let metrics = Arc::new(MetricsRegistry::new().unwrap());
    let service = RefreshService::new(
        Arc::new(orchestrator(registry(), primary, secondary)),
        Arc::new(cache),
        "GLOBAL_PRICE_CACHE",
        metrics,
    );

    assert_eq!(service.refresh().await.unwrap(), 2);
}

#[tokio::test]
async fn test_refresh_refuses_empty_snapshot() {
    let mut primary = named("dexscreener");
    primary.expect_fetch_quote().returning(|_, _, _| Ok(None));
    let mut secondary = named("geckoterminal");
    secondary.expect_fetch_quote().returning(|_, _, _| Ok(None));

    let mut cache = MockCache::new();
    cache.expect_store().never();

    let service = RefreshService::new(
        Arc::new(orchestrator(registry(), primary, secondary)),
        Arc::new(cache),
        "GLOBAL_PRICE_CACHE",
        Arc::new(MetricsRegistry::new().unwrap()),
    );

    let err = service.refresh().await.unwrap_err();
    assert!(matches!(err, RefreshError::EmptySnapshot));
    assert_eq!(err.to_string(), "No prices fetched, skipping update.");
}

#[tokio::test]
async fn test_refresh_surfaces_cache_failure() {
    let mut primary = named("dexscreener");
    primary
        .expect_fetch_quote()
        .returning(|_, _, _| Ok(Some(quote(2.0, 0.0, 0.0))));

    let mut cache = MockCache::new();
    cache
        .expect_store()
        .returning(|_, _| Err(anyhow::anyhow!("disk full")));

    let service = RefreshService::new(
        Arc::new(orchestrator(registry(), primary, named("geckoterminal"))),
        Arc::new(cache),
        "GLOBAL_PRICE_CACHE",
        Arc::new(MetricsRegistry::new().unwrap()),
    );

    assert!(matches!(service.refresh().await, Err(RefreshError::Publish(_))));
}
