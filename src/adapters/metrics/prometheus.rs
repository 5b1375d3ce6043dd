//! Prometheus Metrics Registry - Oracle Observability
//!
//! Registers the oracle's Prometheus metrics and renders them in the
//! text exposition format for the `/metrics` endpoint. Covers per-source
//! quote outcomes, run latency, the resolved cross-rate and snapshot size.

use std::time::Duration;

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

/// Centralized Prometheus metrics for the price oracle.
///
/// All metrics follow the naming convention `price_oracle_*`. Each
/// instance owns its own registry, so tests can build as many as they like.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Usable quotes received, by provider.
    pub quotes: IntCounterVec,
    /// Failed provider calls (transport, status, decode, timeout), by provider.
    pub quote_failures: IntCounterVec,
    /// Tokens that produced no record in a run.
    pub tokens_omitted: IntCounter,
    /// Wall-clock duration of a full orchestrator run.
    pub run_duration_seconds: Histogram,
    /// Reference token USD price resolved by the last run (0 = unresolved).
    pub reference_price_usd: Gauge,
    /// Records assembled by the last run.
    pub records: IntGauge,
    /// 1 when the last run published reference-denominated prices.
    pub degraded: IntGauge,
    /// Refresh attempts, by outcome (published, empty, error).
    pub refreshes: IntCounterVec,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let quotes = IntCounterVec::new(
            Opts::new("price_oracle_quotes_total", "Usable quotes received"),
            &["source"],
        )?;

        let quote_failures = IntCounterVec::new(
            Opts::new(
                "price_oracle_quote_failures_total",
                "Provider calls that failed",
            ),
            &["source"],
        )?;

        let tokens_omitted = IntCounter::new(
            "price_oracle_tokens_omitted_total",
            "Tokens without a usable quote in a run",
        )?;

        let run_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "price_oracle_run_duration_seconds",
                "Duration of a full price run",
            )
            .buckets(vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;

        let reference_price_usd = Gauge::new(
            "price_oracle_reference_price_usd",
            "Resolved USD price of the reference token",
        )?;

        let records = IntGauge::new(
            "price_oracle_records",
            "Records assembled by the last run",
        )?;

        let degraded = IntGauge::new(
            "price_oracle_degraded",
            "Whether the last run lacked a reference price (1=yes, 0=no)",
        )?;

        let refreshes = IntCounterVec::new(
            Opts::new("price_oracle_refreshes_total", "Snapshot refresh attempts"),
            &["outcome"],
        )?;

        registry.register(Box::new(quotes.clone()))?;
        registry.register(Box::new(quote_failures.clone()))?;
        registry.register(Box::new(tokens_omitted.clone()))?;
        registry.register(Box::new(run_duration_seconds.clone()))?;
        registry.register(Box::new(reference_price_usd.clone()))?;
        registry.register(Box::new(records.clone()))?;
        registry.register(Box::new(degraded.clone()))?;
        registry.register(Box::new(refreshes.clone()))?;

        Ok(Self {
            registry,
            quotes,
            quote_failures,
            tokens_omitted,
            run_duration_seconds,
            reference_price_usd,
            records,
            degraded,
            refreshes,
        })
    }

    /// Record the summary of a finished run.
    pub fn observe_run(&self, elapsed: Duration, reference_price: f64, records: usize, omitted: usize) {
        self.run_duration_seconds.observe(elapsed.as_secs_f64());
        self.reference_price_usd.set(reference_price);
        self.records.set(i64::try_from(records).unwrap_or(i64::MAX));
        self.degraded.set(i64::from(reference_price <= 0.0));
        self.tokens_omitted.inc_by(omitted as u64);
    }

    /// Render all metrics in the Prometheus text format.
    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_contains_registered_metrics() {
        let metrics = MetricsRegistry::new().unwrap();
        metrics.quotes.with_label_values(&["dexscreener"]).inc();
        metrics.observe_run(Duration::from_millis(120), 1.25, 3, 1);

        let text = metrics.encode().unwrap();
        assert!(text.contains("price_oracle_quotes_total{source=\"dexscreener\"} 1"));
        assert!(text.contains("price_oracle_reference_price_usd 1.25"));
        assert!(text.contains("price_oracle_records 3"));
        assert!(text.contains("price_oracle_degraded 0"));
        assert!(text.contains("price_oracle_tokens_omitted_total 1"));
    }

    #[test]
    fn test_unresolved_reference_marks_degraded() {
        let metrics = MetricsRegistry::new().unwrap();
        metrics.observe_run(Duration::from_millis(5), 0.0, 2, 0);
        assert_eq!(metrics.degraded.get(), 1);
    }
}
