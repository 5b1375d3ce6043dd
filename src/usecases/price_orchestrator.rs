//! Price Orchestrator - Reference-Anchored Price Run
//!
//! Produces the full price snapshot for one invocation:
//! 1. Resolves the reference token's USD price (strictly first)
//! 2. Fans out quote acquisition for every other token concurrently
//! 3. Converts reference-denominated quotes into USD via the cross-rate
//! 4. Assembles reference record + others in registry order
//!
//! A run never fails. Tokens without a usable quote are omitted, and a
//! missing reference price degrades the run to publishing raw pool quotes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tokio::sync::{Mutex, RwLock, Semaphore};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::metrics::MetricsRegistry;
use crate::domain::price::{Denomination, PriceRecord, SourceRole};
use crate::domain::token::{normalize_reference_id, PoolRef, Token};
use crate::ports::quote_source::{QuoteError, QuoteOutcome, QuoteSource};

/// Default upper bound for a single provider call.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Default bound on provider calls in flight at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// State of the most recent run.
#[derive(Debug, Default)]
struct RunState {
  /// Reference token USD price (0 until resolved).
  reference_price_usd: f64,
  /// Records assembled by the last run.
  records: Vec<PriceRecord>,
}

/// Orchestrates quote acquisition and cross-rate conversion.
pub struct PriceOrchestrator {
  /// Registry tokens, in registry order.
  tokens: Vec<Token>,
  /// Fallback chain, primary first.
  sources: Vec<Arc<dyn QuoteSource>>,
  /// Normalized reference token identifier.
  reference_id: String,
  /// Upper bound for a single provider call, excluding time queued for a permit.
  fetch_timeout: Duration,
  /// Bounds provider calls in flight across the whole run.
  limiter: Semaphore,
  /// Prometheus metrics.
  metrics: Arc<MetricsRegistry>,
  /// Result of the last run.
  state: RwLock<RunState>,
  /// Serializes runs so state resets never interleave.
  run_lock: Mutex<()>,
}

impl PriceOrchestrator {
  /// Create an orchestrator over `tokens` using `sources` as the fallback
  /// chain (primary first).
  pub fn new(
    tokens: Vec<Token>,
    sources: Vec<Arc<dyn QuoteSource>>,
    reference_id: &str,
    metrics: Arc<MetricsRegistry>,
  ) -> Self {
    Self {
      tokens,
      sources,
      reference_id: normalize_reference_id(reference_id),
      fetch_timeout: DEFAULT_FETCH_TIMEOUT,
      limiter: Semaphore::new(DEFAULT_MAX_CONCURRENT),
      metrics,
      state: RwLock::new(RunState::default()),
      run_lock: Mutex::new(()),
    }
  }

  /// Override the per-call timeout.
  pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
    self.fetch_timeout = fetch_timeout;
    self
  }

  /// Override the number of provider calls allowed in flight.
  pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
    self.limiter = Semaphore::new(max_concurrent.max(1));
    self
  }

  /// Serve `records` from `get_all` until the next run completes.
  ///
  /// Used at startup with the last published snapshot. The reference price
  /// is taken from the reference token's record when it is USD-denominated.
  pub async fn restore(&self, records: Vec<PriceRecord>) {
    let reference_price_usd = records
      .iter()
      .find(|r| {
        r.token_id.trim().eq_ignore_ascii_case(&self.reference_id)
          || r.symbol.trim().eq_ignore_ascii_case(&self.reference_id)
      })
      .filter(|r| r.denomination == Denomination::Usd)
      .map_or(0.0, |r| r.live_price);

    let mut state = self.state.write().await;
    state.reference_price_usd = reference_price_usd;
    state.records = records;
  }

  /// The most recently assembled snapshot, without re-fetching.
  pub async fn get_all(&self) -> Vec<PriceRecord> {
    self.state.read().await.records.clone()
  }

  /// Reference USD price resolved by the most recent run (0 if unresolved).
  pub async fn reference_price(&self) -> f64 {
    self.state.read().await.reference_price_usd
  }

  /// Run a full price fetch and return the assembled snapshot.
  #[instrument(skip(self), name = "price_run", fields(run_id = %Uuid::new_v4()))]
  pub async fn run(&self) -> Vec<PriceRecord> {
    let _run = self.run_lock.lock().await;
    let started = Instant::now();

    *self.state.write().await = RunState::default();

    info!(tokens = self.tokens.len(), "Starting price run");

    // Reference first: every other conversion depends on it.
    let mut records = Vec::with_capacity(self.tokens.len());
    let mut cross_rate = 0.0;
    let mut omitted = 0;

    match self.tokens.iter().find(|t| t.matches_reference(&self.reference_id)) {
      Some(reference) => match self.acquire(reference).await {
        Some(record) => {
          cross_rate = record.live_price;
          records.push(record);
        }
        None => {
          omitted += 1;
          warn!(
            reference = %reference.symbol,
            "Reference token unresolved, publishing pool-denominated prices"
          );
        }
      },
      None => warn!(
        reference = %self.reference_id,
        "Reference token not in registry, publishing pool-denominated prices"
      ),
    }

    let others: Vec<&Token> = self
      .tokens
      .iter()
      .filter(|t| !t.matches_reference(&self.reference_id))
      .collect();

    // join_all yields in input order, so registry order survives.
    let candidates = join_all(others.iter().map(|t| self.acquire(t))).await;
    omitted += candidates.iter().filter(|c| c.is_none()).count();

    records.extend(
      candidates
        .into_iter()
        .flatten()
        .map(|record| record.with_cross_rate(cross_rate)),
    );

    {
      let mut state = self.state.write().await;
      state.reference_price_usd = cross_rate;
      state.records.clone_from(&records);
    }

    let elapsed = started.elapsed();
    self
      .metrics
      .observe_run(elapsed, cross_rate, records.len(), omitted);

    info!(
      reference_price = cross_rate,
      records = records.len(),
      omitted,
      elapsed_ms = whole_millis(elapsed),
      "Price run complete"
    );

    records
  }

  /// Acquire one token's record from the first source with a usable quote.
  ///
  /// Tokens without a pool address are skipped silently.
  async fn acquire(&self, token: &Token) -> Option<PriceRecord> {
    let Some(pool) = token.pool_ref() else {
      debug!(token = %token.id, "No pool address, skipping");
      return None;
    };

    for (rank, source) in self.sources.iter().enumerate() {
      let role = SourceRole::from_rank(rank);

      match self.query(source.as_ref(), &pool).await {
        QuoteOutcome::Quote(quote) => {
          self.metrics.quotes.with_label_values(&[source.name()]).inc();
          if let Some(record) = PriceRecord::from_quote(token, &pool, role, source.name(), &quote) {
            return Some(record);
          }
        }
        QuoteOutcome::NoData => {
          debug!(token = %token.symbol, source = source.name(), "No data");
        }
        QuoteOutcome::Failed(e) => {
          self
            .metrics
            .quote_failures
            .with_label_values(&[source.name()])
            .inc();
          warn!(token = %token.symbol, source = source.name(), error = %e, "Quote source failed");
        }
      }
    }

    None
  }

  /// Ask a single source, bounded by the fetch timeout.
  ///
  /// The permit is taken before the clock starts, so time spent queued
  /// behind other calls never counts against this one.
  async fn query(&self, source: &dyn QuoteSource, pool: &PoolRef<'_>) -> QuoteOutcome {
    let Ok(_permit) = self.limiter.acquire().await else {
      return QuoteOutcome::Failed(QuoteError::Http {
        provider: source.name().to_string(),
        message: "request limiter closed".to_string(),
      });
    };

    let fetch = source.fetch_quote(pool.network, pool.pool_address, pool.symbol);

    match tokio::time::timeout(self.fetch_timeout, fetch).await {
      Ok(result) => QuoteOutcome::from(result),
      Err(_) => QuoteOutcome::Failed(QuoteError::Timeout {
        provider: source.name().to_string(),
        after_ms: whole_millis(self.fetch_timeout),
      }),
    }
  }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
fn whole_millis(duration: Duration) -> u64 {
  u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
