//! Virtual Price Oracle - Entry Point
//!
//! Loads configuration and the token registry, wires the quote sources
//! behind the price orchestrator and serves the refresh/snapshot HTTP
//! surface. Runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml (path from argv[1]) + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Load the token registry
//! 4. Create the shared HTTP client and the DexScreener/GeckoTerminal sources
//! 5. Create the orchestrator, snapshot store and refresh service; restore the last snapshot
//! 6. Spawn the HTTP server (/api/cron/update-prices, /api/prices, probes, /metrics)
//! 7. Optionally refresh on an interval
//! 8. Wait for SIGINT, then drain

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use virtual_price_oracle::adapters::http::{self, AppState, HealthState};
use virtual_price_oracle::adapters::metrics::MetricsRegistry;
use virtual_price_oracle::adapters::persistence::SnapshotStore;
use virtual_price_oracle::adapters::registry::load_registry;
use virtual_price_oracle::adapters::sources::{
    DexScreenerSource, GeckoTerminalSource, HttpClientConfig, HttpQuoteClient,
};
use virtual_price_oracle::config;
use virtual_price_oracle::ports::{PriceCache, QuoteSource};
use virtual_price_oracle::usecases::{PriceOrchestrator, RefreshError, RefreshService};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.service.log_level)
                }),
        )
        .json()
        .init();

    info!(
        name = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        reference = %config.reference.token_id,
        "Starting Virtual Price Oracle"
    );

    // ── 3. Token registry ───────────────────────────────────
    let tokens = load_registry(&config.registry.token_list_path, &config.registry.sheet)
        .context("Failed to load token registry")?;

    // ── 4. Quote sources, in fallback order ─────────────────
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);
    let client = Arc::new(
        HttpQuoteClient::new(&HttpClientConfig {
            timeout: config.providers.request_timeout(),
            max_concurrent: config.providers.max_concurrent,
        })
        .context("Failed to create HTTP client")?,
    );
    let sources: Vec<Arc<dyn QuoteSource>> = vec![
        Arc::new(DexScreenerSource::new(
            Arc::clone(&client),
            &config.providers.dexscreener_url,
        )),
        Arc::new(GeckoTerminalSource::new(
            Arc::clone(&client),
            &config.providers.geckoterminal_url,
        )),
    ];

    // ── 5. Orchestrator, cache, refresh service ─────────────
    let orchestrator = Arc::new(
        PriceOrchestrator::new(
            tokens,
            sources,
            &config.reference.token_id,
            Arc::clone(&metrics),
        )
        .with_fetch_timeout(config.providers.fetch_timeout())
        .with_max_concurrent(config.providers.max_concurrent),
    );
    let cache: Arc<dyn PriceCache> = Arc::new(
        SnapshotStore::new(&config.cache.data_dir)
            .await
            .context("Failed to open snapshot store")?,
    );
    let refresh = Arc::new(RefreshService::new(
        orchestrator,
        Arc::clone(&cache),
        &config.cache.key,
        Arc::clone(&metrics),
    ));
    if let Err(e) = refresh.restore().await {
        warn!(error = %e, "Could not restore last snapshot, starting empty");
    }
    let health = Arc::new(HealthState::new());

    // ── 6. HTTP server ──────────────────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

    let state = AppState {
        refresh: Arc::clone(&refresh),
        cache,
        metrics,
        health: Arc::clone(&health),
    };
    let server_shutdown = shutdown_tx.subscribe();
    let bind_address = config.service.bind_address.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = http::serve(bind_address, state, server_shutdown).await {
            error!(error = %e, "HTTP server failed");
        }
    });

    // ── 7. Optional self-triggered refresh ──────────────────
    let interval_handle = match config.service.refresh_interval_seconds {
        0 => None,
        secs => Some(tokio::spawn(refresh_loop(
            Arc::clone(&refresh),
            Duration::from_secs(secs),
            shutdown_tx.subscribe(),
        ))),
    };

    info!("All tasks spawned, oracle is running");

    // ── 8. Wait for SIGINT ──────────────────────────────────
    signal::ctrl_c()
        .await
        .context("Failed to listen for SIGINT")?;
    info!("SIGINT received, initiating graceful shutdown");

    health.begin_shutdown();
    let _ = shutdown_tx.send(());

    if let Some(handle) = interval_handle {
        let _ = tokio::time::timeout(Duration::from_secs(30), handle).await;
    }
    let _ = tokio::time::timeout(Duration::from_secs(5), server_handle).await;

    info!("Shutdown complete");
    Ok(())
}

/// Refresh the published snapshot every `period` until shutdown.
async fn refresh_loop(
    refresh: Arc<RefreshService>,
    period: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    info!(period_secs = period.as_secs(), "Interval refresh enabled");

    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                info!("Interval refresh stopped");
                break;
            }
            _ = ticker.tick() => {
                match refresh.refresh().await {
                    Ok(count) => info!(count, "Interval refresh published"),
                    Err(RefreshError::EmptySnapshot) => warn!("Interval refresh produced no prices"),
                    Err(e) => error!(error = %e, "Interval refresh failed"),
                }
            }
        }
    }
}
