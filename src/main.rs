//! Breakout Futures Bot - Entry Point
//!
//! Loads configuration, wires the Binance adapters into the trading
//! loop, and runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Load .env, then config.toml (or `CONFIG_PATH`) + env overrides
//! 2. Init tracing (JSON structured logging)
//! 3. Load API credentials from env vars (API_KEY, API_SECRET)
//! 4. Create BinanceClient (HTTP + signing + retry + rate limit)
//! 5. Report wallet balance and set leverage
//! 6. Spawn health/metrics server if enabled
//! 7. Spawn TradingLoop (live or dry-run order port)
//! 8. Wait for SIGINT → broadcast shutdown → wait for loop

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use breakout_futures_bot::adapters::api::{
    ApiCredentials, BinanceAccount, BinanceClient, BinanceClientConfig, BinanceMarketData,
    BinanceOrderExecutor,
};
use breakout_futures_bot::adapters::dry_run::DryRunOrderExecutor;
use breakout_futures_bot::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use breakout_futures_bot::config::{self, AppConfig};
use breakout_futures_bot::ports::OrderPort;
use breakout_futures_bot::usecases::{TradingLoop, prepare_account};

/// Upper bound on waiting for an in-flight cycle at shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load .env and configuration ──────────────────────
    dotenvy::dotenv().ok();
    let config_path = std::env::var("CONFIG_PATH").ok();
    let config = config::loader::load_config(config_path.as_deref())
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.bot.log_level)),
        )
        .json()
        .init();
    config::loader::log_config_summary(&config);

    info!(
        name = %config.bot.name,
        version = env!("CARGO_PKG_VERSION"),
        symbol = %config.trading.symbol,
        interval = %config.trading.candle_interval,
        leverage = config.trading.leverage,
        notional = %config.trading.trade_size_notional,
        dry_run = config.bot.dry_run,
        "Starting breakout futures bot"
    );

    // ── 3. Load API credentials from env vars ───────────────
    let credentials = Arc::new(
        ApiCredentials::from_env().context("Failed to load Binance credentials from env")?,
    );

    // ── 4. Create Binance HTTP client and adapters ──────────
    let client = Arc::new(
        BinanceClient::new(credentials, BinanceClientConfig::from(&config.api))
            .context("Failed to create Binance client")?,
    );
    let market_data = Arc::new(BinanceMarketData::new(Arc::clone(&client)));
    let account = Arc::new(BinanceAccount::new(Arc::clone(&client)));

    // ── 5. One-time account preparation (non-fatal) ─────────
    prepare_account(account.as_ref(), &config.trading).await;

    // ── 6. Shutdown channel and health/metrics server ───────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let health = Arc::new(HealthState::new());

    let metrics = if config.metrics.enabled {
        let registry =
            Arc::new(MetricsRegistry::new().context("Failed to register Prometheus metrics")?);
        let server = HealthServer::new(
            Arc::clone(&health),
            Arc::clone(&registry),
            config.metrics.bind_address.clone(),
        );
        let server_shutdown = shutdown_tx.subscribe();
        tokio::spawn(async move {
            if let Err(e) = server.run(server_shutdown).await {
                error!(error = %e, "Health server failed");
            }
        });
        Some(registry)
    } else {
        None
    };

    // ── 7. Spawn trading loop ────────────────────────────────
    let loop_shutdown = shutdown_tx.subscribe();
    let loop_handle = if config.bot.dry_run {
        warn!("Dry-run mode, signals computed but NO real orders placed");
        spawn_loop(
            &config,
            market_data,
            account,
            Arc::new(DryRunOrderExecutor::new()),
            metrics,
            loop_shutdown,
        )
    } else {
        spawn_loop(
            &config,
            market_data,
            account,
            Arc::new(BinanceOrderExecutor::new(Arc::clone(&client))),
            metrics,
            loop_shutdown,
        )
    };
    health.set_ready(true);

    info!("All tasks spawned, bot is running");

    // ── 8. Wait for SIGINT ──────────────────────────────────
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for SIGINT, shutting down");
    } else {
        info!("SIGINT received, initiating graceful shutdown");
    }

    let _ = shutdown_tx.send(());
    health.set_ready(false);

    match tokio::time::timeout(SHUTDOWN_GRACE, loop_handle).await {
        Ok(Ok(cycles)) => info!(cycles, "Shutdown complete"),
        Ok(Err(e)) => error!(error = %e, "Trading loop task failed"),
        Err(_) => warn!(
            grace_secs = SHUTDOWN_GRACE.as_secs(),
            "Trading loop did not stop in time, exiting anyway"
        ),
    }

    Ok(())
}

/// Build the trading loop over the chosen order port and run it on
/// its own task.
fn spawn_loop<O: OrderPort>(
    config: &AppConfig,
    market_data: Arc<BinanceMarketData>,
    positions: Arc<BinanceAccount>,
    orders: Arc<O>,
    metrics: Option<Arc<MetricsRegistry>>,
    shutdown_rx: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<u64> {
    let mut trading_loop = TradingLoop::new(market_data, positions, orders, &config.trading);
    if let Some(registry) = metrics {
        trading_loop = trading_loop.with_metrics(registry);
    }
    tokio::spawn(async move { trading_loop.run(shutdown_rx).await })
}
