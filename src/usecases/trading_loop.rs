//! Trading Loop - Polling Breakout Cycle
//!
//! The main use case. Every cycle:
//! 1. Fetches a fresh candle window via `MarketDataPort`
//! 2. Fetches the open position via `PositionPort`
//! 3. Evaluates the breakout band with `BreakoutEngine`
//! 4. Submits a market order via `OrderPort` if flat and broken out
//! 5. Sleeps for the configured interval, whatever happened above
//!
//! Steps run strictly in order and cycles never overlap. Any failure
//! ends the current cycle only; the loop itself stops only on the
//! shutdown signal.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{error, info, instrument, warn};

use crate::adapters::metrics::MetricsRegistry;
use crate::config::TradingConfig;
use crate::domain::breakout::{BreakoutEngine, BreakoutThresholds, NoActionReason, TradeDecision};
use crate::domain::candle::{CandleInterval, CandleWindow};
use crate::domain::trade::{OrderConfirmation, OrderRequest, PositionState, TradeSide};
use crate::error::CycleError;
use crate::ports::market_data::MarketDataPort;
use crate::ports::order::OrderPort;
use crate::ports::position::PositionPort;

/// How a cycle that ran to completion ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
  /// Evaluated, nothing to do.
  Held {
    reason: NoActionReason,
    position: PositionState,
  },
  /// An entry order was acknowledged.
  OrderPlaced(OrderConfirmation),
}

impl CycleOutcome {
  /// Short label used as a metrics dimension.
  pub const fn label(&self) -> &'static str {
    match self {
      Self::Held { reason, .. } => reason.as_str(),
      Self::OrderPlaced(_) => "order_placed",
    }
  }
}

/// Immutable per-loop settings, copied out of `TradingConfig` once.
#[derive(Debug, Clone)]
struct LoopSettings {
  symbol: String,
  interval: CandleInterval,
  candle_limit: u16,
  sleep: Duration,
}

/// Polling breakout loop over the three exchange ports.
pub struct TradingLoop<M: MarketDataPort, P: PositionPort, O: OrderPort> {
  /// Candle source.
  market_data: Arc<M>,
  /// Position source.
  positions: Arc<P>,
  /// Order sink.
  orders: Arc<O>,
  /// Pure decision logic.
  engine: BreakoutEngine,
  /// Symbol, window and cadence.
  settings: LoopSettings,
  /// Optional Prometheus sink.
  metrics: Option<Arc<MetricsRegistry>>,
}

impl<M: MarketDataPort, P: PositionPort, O: OrderPort> TradingLoop<M, P, O> {
  /// Create a new trading loop.
  pub fn new(
    market_data: Arc<M>,
    positions: Arc<P>,
    orders: Arc<O>,
    config: &TradingConfig,
  ) -> Self {
    Self {
      market_data,
      positions,
      orders,
      engine: BreakoutEngine::new(
        config.breakout_buffer_percent,
        config.trade_size_notional,
        config.quantity_precision,
      ),
      settings: LoopSettings {
        symbol: config.symbol.clone(),
        interval: config.candle_interval,
        candle_limit: config.candle_limit,
        sleep: config.sleep_interval(),
      },
      metrics: None,
    }
  }

  /// Record cycle outcomes into `metrics`.
  #[must_use]
  pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
    self.metrics = Some(metrics);
    self
  }

  /// Run cycles until the shutdown signal fires.
  ///
  /// The signal is checked before every cycle and raced against the
  /// sleep, so shutdown never interrupts a cycle half way through an
  /// order submission. Returns the number of cycles run.
  #[instrument(skip(self, shutdown_rx), name = "trading_loop", fields(symbol = %self.settings.symbol))]
  pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> u64 {
    info!(
      interval = %self.settings.interval,
      candles = self.settings.candle_limit,
      sleep_secs = self.settings.sleep.as_secs(),
      buffer_pct = %self.engine.buffer_percent(),
      notional = %self.engine.notional(),
      "Starting trading loop"
    );

    let mut cycles = 0u64;

    loop {
      if shutdown_requested(&mut shutdown_rx) {
        info!("Shutdown signal received, stopping before next cycle");
        break;
      }

      cycles += 1;
      let started = Instant::now();
      let result = self.guarded_cycle().await;
      self.report(cycles, &result, started.elapsed());

      tokio::select! {
        biased;
        _ = shutdown_rx.recv() => {
          info!("Shutdown signal received, stopping trading loop");
          break;
        }
        () = tokio::time::sleep(self.settings.sleep) => {}
      }
    }

    info!(cycles, "Trading loop stopped");
    cycles
  }

  /// One cycle behind an unwind boundary: a panic becomes an
  /// `Unclassified` error instead of killing the loop.
  async fn guarded_cycle(&self) -> Result<CycleOutcome, CycleError> {
    match AssertUnwindSafe(self.run_cycle()).catch_unwind().await {
      Ok(result) => result,
      Err(panic) => Err(CycleError::Unclassified {
        symbol: self.settings.symbol.clone(),
        message: panic_message(panic.as_ref()),
      }),
    }
  }

  /// Run a single fetch → decide → submit cycle.
  #[instrument(skip(self), fields(symbol = %self.settings.symbol))]
  pub async fn run_cycle(&self) -> Result<CycleOutcome, CycleError> {
    let symbol = &self.settings.symbol;

    // 1. Candles
    let candles = self
      .market_data
      .fetch_candles(symbol, self.settings.interval, self.settings.candle_limit)
      .await
      .map_err(|source| CycleError::MarketData {
        symbol: symbol.clone(),
        source,
      })?;
    let window = CandleWindow::new(candles).map_err(|_| CycleError::EmptyWindow {
      symbol: symbol.clone(),
    })?;

    let band = BreakoutThresholds::from_window(&window, self.engine.buffer_percent());
    info!(
      price = %window.last_close(),
      high = %window.max_high(),
      low = %window.min_low(),
      long_breakout = %band.long,
      short_breakout = %band.short,
      "Market snapshot"
    );

    // 2. Position (unknown is never treated as flat)
    let position = self
      .positions
      .fetch_position(symbol)
      .await
      .map_err(|source| CycleError::Position {
        symbol: symbol.clone(),
        source,
      })?;

    // 3. Decide
    let evaluation = self.engine.evaluate(&window, &position);
    if let Some(metrics) = &self.metrics {
      metrics.observe_evaluation(&evaluation, &position);
    }

    info!(position = %position, decision = ?evaluation.decision, "Evaluated breakout");

    // 4. Submit
    let (side, quantity) = match evaluation.decision {
      TradeDecision::NoAction(reason) => {
        match reason {
          NoActionReason::PositionOpen => {
            info!(position = %position, "Open position, no new trade");
          }
          NoActionReason::WithinBand => info!("No breakout detected, waiting for next cycle"),
          NoActionReason::QuantityRoundsToZero => warn!(
            price = %evaluation.current_price,
            notional = %self.engine.notional(),
            "Breakout detected but order quantity rounds to zero, skipping"
          ),
        }
        return Ok(CycleOutcome::Held { reason, position });
      }
      TradeDecision::EnterLong { quantity } => {
        info!(threshold = %evaluation.thresholds.long, "Long breakout detected");
        (TradeSide::Buy, quantity)
      }
      TradeDecision::EnterShort { quantity } => {
        info!(threshold = %evaluation.thresholds.short, "Short breakout detected");
        (TradeSide::Sell, quantity)
      }
    };

    let request = OrderRequest::market(symbol.clone(), side, quantity);
    let confirmation = self
      .orders
      .submit_market_order(&request)
      .await
      .map_err(|source| CycleError::OrderSubmission {
        symbol: symbol.clone(),
        side,
        source,
      })?;

    if let Some(metrics) = &self.metrics {
      metrics.record_order(side);
    }
    info!(
      side = %side,
      quantity = %quantity,
      order_id = %confirmation.order_id,
      client_order_id = %confirmation.client_order_id,
      status = %confirmation.status,
      "Placed market order"
    );

    Ok(CycleOutcome::OrderPlaced(confirmation))
  }

  /// Log a finished cycle and feed metrics.
  fn report(&self, cycle: u64, result: &Result<CycleOutcome, CycleError>, elapsed: Duration) {
    let label = match result {
      Ok(outcome) => outcome.label(),
      Err(e) => {
        match e {
          CycleError::MarketData { .. } | CycleError::EmptyWindow { .. } => warn!(
            cycle,
            operation = e.operation(),
            error = %e,
            "Failed to fetch candles, retrying next cycle"
          ),
          CycleError::Position { .. } => warn!(
            cycle,
            operation = e.operation(),
            error = %e,
            "Position unknown, skipping trade this cycle"
          ),
          CycleError::OrderSubmission { .. } => error!(
            cycle,
            operation = e.operation(),
            error = %e,
            "Order failed"
          ),
          CycleError::Unclassified { .. } => error!(
            cycle,
            operation = e.operation(),
            error = %e,
            "Unhandled failure in trading cycle"
          ),
        }
        e.kind()
      }
    };

    if let Some(metrics) = &self.metrics {
      metrics.record_cycle(label, elapsed);
    }
  }
}

/// Non-blocking check of the shutdown channel. A closed or lagged
/// channel counts as a shutdown request.
fn shutdown_requested(rx: &mut broadcast::Receiver<()>) -> bool {
  !matches!(rx.try_recv(), Err(TryRecvError::Empty))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
  panic
    .downcast_ref::<&str>()
    .map(|s| (*s).to_string())
    .or_else(|| panic.downcast_ref::<String>().cloned())
    .unwrap_or_else(|| "non-string panic payload".to_string())
}
