//! Prometheus Metrics Registry - Trading Loop Observability
//!
//! Registers the `breakout_bot_*` metrics and renders them in text
//! exposition format for the `/metrics` endpoint. Covers cycle
//! outcomes and latency, orders, the latest price and band, and the
//! position the exchange last reported.

use std::time::Duration;

use prometheus::{
    Encoder, Gauge, GaugeVec, Histogram, HistogramOpts, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::domain::breakout::Evaluation;
use crate::domain::trade::{PositionState, TradeSide};

/// Centralized Prometheus metrics for the bot.
///
/// All metrics follow the naming convention `breakout_bot_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Completed cycles by outcome label.
    pub cycles: IntCounterVec,
    /// Cycle wall time, excluding the inter-cycle sleep.
    pub cycle_duration: Histogram,
    /// Orders acknowledged by the order port, by side.
    pub orders_submitted: IntCounterVec,
    /// Last close seen by the engine.
    pub last_price: Gauge,
    /// Long/short breakout thresholds.
    pub thresholds: GaugeVec,
    /// Signed position amount last reported by the exchange.
    pub position_amount: Gauge,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let cycles = IntCounterVec::new(
            Opts::new("breakout_bot_cycles_total", "Trading cycles by outcome"),
            &["outcome"],
        )?;

        let cycle_duration = Histogram::with_opts(
            HistogramOpts::new(
                "breakout_bot_cycle_duration_seconds",
                "Time spent in one trading cycle",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;

        let orders_submitted = IntCounterVec::new(
            Opts::new("breakout_bot_orders_submitted_total", "Market orders submitted"),
            &["side"],
        )?;

        let last_price = Gauge::new("breakout_bot_last_price", "Latest close price")?;

        let thresholds = GaugeVec::new(
            Opts::new("breakout_bot_threshold", "Breakout threshold price"),
            &["direction"],
        )?;

        let position_amount = Gauge::new(
            "breakout_bot_position_amount",
            "Signed open position amount (0 = flat)",
        )?;

        // Register all metrics
        registry.register(Box::new(cycles.clone()))?;
        registry.register(Box::new(cycle_duration.clone()))?;
        registry.register(Box::new(orders_submitted.clone()))?;
        registry.register(Box::new(last_price.clone()))?;
        registry.register(Box::new(thresholds.clone()))?;
        registry.register(Box::new(position_amount.clone()))?;

        Ok(Self {
            registry,
            cycles,
            cycle_duration,
            orders_submitted,
            last_price,
            thresholds,
            position_amount,
        })
    }

    /// Count one finished cycle.
    pub fn record_cycle(&self, outcome: &str, elapsed: Duration) {
        self.cycles.with_label_values(&[outcome]).inc();
        self.cycle_duration.observe(elapsed.as_secs_f64());
    }

    pub fn record_order(&self, side: TradeSide) {
        self.orders_submitted.with_label_values(&[side.as_str()]).inc();
    }

    /// Publish the snapshot the engine computed.
    pub fn observe_evaluation(&self, evaluation: &Evaluation, position: &PositionState) {
        self.last_price.set(to_f64(evaluation.current_price));
        self.thresholds
            .with_label_values(&["long"])
            .set(to_f64(evaluation.thresholds.long));
        self.thresholds
            .with_label_values(&["short"])
            .set(to_f64(evaluation.thresholds.short));
        self.position_amount.set(to_f64(position.signed_amount()));
    }

    /// Render all metrics in Prometheus text format.
    pub fn encode(&self) -> String {
        let mut buffer = Vec::new();
        if TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .is_err()
        {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}
