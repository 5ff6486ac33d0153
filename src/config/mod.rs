//! Configuration Module - Layered Bot Configuration
//!
//! Built once at startup from three layers, later ones winning:
//! serde defaults, an optional `config.toml`, then environment
//! variables. The result is immutable and passed by reference; nothing
//! reads the environment after `loader::load_config` returns.
//!
//! Credentials are not part of this struct; see
//! `adapters::api::auth::ApiCredentials`.

pub mod loader;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::domain::breakout::DEFAULT_QUANTITY_PRECISION;
use crate::domain::candle::CandleInterval;

/// Top-level bot configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Bot identity and runtime switches.
  pub bot: BotConfig,
  /// Symbol and strategy parameters.
  pub trading: TradingConfig,
  /// Exchange REST endpoint settings.
  pub api: ApiConfig,
  /// Health and Prometheus endpoint.
  pub metrics: MetricsConfig,
}

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
  /// Human-readable bot name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
  pub log_level: String,
  /// Log orders instead of sending them.
  pub dry_run: bool,
}

impl Default for BotConfig {
  fn default() -> Self {
    Self {
      name: "breakout-futures-bot".to_string(),
      log_level: default_log_level(),
      dry_run: false,
    }
  }
}

/// Strategy parameters for the single traded symbol.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
  /// Futures symbol, e.g. `ETHUSDT`.
  pub symbol: String,
  /// Leverage applied at startup (1-125).
  pub leverage: u8,
  /// Quote-currency size of each entry.
  pub trade_size_notional: Decimal,
  /// Pause between cycles.
  pub sleep_seconds: u64,
  /// Band widening in percent (0.05 = 0.05 %).
  pub breakout_buffer_percent: Decimal,
  /// Number of candles in the window.
  pub candle_limit: u16,
  /// Candle interval.
  pub candle_interval: CandleInterval,
  /// Decimal places kept on order quantities.
  pub quantity_precision: u32,
  /// Asset whose wallet balance is reported at startup.
  pub quote_asset: String,
}

impl Default for TradingConfig {
  fn default() -> Self {
    Self {
      symbol: "ETHUSDT".to_string(),
      leverage: 10,
      trade_size_notional: dec!(10),
      sleep_seconds: 60,
      breakout_buffer_percent: dec!(0.05),
      candle_limit: 15,
      candle_interval: CandleInterval::OneMinute,
      quantity_precision: DEFAULT_QUANTITY_PRECISION,
      quote_asset: "USDT".to_string(),
    }
  }
}

impl TradingConfig {
  pub const fn sleep_interval(&self) -> std::time::Duration {
    std::time::Duration::from_secs(self.sleep_seconds)
  }
}

/// Exchange REST endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// USD-M futures REST base URL.
  pub base_url: String,
  /// Per-request timeout (milliseconds).
  pub timeout_ms: u64,
  /// `recvWindow` sent with signed requests (milliseconds).
  pub recv_window_ms: u64,
  /// Retries for idempotent GETs on transient errors.
  pub max_retries: u32,
  /// Base delay for exponential backoff (milliseconds).
  pub retry_base_delay_ms: u64,
  /// Client-side request budget.
  pub requests_per_minute: u32,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "https://fapi.binance.com".to_string(),
      timeout_ms: 10_000,
      recv_window_ms: 5_000,
      max_retries: 3,
      retry_base_delay_ms: 250,
      requests_per_minute: 600,
    }
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
  /// Serve `/live`, `/ready` and `/metrics`.
  pub enabled: bool,
  /// Bind address for the metrics server.
  pub bind_address: String,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: false,
      bind_address: default_metrics_addr(),
    }
  }
}

// Default value functions

fn default_log_level() -> String {
  "info".to_string()
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}
