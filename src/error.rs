//! Error taxonomy.
//!
//! - `ConfigError`: fatal, raised before the trading loop starts.
//! - `ExchangeError`: what every port operation returns on failure.
//! - `CycleError`: one failed trading cycle; logged and survived.

use thiserror::Error;

use crate::domain::trade::TradeSide;

/// Configuration could not be loaded or is invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config file: {0}")]
  Parse(#[from] toml::de::Error),

  #[error("{0} is not set")]
  MissingCredential(&'static str),

  #[error("invalid value {value:?} for {key}: {reason}")]
  InvalidValue {
    key: &'static str,
    value: String,
    reason: String,
  },

  #[error("invalid configuration: {0}")]
  Invalid(String),
}

/// Failure talking to the exchange.
#[derive(Debug, Error)]
pub enum ExchangeError {
  /// Connection, TLS or timeout failure before a response arrived.
  #[error("transport error: {0}")]
  Transport(String),

  /// Exchange returned a structured error body.
  #[error("exchange error {code}: {message}")]
  Api { code: i64, message: String },

  /// HTTP 429 / 418 from the exchange.
  #[error("rate limited by exchange (HTTP {status})")]
  RateLimited { status: u16 },

  /// Non-success status without a parseable error body.
  #[error("HTTP {status}: {body}")]
  Http { status: u16, body: String },

  /// Response body did not have the expected shape.
  #[error("malformed response: {0}")]
  Decode(String),
}

impl ExchangeError {
  /// Worth retrying an idempotent request after this error.
  pub const fn is_transient(&self) -> bool {
    match self {
      Self::Transport(_) | Self::RateLimited { .. } => true,
      Self::Http { status, .. } => *status >= 500,
      Self::Api { .. } | Self::Decode(_) => false,
    }
  }
}

impl From<reqwest::Error> for ExchangeError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_decode() {
      Self::Decode(e.to_string())
    } else {
      Self::Transport(e.to_string())
    }
  }
}

/// A trading cycle that ended early.
#[derive(Debug, Error)]
pub enum CycleError {
  #[error("fetching candles for {symbol} failed: {source}")]
  MarketData {
    symbol: String,
    #[source]
    source: ExchangeError,
  },

  #[error("exchange returned no candles for {symbol}")]
  EmptyWindow { symbol: String },

  #[error("fetching position for {symbol} failed: {source}")]
  Position {
    symbol: String,
    #[source]
    source: ExchangeError,
  },

  #[error("submitting {side} market order for {symbol} failed: {source}")]
  OrderSubmission {
    symbol: String,
    side: TradeSide,
    #[source]
    source: ExchangeError,
  },

  #[error("unexpected failure in cycle for {symbol}: {message}")]
  Unclassified { symbol: String, message: String },
}

impl CycleError {
  /// Port operation that failed, for log context.
  pub const fn operation(&self) -> &'static str {
    match self {
      Self::MarketData { .. } | Self::EmptyWindow { .. } => "fetch_candles",
      Self::Position { .. } => "fetch_position",
      Self::OrderSubmission { .. } => "submit_market_order",
      Self::Unclassified { .. } => "cycle",
    }
  }

  /// Short label used as a metrics dimension.
  pub const fn kind(&self) -> &'static str {
    match self {
      Self::MarketData { .. } => "market_data_failed",
      Self::EmptyWindow { .. } => "empty_window",
      Self::Position { .. } => "position_unknown",
      Self::OrderSubmission { .. } => "order_failed",
      Self::Unclassified { .. } => "unclassified",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_transient_classification() {
    assert!(ExchangeError::Transport("reset".into()).is_transient());
    assert!(ExchangeError::RateLimited { status: 429 }.is_transient());
    assert!(ExchangeError::Http { status: 503, body: String::new() }.is_transient());
    assert!(!ExchangeError::Http { status: 404, body: String::new() }.is_transient());
    assert!(!ExchangeError::Api { code: -2019, message: "Margin is insufficient.".into() }.is_transient());
    assert!(!ExchangeError::Decode("eof".into()).is_transient());
  }

  #[test]
  fn test_cycle_error_context() {
    let err = CycleError::OrderSubmission {
      symbol: "ETHUSDT".into(),
      side: TradeSide::Buy,
      source: ExchangeError::Api { code: -2019, message: "Margin is insufficient.".into() },
    };
    assert_eq!(err.operation(), "submit_market_order");
    assert_eq!(err.kind(), "order_failed");
    let msg = err.to_string();
    assert!(msg.contains("ETHUSDT"));
    assert!(msg.contains("BUY"));
    assert!(msg.contains("-2019"));
  }

  #[test]
  fn test_missing_credential_message() {
    assert_eq!(ConfigError::MissingCredential("API_KEY").to_string(), "API_KEY is not set");
  }
}
