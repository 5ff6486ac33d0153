//! Market Data Port - Recent Candle Interface
//!
//! Polling interface for kline history. The trading loop asks for a
//! fresh window every cycle; implementors must not cache across calls.

use async_trait::async_trait;

use crate::domain::candle::{Candle, CandleInterval};
use crate::error::ExchangeError;

/// Trait for candle data providers.
#[async_trait]
pub trait MarketDataPort: Send + Sync + 'static {
  /// Fetch up to `limit` most recent candles, oldest first.
  ///
  /// An empty vector is a valid (if useless) answer; the caller
  /// decides what to do with it.
  async fn fetch_candles(
    &self,
    symbol: &str,
    interval: CandleInterval,
    limit: u16,
  ) -> Result<Vec<Candle>, ExchangeError>;
}
