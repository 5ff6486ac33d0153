//! Binance Kline Adapter - Implements `MarketDataPort`
//!
//! Reads `GET /fapi/v1/klines`. The exchange always appends the bar
//! that is still forming; it is dropped, so callers only ever see
//! closed candles. One extra row is requested to make up for it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, instrument};

use super::client::BinanceClient;
use super::types::closed_candles;
use crate::domain::candle::{Candle, CandleInterval};
use crate::error::ExchangeError;
use crate::ports::market_data::MarketDataPort;

const KLINES_PATH: &str = "/fapi/v1/klines";
/// Largest `limit` the endpoint accepts.
const KLINES_MAX_LIMIT: u16 = 1500;

/// Candle source backed by the shared Binance client.
pub struct BinanceMarketData {
    client: Arc<BinanceClient>,
}

impl BinanceMarketData {
    pub fn new(client: Arc<BinanceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MarketDataPort for BinanceMarketData {
    #[instrument(skip(self))]
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: CandleInterval,
        limit: u16,
    ) -> Result<Vec<Candle>, ExchangeError> {
        let request_limit = limit.saturating_add(1).min(KLINES_MAX_LIMIT);
        let params = [
            ("symbol", symbol.to_string()),
            ("interval", interval.as_str().to_string()),
            ("limit", request_limit.to_string()),
        ];

        let rows: Vec<Vec<Value>> = self.client.get_public(KLINES_PATH, &params).await?;
        let candles = closed_candles(&rows, Utc::now(), usize::from(limit))?;

        debug!(rows = rows.len(), closed = candles.len(), "Fetched klines");
        Ok(candles)
    }
}
