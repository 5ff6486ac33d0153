//! Binance Account Adapter - Implements `PositionPort` and `AccountPort`
//!
//! Position risk, wallet balance and leverage all live under the
//! signed account endpoints, so one adapter serves both ports.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use super::client::BinanceClient;
use super::types::{
    BalanceEntry, LeverageResponse, PositionRiskEntry, balance_of, position_from_entries,
};
use crate::domain::trade::{LeverageAck, PositionState};
use crate::error::ExchangeError;
use crate::ports::account::AccountPort;
use crate::ports::position::PositionPort;

const POSITION_RISK_PATH: &str = "/fapi/v2/positionRisk";
const BALANCE_PATH: &str = "/fapi/v2/balance";
const LEVERAGE_PATH: &str = "/fapi/v1/leverage";

/// Futures account adapter backed by the shared Binance client.
pub struct BinanceAccount {
    client: Arc<BinanceClient>,
}

impl BinanceAccount {
    pub fn new(client: Arc<BinanceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PositionPort for BinanceAccount {
    #[instrument(skip(self))]
    async fn fetch_position(&self, symbol: &str) -> Result<PositionState, ExchangeError> {
        let params = [("symbol", symbol.to_string())];
        let entries: Vec<PositionRiskEntry> =
            self.client.get_signed(POSITION_RISK_PATH, &params).await?;

        // Without `symbol` the endpoint lists every contract.
        let entries: Vec<_> = entries.into_iter().filter(|e| e.symbol == symbol).collect();
        let position = position_from_entries(&entries);
        debug!(position = %position, "Fetched position");
        Ok(position)
    }
}

#[async_trait]
impl AccountPort for BinanceAccount {
    #[instrument(skip(self))]
    async fn fetch_balance(&self, asset: &str) -> Result<Option<Decimal>, ExchangeError> {
        let entries: Vec<BalanceEntry> = self.client.get_signed(BALANCE_PATH, &[]).await?;
        Ok(balance_of(&entries, asset))
    }

    #[instrument(skip(self))]
    async fn set_leverage(&self, symbol: &str, leverage: u8) -> Result<LeverageAck, ExchangeError> {
        let params = [
            ("symbol", symbol.to_string()),
            ("leverage", leverage.to_string()),
        ];
        let response: LeverageResponse = self.client.post_signed(LEVERAGE_PATH, &params).await?;
        info!(symbol = %response.symbol, leverage = response.leverage, "Leverage updated");
        Ok(response.into())
    }
}
