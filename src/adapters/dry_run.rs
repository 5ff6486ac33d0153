//! Dry-run Order Executor
//!
//! Stands in for the real `OrderPort` when `bot.dry_run` is set: the
//! order is logged and acknowledged locally, nothing reaches the
//! exchange. Market data and positions still come from Binance, so the
//! position gate keeps seeing FLAT and a breakout is re-signalled every
//! cycle it persists.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{instrument, warn};

use crate::domain::trade::{OrderConfirmation, OrderRequest};
use crate::error::ExchangeError;
use crate::ports::order::OrderPort;

/// Status reported for simulated orders.
pub const SIMULATED_STATUS: &str = "SIMULATED";

/// Logs orders instead of sending them.
#[derive(Debug, Default)]
pub struct DryRunOrderExecutor {
    /// Orders "placed" so far.
    submitted: AtomicU64,
}

impl DryRunOrderExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl OrderPort for DryRunOrderExecutor {
    #[instrument(skip(self, request), fields(symbol = %request.symbol))]
    async fn submit_market_order(
        &self,
        request: &OrderRequest,
    ) -> Result<OrderConfirmation, ExchangeError> {
        let n = self.submitted.fetch_add(1, Ordering::Relaxed) + 1;
        warn!(
            side = %request.side,
            quantity = %request.quantity,
            client_order_id = %request.client_order_id,
            "Dry-run: order NOT sent to exchange"
        );
        Ok(OrderConfirmation {
            order_id: format!("dry-run-{n}"),
            client_order_id: request.client_order_id.clone(),
            status: SIMULATED_STATUS.to_string(),
            executed_qty: Decimal::ZERO,
            avg_price: None,
        })
    }
}
