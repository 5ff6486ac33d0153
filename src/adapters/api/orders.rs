//! Binance Order Executor - Adapter for Market Order Placement
//!
//! Implements the `OrderPort` using the shared `BinanceClient` for
//! authenticated requests. Orders are sent exactly once.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use super::client::BinanceClient;
use super::types::OrderResponse;
use crate::domain::trade::{OrderConfirmation, OrderRequest};
use crate::error::ExchangeError;
use crate::ports::order::OrderPort;

const ORDER_PATH: &str = "/fapi/v1/order";

/// Order executor backed by the shared authenticated client.
///
/// Uses `BinanceClient` for all HTTP requests (inherits signing and
/// rate limiting). Never creates its own reqwest client.
pub struct BinanceOrderExecutor {
    client: Arc<BinanceClient>,
}

impl BinanceOrderExecutor {
    pub fn new(client: Arc<BinanceClient>) -> Self {
        Self { client }
    }
}

/// Query parameters for `POST /fapi/v1/order`.
fn order_params(request: &OrderRequest) -> [(&'static str, String); 6] {
    [
        ("symbol", request.symbol.clone()),
        ("side", request.side.as_str().to_string()),
        ("type", request.order_type.as_str().to_string()),
        ("quantity", request.quantity.normalize().to_string()),
        ("newClientOrderId", request.client_order_id.clone()),
        ("newOrderRespType", "RESULT".to_string()),
    ]
}

#[async_trait]
impl OrderPort for BinanceOrderExecutor {
    #[instrument(skip(self, request), fields(symbol = %request.symbol, side = %request.side, quantity = %request.quantity))]
    async fn submit_market_order(
        &self,
        request: &OrderRequest,
    ) -> Result<OrderConfirmation, ExchangeError> {
        let response: OrderResponse = self
            .client
            .post_signed(ORDER_PATH, &order_params(request))
            .await?;

        info!(
            order_id = response.order_id,
            status = %response.status,
            "Order accepted by exchange"
        );
        Ok(response.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::TradeSide;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_params() {
        let request = OrderRequest::market("ETHUSDT", TradeSide::Buy, dec!(0.0930));
        let params = order_params(&request);
        assert_eq!(params[0], ("symbol", "ETHUSDT".to_string()));
        assert_eq!(params[1], ("side", "BUY".to_string()));
        assert_eq!(params[2], ("type", "MARKET".to_string()));
        assert_eq!(params[3], ("quantity", "0.093".to_string()));
        assert_eq!(params[4].1, request.client_order_id);
    }
}
