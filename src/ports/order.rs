//! Order Port - Market Order Submission Interface
//!
//! One call, one order. Implementors must not retry internally: a
//! duplicated entry is worse than a missed one, and the next cycle
//! re-reads the position anyway.

use async_trait::async_trait;

use crate::domain::trade::{OrderConfirmation, OrderRequest};
use crate::error::ExchangeError;

/// Trait for order execution providers.
#[async_trait]
pub trait OrderPort: Send + Sync + 'static {
  /// Submit a market order.
  ///
  /// # Errors
  /// Returns error if the request fails or the exchange rejects it.
  async fn submit_market_order(
    &self,
    request: &OrderRequest,
  ) -> Result<OrderConfirmation, ExchangeError>;
}
