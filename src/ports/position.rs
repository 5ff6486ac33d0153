//! Position Port - Open Position Interface
//!
//! The exchange is the single source of truth for whether a position
//! exists. An `Err` here means "unknown", never "flat".

use async_trait::async_trait;

use crate::domain::trade::PositionState;
use crate::error::ExchangeError;

/// Trait for position state providers.
#[async_trait]
pub trait PositionPort: Send + Sync + 'static {
  /// Current position on `symbol`.
  async fn fetch_position(&self, symbol: &str) -> Result<PositionState, ExchangeError>;
}
