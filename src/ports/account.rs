//! Account Port - Balance and Leverage Interface
//!
//! Used once at startup. Failures here are reported but never stop
//! the bot.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::trade::LeverageAck;
use crate::error::ExchangeError;

/// Trait for futures account operations.
#[async_trait]
pub trait AccountPort: Send + Sync + 'static {
  /// Wallet balance of `asset`, or `None` if the account holds none.
  async fn fetch_balance(&self, asset: &str) -> Result<Option<Decimal>, ExchangeError>;

  /// Set initial leverage for `symbol`.
  async fn set_leverage(&self, symbol: &str, leverage: u8) -> Result<LeverageAck, ExchangeError>;
}
