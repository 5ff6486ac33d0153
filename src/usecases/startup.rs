//! Startup - One-time Account Preparation
//!
//! Runs once before the trading loop: reports the wallet balance and
//! applies the configured leverage. Both steps are best-effort; a
//! failure is logged and the bot proceeds. Credential presence is
//! checked earlier, when the exchange client is built.

use rust_decimal::Decimal;
use tracing::{error, info, instrument, warn};

use crate::config::TradingConfig;
use crate::ports::account::AccountPort;

/// What the startup sequence managed to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
  /// Quote-asset wallet balance, if it could be read and the asset exists.
  pub balance: Option<Decimal>,
  /// Leverage the exchange confirmed, if the call succeeded.
  pub leverage: Option<u8>,
}

/// Report balance and set leverage.
#[instrument(skip(account, config), fields(symbol = %config.symbol))]
pub async fn prepare_account<A: AccountPort + ?Sized>(
  account: &A,
  config: &TradingConfig,
) -> StartupReport {
  let balance = match account.fetch_balance(&config.quote_asset).await {
    Ok(Some(balance)) => {
      info!(asset = %config.quote_asset, balance = %balance, "Wallet balance");
      Some(balance)
    }
    Ok(None) => {
      warn!(asset = %config.quote_asset, balance = "N/A", "Asset not found in wallet");
      None
    }
    Err(e) => {
      error!(operation = "fetch_balance", error = %e, "Failed to fetch wallet balance");
      None
    }
  };

  let leverage = match account.set_leverage(&config.symbol, config.leverage).await {
    Ok(ack) => {
      info!(leverage = ack.leverage, "Leverage set to {}x", ack.leverage);
      Some(ack.leverage)
    }
    Err(e) => {
      error!(
        operation = "set_leverage",
        requested = config.leverage,
        error = %e,
        "Failed to set leverage, continuing with exchange setting"
      );
      None
    }
  };

  StartupReport { balance, leverage }
}
