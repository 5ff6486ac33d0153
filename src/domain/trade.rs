//! Core trading domain types.
//!
//! Defines the entities that cross the port boundary: order sides,
//! position state, market order requests and their confirmations.
//! Quantities and prices are `Decimal` throughout; the exchange speaks
//! decimal strings and float rounding would leak into order sizes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────
// Enums shared across domain and ports
// ────────────────────────────────────────────

/// Order side as understood by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Wire representation (`BUY` / `SELL`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order type. Only market orders are ever placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    /// Executes immediately at the prevailing price.
    Market,
}

impl OrderType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Market => "MARKET",
        }
    }
}

// ────────────────────────────────────────────
// Position state
// ────────────────────────────────────────────

/// Open position for the configured symbol, as reported by the exchange.
///
/// The bot keeps no local copy of this; it is re-read every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionState {
    /// No open position.
    Flat,
    /// Long position; amount is positive.
    Long(Decimal),
    /// Short position; amount is negative (signed as reported).
    Short(Decimal),
}

impl PositionState {
    /// Classify a signed position amount. Zero means flat.
    pub fn from_signed_amount(amount: Decimal) -> Self {
        if amount.is_zero() {
            Self::Flat
        } else if amount.is_sign_positive() {
            Self::Long(amount)
        } else {
            Self::Short(amount)
        }
    }

    pub const fn is_flat(&self) -> bool {
        matches!(self, Self::Flat)
    }

    /// Signed amount (zero when flat).
    pub const fn signed_amount(&self) -> Decimal {
        match self {
            Self::Flat => Decimal::ZERO,
            Self::Long(amount) | Self::Short(amount) => *amount,
        }
    }
}

impl std::fmt::Display for PositionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat => write!(f, "FLAT"),
            Self::Long(amount) => write!(f, "LONG {amount}"),
            Self::Short(amount) => write!(f, "SHORT {amount}"),
        }
    }
}

// ────────────────────────────────────────────
// Orders
// ────────────────────────────────────────────

/// A market order ready to be submitted through the `OrderPort`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Futures symbol, e.g. `ETHUSDT`.
    pub symbol: String,
    /// Buy to open long, sell to open short.
    pub side: TradeSide,
    /// Always `Market`.
    pub order_type: OrderType,
    /// Base-asset quantity, already rounded and strictly positive.
    pub quantity: Decimal,
    /// Client-generated id echoed back by the exchange.
    pub client_order_id: String,
}

impl OrderRequest {
    /// Build a market order with a fresh client order id.
    pub fn market(symbol: impl Into<String>, side: TradeSide, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            client_order_id: format!("brk-{}", Uuid::new_v4().simple()),
        }
    }
}

/// Exchange acknowledgement of a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// Exchange-assigned order id.
    pub order_id: String,
    /// Client order id we sent.
    pub client_order_id: String,
    /// Exchange order status (`NEW`, `FILLED`, ...).
    pub status: String,
    /// Quantity filled so far.
    pub executed_qty: Decimal,
    /// Average fill price, when the exchange reports a non-zero one.
    pub avg_price: Option<Decimal>,
}

/// Acknowledgement of a leverage change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeverageAck {
    pub symbol: String,
    pub leverage: u8,
    /// Maximum notional allowed at this leverage, if reported.
    pub max_notional: Option<Decimal>,
}
