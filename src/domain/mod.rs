//! Domain layer - Core business logic and models.
//!
//! Pure breakout logic and the value types that cross the port boundary.
//! No I/O here (hexagonal architecture inner ring); everything is
//! testable in isolation.

pub mod breakout;
pub mod candle;
pub mod trade;

// Re-export core types for convenience
pub use breakout::{BreakoutEngine, BreakoutThresholds, Evaluation, NoActionReason, TradeDecision};
pub use candle::{Candle, CandleInterval, CandleWindow, EmptyWindow};
pub use trade::{
    LeverageAck, OrderConfirmation, OrderRequest, OrderType, PositionState, TradeSide,
};
