//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the exchange. Adapters implement these traits; tests mock them.
//!
//! Port categories:
//! - `MarketDataPort`: Recent candles for a symbol
//! - `PositionPort`: Current open position for a symbol
//! - `OrderPort`: Market order submission
//! - `AccountPort`: Wallet balance and leverage (startup only)

pub mod account;
pub mod market_data;
pub mod order;
pub mod position;

pub use account::AccountPort;
pub use market_data::MarketDataPort;
pub use order::OrderPort;
pub use position::PositionPort;
