//! Binance USD-M Futures REST Adapter
//!
//! Implements the exchange-facing ports over the Binance futures REST
//! API. Handles request signing, rate limiting, and response decoding.
//!
//! Sub-modules:
//! - `auth`: API credentials and HMAC-SHA256 signing
//! - `client`: HTTP client with rate limiting and retries
//! - `market_data`: Kline retrieval (`MarketDataPort`)
//! - `account`: Position, balance and leverage (`PositionPort`, `AccountPort`)
//! - `orders`: Market order placement (`OrderPort`)
//! - `types`: API request/response type definitions

pub mod account;
pub mod auth;
pub mod client;
pub mod market_data;
pub mod orders;
pub mod types;

pub use account::BinanceAccount;
pub use auth::ApiCredentials;
pub use client::{BinanceClient, BinanceClientConfig};
pub use market_data::BinanceMarketData;
pub use orders::BinanceOrderExecutor;
