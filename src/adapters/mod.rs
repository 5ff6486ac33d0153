//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies.
//!
//! Adapter categories:
//! - `api`: Binance USD-M futures REST client, signing and port impls
//! - `dry_run`: Local `OrderPort` that never touches the exchange
//! - `metrics`: Prometheus metrics export and health checks

pub mod api;
pub mod dry_run;
pub mod metrics;
