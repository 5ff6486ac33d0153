//! Metrics and Monitoring Adapters
//!
//! Prometheus metrics and the health check endpoints (/live, /ready,
//! /metrics) served by axum 0.7 when `metrics.enabled` is set.

pub mod health;
pub mod prometheus;

pub use health::{HealthServer, HealthState};
pub use prometheus::MetricsRegistry;
