//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces.
//!
//! Use cases:
//! - `prepare_account`: One-time balance report and leverage setup
//! - `TradingLoop`: Polling fetch → decide → submit cycle

pub mod startup;
pub mod trading_loop;

pub use startup::{StartupReport, prepare_account};
pub use trading_loop::{CycleOutcome, TradingLoop};
