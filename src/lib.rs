//! Fund collector library.
//!
//! Sweeps token and native currency balances from many source accounts into
//! a single destination account.

pub mod blockchain;
pub mod config;
pub mod observability;
pub mod sweep;

pub use config::schema::CollectorConfig;
pub use sweep::{Collector, CollectorSettings, SweepOutcome, SweepReport};
