//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout (compact or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (address, nonce, tx_hash) on every sweep event
//! - Private keys never reach a log line
//! - Metrics are cheap and disabled by default for one-shot runs

pub mod logging;
pub mod metrics;
