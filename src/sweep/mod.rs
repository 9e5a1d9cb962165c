//! Sweep engine.
//!
//! # Data Flow
//! ```text
//! Collector (collector.rs)
//!     → Pacer (pacing.rs) gates each account start
//!     → per account: resolve key → read balance
//!     → policy.rs decides sweep / skip
//!     → nonce → build → sign → submit (blockchain::*)
//!     → SweepOutcome (outcome.rs)
//!     → SweepReport (report.rs), rendered for humans
//! ```

pub mod collector;
pub mod outcome;
pub mod pacing;
pub mod policy;
pub mod report;

pub use collector::{Collector, CollectorSettings};
pub use outcome::{OutcomeStatus, SweepError, SweepKind, SweepOutcome, SweepResult};
pub use pacing::Pacer;
pub use policy::{NativePolicy, SkipReason, SweepDecision, TokenPolicy};
pub use report::{ReportSummary, SweepReport};
