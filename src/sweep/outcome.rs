//! Per-account sweep results and the errors behind failed ones.

use alloy::primitives::{Address, TxHash, U256};
use thiserror::Error;

use crate::blockchain::types::BlockchainError;
use crate::blockchain::wallet::{KeyDerivationError, SigningError};
use crate::sweep::policy::SkipReason;

/// Everything that can fail for a single account.
///
/// None of these abort a run; each becomes a `Failed` outcome.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error(transparent)]
    KeyDerivation(#[from] KeyDerivationError),

    #[error(transparent)]
    ChainRpc(#[from] BlockchainError),

    #[error(transparent)]
    Signing(#[from] SigningError),
}

/// Result type for per-account sweep steps.
pub type SweepResult<T> = Result<T, SweepError>;

/// Which asset an operation moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepKind {
    Token,
    Native,
}

impl SweepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SweepKind::Token => "token",
            SweepKind::Native => "native",
        }
    }
}

/// Terminal state of one account.
#[derive(Debug)]
pub enum OutcomeStatus {
    /// The node accepted the transfer. Not a confirmation.
    Submitted,
    Skipped(SkipReason),
    Failed(SweepError),
}

impl OutcomeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OutcomeStatus::Submitted => "submitted",
            OutcomeStatus::Skipped(_) => "skipped",
            OutcomeStatus::Failed(_) => "failed",
        }
    }
}

/// Result of sweeping one source account. Built once, never changed.
#[derive(Debug)]
pub struct SweepOutcome {
    /// Position of the key in the configured list.
    pub account_index: usize,
    /// Source address; absent only when the key could not be resolved.
    pub source: Option<Address>,
    /// Hash of the submitted transfer.
    pub tx_hash: Option<TxHash>,
    /// Swept amount when submitted, observed balance when skipped,
    /// intended amount when a later step failed.
    pub amount: Option<U256>,
    pub status: OutcomeStatus,
}

impl SweepOutcome {
    pub fn submitted(account_index: usize, source: Address, tx_hash: TxHash, amount: U256) -> Self {
        Self {
            account_index,
            source: Some(source),
            tx_hash: Some(tx_hash),
            amount: Some(amount),
            status: OutcomeStatus::Submitted,
        }
    }

    pub fn skipped(account_index: usize, source: Address, balance: U256, reason: SkipReason) -> Self {
        Self {
            account_index,
            source: Some(source),
            tx_hash: None,
            amount: Some(balance),
            status: OutcomeStatus::Skipped(reason),
        }
    }

    pub fn failed(
        account_index: usize,
        source: Option<Address>,
        amount: Option<U256>,
        error: SweepError,
    ) -> Self {
        Self {
            account_index,
            source,
            tx_hash: None,
            amount,
            status: OutcomeStatus::Failed(error),
        }
    }

    /// True only for submitted transfers.
    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Submitted)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, OutcomeStatus::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, OutcomeStatus::Failed(_))
    }

    /// Human-readable reason for a skip or failure.
    pub fn error_detail(&self) -> Option<String> {
        match &self.status {
            OutcomeStatus::Submitted => None,
            OutcomeStatus::Skipped(reason) => Some(reason.to_string()),
            OutcomeStatus::Failed(error) => Some(error.to_string()),
        }
    }
}
