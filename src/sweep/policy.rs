//! Sweep eligibility and amount policies.
//!
//! Pure functions of an observed balance and configured thresholds. A skip
//! is a normal decision, not an error.

use alloy::primitives::U256;

use crate::blockchain::transaction::NATIVE_TRANSFER_GAS;

/// Why an account was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The movable amount is under the configured minimum.
    BelowThreshold { balance: U256, minimum: U256 },
    /// The balance does not even cover the transfer fee plus the reserve.
    InsufficientFunds { balance: U256, required: U256 },
    /// Eligible by threshold but the amount is zero.
    NothingToSweep,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::BelowThreshold { balance, minimum } => {
                write!(f, "balance too low: {} (minimum {})", balance, minimum)
            }
            SkipReason::InsufficientFunds { balance, required } => write!(
                f,
                "insufficient balance after gas and reserve: {} (fee + reserve {})",
                balance, required
            ),
            SkipReason::NothingToSweep => write!(f, "nothing to sweep"),
        }
    }
}

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepDecision {
    Sweep { amount: U256 },
    Skip(SkipReason),
}

/// Token balances: all or nothing.
///
/// Fees are paid in the native currency, so the whole token balance moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    pub minimum: U256,
}

impl TokenPolicy {
    pub fn new(minimum: U256) -> Self {
        Self { minimum }
    }

    pub fn decide(&self, balance: U256) -> SweepDecision {
        if balance < self.minimum {
            return SweepDecision::Skip(SkipReason::BelowThreshold {
                balance,
                minimum: self.minimum,
            });
        }
        if balance.is_zero() {
            return SweepDecision::Skip(SkipReason::NothingToSweep);
        }
        SweepDecision::Sweep { amount: balance }
    }
}

/// Native balances: pay our own fee, keep a reserve, move the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativePolicy {
    pub minimum: U256,
    pub reserve: U256,
    pub gas_price: U256,
}

impl NativePolicy {
    pub fn new(minimum: U256, reserve: U256, gas_price: U256) -> Self {
        Self {
            minimum,
            reserve,
            gas_price,
        }
    }

    /// Fee of the sweeping transfer itself: `21000 × gas_price`.
    pub fn transfer_cost(&self) -> U256 {
        U256::from(NATIVE_TRANSFER_GAS).saturating_mul(self.gas_price)
    }

    /// `balance − transfer_cost − reserve`, or `None` when negative.
    pub fn sweepable(&self, balance: U256) -> Option<U256> {
        balance
            .checked_sub(self.transfer_cost())?
            .checked_sub(self.reserve)
    }

    pub fn decide(&self, balance: U256) -> SweepDecision {
        let Some(amount) = self.sweepable(balance) else {
            return SweepDecision::Skip(SkipReason::InsufficientFunds {
                balance,
                required: self.transfer_cost().saturating_add(self.reserve),
            });
        };
        if amount < self.minimum {
            return SweepDecision::Skip(SkipReason::BelowThreshold {
                balance,
                minimum: self.minimum,
            });
        }
        if amount.is_zero() {
            return SweepDecision::Skip(SkipReason::NothingToSweep);
        }
        SweepDecision::Sweep { amount }
    }
}
