//! Transfer transactions: unsigned requests and signed envelopes.
//!
//! # Responsibilities
//! - Describe a sweep transfer before signing (`TransferRequest`)
//! - Lower it into a legacy EIP-155 transaction
//! - Carry the signed, encoded result to submission (`SignedTransaction`)
//!
//! Confirmation monitoring is intentionally absent: a submitted hash is not
//! proof of inclusion.

use alloy::consensus::{TxEnvelope, TxLegacy};
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};

use crate::blockchain::types::ChainId;

/// Gas consumed by a plain value transfer.
pub const NATIVE_TRANSFER_GAS: u64 = 21_000;

/// Default gas limit for an ERC-20 `transfer` call.
pub const DEFAULT_TOKEN_GAS_LIMIT: u64 = 100_000;

/// What a transfer moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// Native currency carried in the transaction value.
    Native,
    /// Tokens moved by the call payload.
    Token { amount: U256 },
}

/// An unsigned transfer from one source account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Declared sender. Must match the signing account.
    pub from: Address,
    /// Call target: the destination for native transfers, the token contract otherwise.
    pub to: Address,
    pub value: U256,
    pub input: Bytes,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: U256,
    pub kind: TransferKind,
}

impl TransferRequest {
    /// Amount leaving the source account in the swept asset.
    pub fn swept_amount(&self) -> U256 {
        match self.kind {
            TransferKind::Native => self.value,
            TransferKind::Token { amount } => amount,
        }
    }

    /// Worst-case fee in wei: `gas_limit × gas_price`.
    pub fn max_fee(&self) -> U256 {
        U256::from(self.gas_limit).saturating_mul(self.gas_price)
    }

    /// Legacy transaction bound to `chain_id`.
    pub(crate) fn to_legacy(&self, chain_id: ChainId, gas_price: u128) -> TxLegacy {
        TxLegacy {
            chain_id: Some(chain_id.0),
            nonce: self.nonce,
            gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.to),
            value: self.value,
            input: self.input.clone(),
        }
    }
}

/// A transfer signed by its source account, ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub from: Address,
    pub to: Address,
    pub nonce: u64,
    pub kind: TransferKind,
    pub envelope: TxEnvelope,
    /// EIP-2718 encoding sent with `eth_sendRawTransaction`.
    pub raw: Bytes,
    pub hash: TxHash,
}
