//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Key material (environment / keys file)
//!     → wallet.rs (address derivation, bound signer)
//!     → contract.rs (token balance reads, transfer calldata)
//!     → transaction.rs (transfer requests, signed envelopes)
//!     → client.rs (RPC facade with timeouts and failover)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - A signer can only sign for the address its key derives

pub mod client;
pub mod contract;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{BlockchainClient, ChainClient};
pub use contract::TokenContract;
pub use transaction::{SignedTransaction, TransferKind, TransferRequest};
pub use types::{BlockchainError, BlockchainResult, ChainId};
pub use wallet::{AccountCredential, AccountSigner, KeyMaterial};
