//! Token contract bindings.
//!
//! Each capability the collector needs is a typed method: reading a balance
//! and encoding a transfer. Method names and argument shapes come from the
//! `sol!` interface below, so there is no string-keyed dispatch.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult};

sol! {
    /// Subset of ERC-20 used for sweeping.
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256 balance);
        function transfer(address to, uint256 value) external returns (bool success);
        function decimals() external view returns (uint8);
    }
}

/// A token contract at a fixed address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenContract {
    address: Address,
}

impl TokenContract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Contract address; the `to` of every transfer call.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Token balance held by `owner`.
    pub async fn query_balance<C>(&self, client: &C, owner: Address) -> BlockchainResult<U256>
    where
        C: ChainClient + ?Sized,
    {
        let calldata = Bytes::from(IERC20::balanceOfCall { owner }.abi_encode());
        let raw = client.call(self.address, calldata).await?;

        IERC20::balanceOfCall::abi_decode_returns(&raw).map_err(|e| {
            BlockchainError::Decode(format!(
                "balanceOf returned malformed data from {}: {}",
                self.address, e
            ))
        })
    }

    /// Token decimals, used only to format amounts for humans.
    pub async fn query_decimals<C>(&self, client: &C) -> BlockchainResult<u8>
    where
        C: ChainClient + ?Sized,
    {
        let calldata = Bytes::from(IERC20::decimalsCall {}.abi_encode());
        let raw = client.call(self.address, calldata).await?;

        IERC20::decimalsCall::abi_decode_returns(&raw).map_err(|e| {
            BlockchainError::Decode(format!(
                "decimals returned malformed data from {}: {}",
                self.address, e
            ))
        })
    }

    /// Calldata for `transfer(to, amount)`.
    pub fn transfer_payload(&self, to: Address, amount: U256) -> Bytes {
        Bytes::from(IERC20::transferCall { to, value: amount }.abi_encode())
    }
}
