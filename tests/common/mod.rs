//! Shared utilities for collector integration tests.
//!
//! `MockChain` is an in-memory ledger behind the `ChainClient` facade. It
//! applies submitted transfers the way a node would (nonce check, gas
//! charge, balance moves) so a second run sees the first run's effects.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::sol;
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;

use fund_collector::blockchain::wallet::resolve_address;
use fund_collector::blockchain::{
    BlockchainError, BlockchainResult, ChainClient, ChainId, KeyMaterial, SignedTransaction,
    TransferKind,
};
use fund_collector::sweep::CollectorSettings;

sol! {
    interface IToken {
        function balanceOf(address owner) external view returns (uint256 balance);
        function transfer(address to, uint256 value) external returns (bool success);
        function decimals() external view returns (uint8);
    }
}

/// Well-known development keys.
pub const KEYS: [&str; 4] = [
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
    "7c852118294e51e653712a81e05800f419141751be58f605c371e15141b007a6",
];

pub const CHAIN_ID: u64 = 56;
pub const GWEI_20: u64 = 20_000_000_000;
pub const ETHER: u128 = 1_000_000_000_000_000_000;

pub fn wei(n: u128) -> U256 {
    U256::from(n)
}

pub fn destination() -> Address {
    Address::repeat_byte(0xde)
}

pub fn token_address() -> Address {
    Address::repeat_byte(0x70)
}

pub fn key(i: usize) -> KeyMaterial {
    KeyMaterial::new(KEYS[i])
}

pub fn address_of(i: usize) -> Address {
    resolve_address(&key(i)).unwrap()
}

/// Settings with pacing disabled so tests run instantly.
pub fn settings() -> CollectorSettings {
    let mut settings = CollectorSettings::new(destination(), U256::from(GWEI_20));
    settings.pacing_delay = Duration::ZERO;
    settings
}

#[derive(Default)]
struct Ledger {
    native: HashMap<Address, U256>,
    tokens: HashMap<(Address, Address), U256>,
    nonces: HashMap<Address, u64>,
    submitted: Vec<SignedTransaction>,
    failing_balances: HashSet<Address>,
    failing_nonces: HashSet<Address>,
    rejecting: HashSet<Address>,
    chain_id_calls: usize,
}

/// In-memory chain implementing `ChainClient`.
pub struct MockChain {
    chain_id: u64,
    ledger: Mutex<Ledger>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            chain_id: CHAIN_ID,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    pub fn set_native(&self, address: Address, balance: U256) {
        self.ledger.lock().unwrap().native.insert(address, balance);
    }

    pub fn set_token(&self, token: Address, owner: Address, balance: U256) {
        self.ledger
            .lock()
            .unwrap()
            .tokens
            .insert((token, owner), balance);
    }

    pub fn native(&self, address: Address) -> U256 {
        self.ledger
            .lock()
            .unwrap()
            .native
            .get(&address)
            .copied()
            .unwrap_or_default()
    }

    pub fn token(&self, token: Address, owner: Address) -> U256 {
        self.ledger
            .lock()
            .unwrap()
            .tokens
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    pub fn nonce(&self, address: Address) -> u64 {
        self.ledger
            .lock()
            .unwrap()
            .nonces
            .get(&address)
            .copied()
            .unwrap_or_default()
    }

    /// Make balance reads for `address` fail with a transport error.
    pub fn fail_balance_reads(&self, address: Address) {
        self.ledger.lock().unwrap().failing_balances.insert(address);
    }

    /// Make nonce reads for `address` fail with a transport error.
    pub fn fail_nonce_reads(&self, address: Address) {
        self.ledger.lock().unwrap().failing_nonces.insert(address);
    }

    /// Reject every transaction sent from `address`.
    pub fn reject_from(&self, address: Address) {
        self.ledger.lock().unwrap().rejecting.insert(address);
    }

    pub fn submitted(&self) -> Vec<SignedTransaction> {
        self.ledger.lock().unwrap().submitted.clone()
    }

    pub fn chain_id_calls(&self) -> usize {
        self.ledger.lock().unwrap().chain_id_calls
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn balance_of(&self, address: Address) -> BlockchainResult<U256> {
        tokio::task::yield_now().await;
        let ledger = self.ledger.lock().unwrap();
        if ledger.failing_balances.contains(&address) {
            return Err(BlockchainError::Rpc("connection refused".to_string()));
        }
        Ok(ledger.native.get(&address).copied().unwrap_or_default())
    }

    async fn pending_nonce_of(&self, address: Address) -> BlockchainResult<u64> {
        tokio::task::yield_now().await;
        let ledger = self.ledger.lock().unwrap();
        if ledger.failing_nonces.contains(&address) {
            return Err(BlockchainError::Timeout(10));
        }
        Ok(ledger.nonces.get(&address).copied().unwrap_or_default())
    }

    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.ledger.lock().unwrap().chain_id_calls += 1;
        Ok(ChainId(self.chain_id))
    }

    async fn call(&self, contract: Address, calldata: Bytes) -> BlockchainResult<Bytes> {
        tokio::task::yield_now().await;
        let ledger = self.ledger.lock().unwrap();

        if let Ok(call) = IToken::balanceOfCall::abi_decode(&calldata) {
            if ledger.failing_balances.contains(&call.owner) {
                return Err(BlockchainError::Rpc("connection refused".to_string()));
            }
            let balance = ledger
                .tokens
                .get(&(contract, call.owner))
                .copied()
                .unwrap_or_default();
            return Ok(Bytes::from(balance.abi_encode()));
        }
        if IToken::decimalsCall::abi_decode(&calldata).is_ok() {
            return Ok(Bytes::from(U256::from(18u8).abi_encode()));
        }

        Err(BlockchainError::Rejected("execution reverted".to_string()))
    }

    async fn submit(&self, tx: &SignedTransaction) -> BlockchainResult<TxHash> {
        tokio::task::yield_now().await;
        let mut ledger = self.ledger.lock().unwrap();

        if ledger.rejecting.contains(&tx.from) {
            return Err(BlockchainError::Rejected("replacement transaction underpriced".to_string()));
        }

        let legacy = tx
            .envelope
            .as_legacy()
            .ok_or_else(|| BlockchainError::Rejected("unsupported transaction type".to_string()))?
            .tx();

        if legacy.chain_id != Some(self.chain_id) {
            return Err(BlockchainError::Rejected("invalid chain id".to_string()));
        }

        let expected_nonce = ledger.nonces.get(&tx.from).copied().unwrap_or_default();
        if legacy.nonce != expected_nonce {
            return Err(BlockchainError::Rejected("nonce too low".to_string()));
        }

        let fee = U256::from(legacy.gas_limit) * U256::from(legacy.gas_price);
        let native = ledger.native.get(&tx.from).copied().unwrap_or_default();
        let cost = fee + legacy.value;
        if native < cost {
            return Err(BlockchainError::Rejected(
                "insufficient funds for gas * price + value".to_string(),
            ));
        }

        match tx.kind {
            TransferKind::Native => {
                *ledger.native.entry(tx.from).or_default() -= cost;
                *ledger.native.entry(tx.to).or_default() += legacy.value;
            }
            TransferKind::Token { .. } => {
                let call = IToken::transferCall::abi_decode(&legacy.input)
                    .map_err(|e| BlockchainError::Rejected(e.to_string()))?;
                let held = ledger.tokens.get(&(tx.to, tx.from)).copied().unwrap_or_default();
                if held < call.value {
                    return Err(BlockchainError::Rejected(
                        "execution reverted: transfer amount exceeds balance".to_string(),
                    ));
                }
                *ledger.native.entry(tx.from).or_default() -= fee;
                *ledger.tokens.entry((tx.to, tx.from)).or_default() -= call.value;
                *ledger.tokens.entry((tx.to, call.to)).or_default() += call.value;
            }
        }

        *ledger.nonces.entry(tx.from).or_default() += 1;
        ledger.submitted.push(tx.clone());
        Ok(tx.hash)
    }
}

/// Wraps `MockChain` with a slow balance read and records when each
/// account starts reading and when each submission lands.
pub struct SlowChain {
    pub inner: MockChain,
    read_delay: Duration,
    events: Mutex<Vec<(&'static str, tokio::time::Instant)>>,
}

impl SlowChain {
    pub fn new(read_delay: Duration) -> Self {
        Self {
            inner: MockChain::new(),
            read_delay,
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<(&'static str, tokio::time::Instant)> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: &'static str) {
        self.events
            .lock()
            .unwrap()
            .push((event, tokio::time::Instant::now()));
    }
}

#[async_trait]
impl ChainClient for SlowChain {
    async fn balance_of(&self, address: Address) -> BlockchainResult<U256> {
        self.record("start");
        tokio::time::sleep(self.read_delay).await;
        self.inner.balance_of(address).await
    }

    async fn pending_nonce_of(&self, address: Address) -> BlockchainResult<u64> {
        self.inner.pending_nonce_of(address).await
    }

    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.inner.chain_id().await
    }

    async fn call(&self, contract: Address, calldata: Bytes) -> BlockchainResult<Bytes> {
        self.inner.call(contract, calldata).await
    }

    async fn submit(&self, tx: &SignedTransaction) -> BlockchainResult<TxHash> {
        let hash = self.inner.submit(tx).await?;
        self.record("submit");
        Ok(hash)
    }
}
