//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Define the `ChainClient` facade the collector runs against
//! - Connect to JSON-RPC endpoints (primary + failovers)
//! - Query chain state (balances, pending nonces, chain ID, read calls)
//! - Broadcast signed transactions
//! - Handle timeouts and network errors gracefully

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportResult;
use async_trait::async_trait;
use tokio::time::timeout;

use crate::blockchain::transaction::SignedTransaction;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId, RpcConfig};
use crate::observability::metrics;

/// Chain operations the collector depends on.
///
/// Implementations own transport concerns (timeouts, failover). The
/// collector never adds deadlines of its own.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Native currency balance at the latest block.
    async fn balance_of(&self, address: Address) -> BlockchainResult<U256>;

    /// Next usable nonce, counting transactions already pending.
    async fn pending_nonce_of(&self, address: Address) -> BlockchainResult<u64>;

    /// Network identifier used for replay protection.
    async fn chain_id(&self) -> BlockchainResult<ChainId>;

    /// Read-only contract call (`eth_call`).
    async fn call(&self, contract: Address, calldata: Bytes) -> BlockchainResult<Bytes>;

    /// Broadcast a signed transaction and return its hash.
    async fn submit(&self, tx: &SignedTransaction) -> BlockchainResult<TxHash>;
}

type DynProvider = Arc<dyn Provider + Send + Sync>;

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// List of providers (primary + failovers).
    providers: Vec<DynProvider>,
    /// Configuration.
    config: RpcConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client.
    ///
    /// No request is made unless `expected_chain_id` is configured. An
    /// unreachable endpoint only logs a warning; a reachable endpoint on the
    /// wrong chain is an error.
    pub async fn new(config: RpcConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)) as DynProvider);

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as DynProvider);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        let client = Self {
            providers,
            config: config.clone(),
            timeout_duration,
        };

        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    rpc_url = %config.url,
                    failovers = config.failover_urls.len(),
                    "Blockchain client initialized"
                );
            }
            Err(e @ BlockchainError::ChainMismatch { .. }) => return Err(e),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Blockchain client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Verify the connected chain ID matches configuration, if one is set.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let Some(expected) = self.config.expected_chain_id else {
            return Ok(());
        };
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != expected {
            return Err(BlockchainError::ChainMismatch {
                expected,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Run `op` against each provider in order until one answers.
    async fn with_failover<T, F, Fut>(&self, method: &'static str, op: F) -> BlockchainResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let mut last_error = String::new();

        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, op(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, method, error = %e, "RPC error, trying next provider");
                    last_error = e.to_string();
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, method, "RPC timeout, trying next provider");
                    last_error = BlockchainError::Timeout(self.config.timeout_secs).to_string();
                }
            }
        }

        metrics::record_rpc_failure(method);
        Err(BlockchainError::Rpc(format!(
            "All RPC providers failed for {}: {}",
            method, last_error
        )))
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.with_failover("eth_chainId", |p| async move { p.get_chain_id().await })
            .await
            .map(ChainId)
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.with_failover("eth_blockNumber", |p| async move { p.get_block_number().await })
            .await
    }

    /// Check if the blockchain is reachable and healthy.
    ///
    /// Returns true if we can query the block number.
    pub async fn is_healthy(&self) -> bool {
        self.get_block_number().await.is_ok()
    }
}

#[async_trait]
impl ChainClient for BlockchainClient {
    async fn balance_of(&self, address: Address) -> BlockchainResult<U256> {
        self.with_failover("eth_getBalance", |p| async move {
            p.get_balance(address).await
        })
        .await
    }

    async fn pending_nonce_of(&self, address: Address) -> BlockchainResult<u64> {
        self.with_failover("eth_getTransactionCount", |p| async move {
            p.get_transaction_count(address).pending().await
        })
        .await
    }

    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.get_chain_id().await
    }

    async fn call(&self, contract: Address, calldata: Bytes) -> BlockchainResult<Bytes> {
        let request = TransactionRequest::default()
            .with_to(contract)
            .with_input(calldata);

        self.with_failover("eth_call", |p| {
            let request = request.clone();
            async move { p.call(request).await }
        })
        .await
    }

    async fn submit(&self, tx: &SignedTransaction) -> BlockchainResult<TxHash> {
        // A node that answers with a JSON-RPC error has rejected the
        // transaction; the others would too. Only transport failures move on.
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.send_raw_transaction(&tx.raw)).await {
                Ok(Ok(pending)) => return Ok(*pending.tx_hash()),
                Ok(Err(e)) if e.as_error_resp().is_some() => {
                    metrics::record_rpc_failure("eth_sendRawTransaction");
                    return Err(BlockchainError::Rejected(e.to_string()));
                }
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, tx_hash = %tx.hash, "Broadcast failed, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, tx_hash = %tx.hash, "Broadcast timeout, trying next provider");
                }
            }
        }

        metrics::record_rpc_failure("eth_sendRawTransaction");
        Err(BlockchainError::Rpc(
            "All RPC providers failed for eth_sendRawTransaction".to_string(),
        ))
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.url)
            .field("failovers", &self.config.failover_urls.len())
            .field("timeout_secs", &self.config.timeout_secs)
            .finish()
    }
}
