//! Collection orchestrator.
//!
//! # Per-account flow
//! ```text
//! Start → KeyResolved → BalanceChecked ─┬─→ Skipped
//!                                       └─→ NonceFetched → TransactionBuilt
//!                                             → Signed → Submitted
//! any step ──error──→ Failed
//! ```
//!
//! # Design Decisions
//! - One outcome per configured key, in configuration order
//! - A failing account never aborts the batch; there are no retries
//! - Keys are resolved inside the account's own step so a bad key only
//!   fails itself
//! - The chain ID is fetched at most once per operation, on first signing
//! - Concurrency is opt-in; the pacer stays global either way
//! - Sequential runs wait out the delay after each account finishes

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use futures_util::stream::{self, StreamExt};
use tokio::sync::OnceCell;

use crate::blockchain::client::ChainClient;
use crate::blockchain::contract::TokenContract;
use crate::blockchain::transaction::{TransferRequest, DEFAULT_TOKEN_GAS_LIMIT};
use crate::blockchain::types::ChainId;
use crate::blockchain::wallet::{AccountCredential, AccountSigner, KeyMaterial};
use crate::config::loader::ConfigError;
use crate::config::schema::CollectorConfig;
use crate::config::validation::{validate_keys, ValidationError};
use crate::observability::metrics;
use crate::sweep::outcome::{SweepError, SweepKind, SweepOutcome, SweepResult};
use crate::sweep::pacing::Pacer;
use crate::sweep::policy::{NativePolicy, SweepDecision, TokenPolicy};
use crate::sweep::report::SweepReport;

/// Fixed parameters of a collection run.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    /// Where every sweep sends funds.
    pub destination: Address,
    /// Flat fee price in wei per gas for every transaction.
    pub gas_price: U256,
    /// Gas limit for token transfer calls.
    pub token_gas_limit: u64,
    /// Minimum interval between account starts.
    pub pacing_delay: Duration,
    /// Accounts in flight at once.
    pub max_concurrency: usize,
}

impl CollectorSettings {
    pub fn new(destination: Address, gas_price: U256) -> Self {
        Self {
            destination,
            gas_price,
            token_gas_limit: DEFAULT_TOKEN_GAS_LIMIT,
            pacing_delay: Duration::from_secs(2),
            max_concurrency: 1,
        }
    }

    /// Settings from a validated configuration.
    pub fn from_config(config: &CollectorConfig) -> Result<Self, ConfigError> {
        let destination = config.collector.destination.parse::<Address>().map_err(|_| {
            ConfigError::Validation(vec![ValidationError::new(
                "collector.destination",
                "not a valid hex address",
            )])
        })?;

        Ok(Self {
            destination,
            gas_price: config.collector.gas_price_wei,
            token_gas_limit: config.token.gas_limit,
            pacing_delay: Duration::from_millis(config.pacing.delay_ms),
            max_concurrency: config.pacing.max_concurrency.max(1),
        })
    }

    /// Refuse key lists a run with these settings cannot process safely.
    ///
    /// With more than one account in flight, two keys for the same address
    /// could interleave nonce fetch and submission, so duplicates are refused.
    /// Sequential runs accept them; the second entry sees the first's effects.
    pub fn admit_keys(&self, keys: &[KeyMaterial]) -> Result<(), ConfigError> {
        if self.max_concurrency > 1 {
            validate_keys(keys).map_err(ConfigError::Validation)?;
        }
        Ok(())
    }
}

/// Sweeps every configured account into the destination.
pub struct Collector<C: ChainClient> {
    client: Arc<C>,
    settings: CollectorSettings,
    keys: Vec<KeyMaterial>,
    pacer: Pacer,
}

impl<C: ChainClient> Collector<C> {
    /// Create a collector over an ordered key list, checked by
    /// `CollectorSettings::admit_keys`.
    pub fn new(
        client: Arc<C>,
        settings: CollectorSettings,
        keys: Vec<KeyMaterial>,
    ) -> Result<Self, ConfigError> {
        settings.admit_keys(&keys)?;

        Ok(Self {
            client,
            pacer: Pacer::new(settings.pacing_delay),
            settings,
            keys,
        })
    }

    pub fn account_count(&self) -> usize {
        self.keys.len()
    }

    /// Move each account's full token balance if it reaches `minimum`.
    pub async fn sweep_tokens(&self, token: &TokenContract, minimum: U256) -> SweepReport {
        let policy = TokenPolicy::new(minimum);
        let chain_id = OnceCell::new();

        tracing::info!(
            token = %token.address(),
            destination = %self.settings.destination,
            accounts = self.keys.len(),
            minimum = %minimum,
            "Starting token sweep"
        );

        let chain_id = &chain_id;
        self.run(SweepKind::Token, move |index, key| {
            self.collect_token(index, key, token, policy, chain_id)
        })
        .await
    }

    /// Move each account's native balance minus fee and reserve.
    pub async fn sweep_native(&self, minimum: U256, reserve: U256) -> SweepReport {
        let policy = NativePolicy::new(minimum, reserve, self.settings.gas_price);
        let chain_id = OnceCell::new();

        tracing::info!(
            destination = %self.settings.destination,
            accounts = self.keys.len(),
            minimum = %minimum,
            reserve = %reserve,
            "Starting native sweep"
        );

        let chain_id = &chain_id;
        self.run(SweepKind::Native, move |index, key| {
            self.collect_native(index, key, policy, chain_id)
        })
        .await
    }

    /// Drive `per_account` over every key, paced, keeping configuration order.
    async fn run<'a, F, Fut>(&'a self, kind: SweepKind, per_account: F) -> SweepReport
    where
        F: Fn(usize, &'a KeyMaterial) -> Fut,
        Fut: Future<Output = SweepOutcome>,
    {
        let per_account = &per_account;
        let pacer = &self.pacer;
        let sequential = self.settings.max_concurrency == 1;

        let outcomes: Vec<SweepOutcome> = stream::iter(self.keys.iter().enumerate())
            .map(|(index, key)| async move {
                pacer.wait_turn().await;
                let outcome = per_account(index, key).await;
                if sequential {
                    pacer.finished().await;
                }
                outcome
            })
            .buffered(self.settings.max_concurrency)
            .collect()
            .await;

        let mut report = SweepReport::new(kind);
        for outcome in outcomes {
            metrics::record_outcome(kind.as_str(), outcome.status.label());
            if outcome.is_success() {
                metrics::record_swept(kind.as_str(), outcome.amount.unwrap_or_default());
            }
            report.push(outcome);
        }

        let summary = report.summary();
        tracing::info!(
            kind = kind.as_str(),
            submitted = summary.submitted,
            skipped = summary.skipped,
            failed = summary.failed,
            total = %summary.total_swept,
            "Sweep finished"
        );
        report
    }

    async fn collect_token(
        &self,
        index: usize,
        key: &KeyMaterial,
        token: &TokenContract,
        policy: TokenPolicy,
        chain_id: &OnceCell<ChainId>,
    ) -> SweepOutcome {
        let credential = match AccountCredential::from_key(key) {
            Ok(credential) => credential,
            Err(e) => return self.fail(SweepKind::Token, index, None, None, e.into()),
        };
        let source = credential.address();

        let balance = match token.query_balance(self.client.as_ref(), source).await {
            Ok(balance) => balance,
            Err(e) => return self.fail(SweepKind::Token, index, Some(source), None, e.into()),
        };

        let amount = match policy.decide(balance) {
            SweepDecision::Sweep { amount } => amount,
            SweepDecision::Skip(reason) => {
                tracing::info!(kind = "token", index, source = %source, %reason, "Account skipped");
                return SweepOutcome::skipped(index, source, balance, reason);
            }
        };

        let signer = credential.into_signer();
        let payload = token.transfer_payload(self.settings.destination, amount);
        let result = self
            .execute(&signer, chain_id, |nonce| {
                signer.token_transfer(
                    token.address(),
                    payload,
                    amount,
                    nonce,
                    self.settings.token_gas_limit,
                    self.settings.gas_price,
                )
            })
            .await;

        self.finish(SweepKind::Token, index, source, amount, result)
    }

    async fn collect_native(
        &self,
        index: usize,
        key: &KeyMaterial,
        policy: NativePolicy,
        chain_id: &OnceCell<ChainId>,
    ) -> SweepOutcome {
        let credential = match AccountCredential::from_key(key) {
            Ok(credential) => credential,
            Err(e) => return self.fail(SweepKind::Native, index, None, None, e.into()),
        };
        let source = credential.address();

        let balance = match self.client.balance_of(source).await {
            Ok(balance) => balance,
            Err(e) => return self.fail(SweepKind::Native, index, Some(source), None, e.into()),
        };

        let amount = match policy.decide(balance) {
            SweepDecision::Sweep { amount } => amount,
            SweepDecision::Skip(reason) => {
                tracing::info!(kind = "native", index, source = %source, %reason, "Account skipped");
                return SweepOutcome::skipped(index, source, balance, reason);
            }
        };

        let signer = credential.into_signer();
        let result = self
            .execute(&signer, chain_id, |nonce| {
                signer.native_transfer(
                    self.settings.destination,
                    amount,
                    nonce,
                    self.settings.gas_price,
                )
            })
            .await;

        self.finish(SweepKind::Native, index, source, amount, result)
    }

    /// NonceFetched → TransactionBuilt → Signed → Submitted.
    async fn execute<B>(
        &self,
        signer: &AccountSigner,
        chain_id: &OnceCell<ChainId>,
        build: B,
    ) -> SweepResult<TxHash>
    where
        B: FnOnce(u64) -> TransferRequest,
    {
        let nonce = self.client.pending_nonce_of(signer.address()).await?;
        let request = build(nonce);
        tracing::debug!(
            source = %signer.address(),
            nonce,
            amount = %request.swept_amount(),
            max_fee = %request.max_fee(),
            "Transfer built"
        );

        let chain_id = *chain_id
            .get_or_try_init(|| self.client.chain_id())
            .await?;

        let signed = signer.sign(&request, chain_id)?;
        let hash = self.client.submit(&signed).await?;

        Ok(hash)
    }

    fn finish(
        &self,
        kind: SweepKind,
        index: usize,
        source: Address,
        amount: U256,
        result: SweepResult<TxHash>,
    ) -> SweepOutcome {
        match result {
            Ok(tx_hash) => {
                tracing::info!(
                    kind = kind.as_str(),
                    index,
                    source = %source,
                    tx_hash = %tx_hash,
                    amount = %amount,
                    "Transfer submitted"
                );
                SweepOutcome::submitted(index, source, tx_hash, amount)
            }
            Err(e) => self.fail(kind, index, Some(source), Some(amount), e),
        }
    }

    fn fail(
        &self,
        kind: SweepKind,
        index: usize,
        source: Option<Address>,
        amount: Option<U256>,
        error: SweepError,
    ) -> SweepOutcome {
        tracing::warn!(
            kind = kind.as_str(),
            index,
            source = ?source,
            error = %error,
            "Account sweep failed"
        );
        SweepOutcome::failed(index, source, amount, error)
    }
}

impl<C: ChainClient> std::fmt::Debug for Collector<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("settings", &self.settings)
            .field("accounts", &self.keys.len())
            .finish_non_exhaustive()
    }
}
