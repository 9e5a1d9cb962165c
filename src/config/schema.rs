//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the collector.
//! All types derive Serde traits for deserialization from config files.
//! Private keys are deliberately absent: they are provisioned separately
//! (see `config::keys`).

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Root configuration for a collection run.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CollectorConfig {
    /// RPC endpoint settings.
    pub rpc: RpcConfig,

    /// Destination, fee price and key provisioning.
    pub collector: SweepTargetConfig,

    /// Token sweep settings.
    pub token: TokenSweepConfig,

    /// Native currency sweep settings.
    pub native: NativeSweepConfig,

    /// Pacing between accounts.
    pub pacing: PacingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// JSON-RPC endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Primary JSON-RPC endpoint URL.
    pub url: String,

    /// Failover JSON-RPC endpoint URLs, tried in order.
    pub failover_urls: Vec<String>,

    /// When set, the connected chain must report this ID.
    pub expected_chain_id: Option<u64>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            expected_chain_id: None,
            timeout_secs: 10,
        }
    }
}

/// Where swept funds go and how transactions are priced.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SweepTargetConfig {
    /// Hex-encoded destination address.
    pub destination: String,

    /// Flat fee price in wei per gas unit, applied to every transaction.
    #[serde(with = "amount")]
    pub gas_price_wei: U256,

    /// Environment variable holding comma or newline separated private keys.
    pub key_env: String,

    /// Optional file with one private key per line.
    pub keys_file: Option<String>,
}

impl Default for SweepTargetConfig {
    fn default() -> Self {
        Self {
            destination: String::new(),
            gas_price_wei: U256::from(20_000_000_000u64), // 20 gwei
            key_env: crate::config::keys::DEFAULT_KEY_ENV_VAR.to_string(),
            keys_file: None,
        }
    }
}

/// Token sweep configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenSweepConfig {
    /// Hex-encoded token contract address.
    pub contract: String,

    /// Minimum token balance (smallest unit) worth sweeping.
    #[serde(with = "amount")]
    pub min_amount: U256,

    /// Gas limit for a token transfer.
    pub gas_limit: u64,
}

impl Default for TokenSweepConfig {
    fn default() -> Self {
        Self {
            contract: String::new(),
            min_amount: U256::from(1_000_000_000_000_000_000u64), // 1 token at 18 decimals
            gas_limit: crate::blockchain::transaction::DEFAULT_TOKEN_GAS_LIMIT,
        }
    }
}

/// Native currency sweep configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NativeSweepConfig {
    /// Minimum amount (wei) that must remain to move after fee and reserve.
    #[serde(with = "amount")]
    pub min_amount: U256,

    /// Amount (wei) left behind in every source account.
    #[serde(with = "amount")]
    pub reserve_amount: U256,
}

impl Default for NativeSweepConfig {
    fn default() -> Self {
        Self {
            min_amount: U256::from(100_000_000_000_000_000u64),    // 0.1
            reserve_amount: U256::from(50_000_000_000_000_000u64), // 0.05
        }
    }
}

/// Request pacing against the shared endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Minimum delay between the start of successive accounts, in milliseconds.
    pub delay_ms: u64,

    /// Accounts processed at once. 1 keeps the run strictly sequential.
    pub max_concurrency: usize,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            delay_ms: 2000,
            max_concurrency: 1,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the compact format.
    pub json_logs: bool,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9091".to_string(),
        }
    }
}

/// Serde helpers for `U256` amounts.
///
/// TOML integers stop at `i64::MAX`, so amounts may also be written as
/// decimal (or `0x` hex) strings.
pub mod amount {
    use alloy::primitives::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Int(v) => Ok(U256::from(v)),
            Raw::Text(s) => U256::from_str(s.trim())
                .map_err(|e| de::Error::custom(format!("invalid amount '{}': {}", s, e))),
        }
    }
}
