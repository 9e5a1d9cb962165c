//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that addresses and URLs parse
//! - Validate value ranges (gas price > 0, gas limit covers a transfer)
//! - Detect duplicate source keys
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure: CollectorConfig → Result<(), Vec<ValidationError>>
//! - The token contract is only checked when set; native-only runs leave it empty

use std::collections::HashSet;

use alloy::primitives::{Address, U256};

use crate::blockchain::transaction::NATIVE_TRANSFER_GAS;
use crate::blockchain::wallet::{resolve_address, KeyMaterial};
use crate::config::schema::CollectorConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &CollectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.rpc.url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new("rpc.url", "not a valid URL"));
    }
    for (i, failover) in config.rpc.failover_urls.iter().enumerate() {
        if failover.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new(
                format!("rpc.failover_urls[{}]", i),
                "not a valid URL",
            ));
        }
    }
    if config.rpc.timeout_secs == 0 {
        errors.push(ValidationError::new("rpc.timeout_secs", "must be > 0"));
    }

    if config.collector.destination.parse::<Address>().is_err() {
        errors.push(ValidationError::new(
            "collector.destination",
            "not a valid hex address",
        ));
    }
    if config.collector.gas_price_wei == U256::ZERO {
        errors.push(ValidationError::new("collector.gas_price_wei", "must be > 0"));
    }
    if u128::try_from(config.collector.gas_price_wei).is_err() {
        errors.push(ValidationError::new(
            "collector.gas_price_wei",
            "does not fit a 128-bit fee price",
        ));
    }

    if !config.token.contract.is_empty() && config.token.contract.parse::<Address>().is_err() {
        errors.push(ValidationError::new("token.contract", "not a valid hex address"));
    }
    if config.token.gas_limit < NATIVE_TRANSFER_GAS {
        errors.push(ValidationError::new(
            "token.gas_limit",
            format!("must be at least {}", NATIVE_TRANSFER_GAS),
        ));
    }

    if config.pacing.max_concurrency == 0 {
        errors.push(ValidationError::new("pacing.max_concurrency", "must be >= 1"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "not a valid socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Reject key lists where two entries control the same address.
///
/// Concurrent sweeps rely on every account owning its nonce sequence.
/// Malformed keys are left alone here; they fail their own account at sweep time.
pub fn validate_keys(keys: &[KeyMaterial]) -> Result<(), Vec<ValidationError>> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for (i, key) in keys.iter().enumerate() {
        if let Ok(address) = resolve_address(key) {
            if !seen.insert(address) {
                errors.push(ValidationError::new(
                    format!("keys[{}]", i),
                    format!("duplicate key for {}", address),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
