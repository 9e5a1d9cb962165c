//! Source account credentials and transaction signing.
//!
//! # Security
//! - Private keys are provisioned ONLY from the environment or a keys file
//! - Keys are never logged or serialized; `Debug` output is redacted
//! - A credential lives only for the duration of its account's sweep

use alloy::consensus::{SignableTransaction, TxEnvelope};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, U256};
use alloy::signers::local::PrivateKeySigner;
use thiserror::Error;

use crate::blockchain::transaction::{
    SignedTransaction, TransferKind, TransferRequest, NATIVE_TRANSFER_GAS,
};
use crate::blockchain::types::ChainId;

/// A private key exactly as provisioned, before derivation.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial(String);

impl KeyMaterial {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Raw key text. Only the resolver should need this.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyMaterial(<redacted>)")
    }
}

/// The key could not be turned into an account.
#[derive(Debug, Error)]
#[error("Invalid private key: {0}")]
pub struct KeyDerivationError(pub String);

/// Errors raised while signing.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The transaction declares a sender this signer is not authorized for.
    #[error("Not authorized to sign for {actual}: signer is bound to {expected}")]
    SenderMismatch { expected: Address, actual: Address },

    /// The fee price does not fit a legacy transaction.
    #[error("Gas price {0} exceeds the 128-bit fee field")]
    GasPriceOverflow(U256),

    /// The underlying signer failed.
    #[error("Signing failed: {0}")]
    Failed(String),
}

fn parse_signer(key: &KeyMaterial) -> Result<PrivateKeySigner, KeyDerivationError> {
    let raw = key.expose().trim();
    let key_hex = raw.strip_prefix("0x").unwrap_or(raw);

    key_hex
        .parse::<PrivateKeySigner>()
        .map_err(|e| KeyDerivationError(e.to_string()))
}

/// Derive the account address controlled by `key`.
///
/// Pure and deterministic. Fails when the text is not hex, has the wrong
/// length, or is not a valid secp256k1 secret scalar.
pub fn resolve_address(key: &KeyMaterial) -> Result<Address, KeyDerivationError> {
    parse_signer(key).map(|signer| signer.address())
}

/// A private key together with the address derived from it.
pub struct AccountCredential {
    signer: PrivateKeySigner,
}

impl AccountCredential {
    /// Derive a credential from raw key material.
    pub fn from_key(key: &KeyMaterial) -> Result<Self, KeyDerivationError> {
        Ok(Self {
            signer: parse_signer(key)?,
        })
    }

    /// The account address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Consume the credential into a signer bound to its address.
    pub fn into_signer(self) -> AccountSigner {
        AccountSigner {
            address: self.signer.address(),
            signer: self.signer,
        }
    }
}

impl std::fmt::Debug for AccountCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountCredential")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Signs transactions for exactly one account.
///
/// The (key, address) pair is fixed at construction; there is no way to
/// point an `AccountSigner` at a different sender.
pub struct AccountSigner {
    signer: PrivateKeySigner,
    address: Address,
}

impl AccountSigner {
    /// The address this signer is authorized for.
    pub fn address(&self) -> Address {
        self.address
    }

    /// A native currency transfer from this account.
    pub fn native_transfer(
        &self,
        to: Address,
        value: U256,
        nonce: u64,
        gas_price: U256,
    ) -> TransferRequest {
        TransferRequest {
            from: self.address,
            to,
            value,
            input: Bytes::new(),
            nonce,
            gas_limit: NATIVE_TRANSFER_GAS,
            gas_price,
            kind: TransferKind::Native,
        }
    }

    /// A token transfer call from this account.
    ///
    /// `contract` is the call target; `payload` the encoded `transfer`.
    pub fn token_transfer(
        &self,
        contract: Address,
        payload: Bytes,
        amount: U256,
        nonce: u64,
        gas_limit: u64,
        gas_price: U256,
    ) -> TransferRequest {
        TransferRequest {
            from: self.address,
            to: contract,
            value: U256::ZERO,
            input: payload,
            nonce,
            gas_limit,
            gas_price,
            kind: TransferKind::Token { amount },
        }
    }

    /// Sign `request` for `chain_id` using EIP-155 replay protection.
    pub fn sign(
        &self,
        request: &TransferRequest,
        chain_id: ChainId,
    ) -> Result<SignedTransaction, SigningError> {
        if request.from != self.address {
            return Err(SigningError::SenderMismatch {
                expected: self.address,
                actual: request.from,
            });
        }

        let gas_price = u128::try_from(request.gas_price)
            .map_err(|_| SigningError::GasPriceOverflow(request.gas_price))?;

        let mut tx = request.to_legacy(chain_id, gas_price);
        let signature = self
            .signer
            .sign_transaction_sync(&mut tx)
            .map_err(|e| SigningError::Failed(e.to_string()))?;

        let envelope: TxEnvelope = tx.into_signed(signature).into();
        let hash = *envelope.tx_hash();
        let raw = Bytes::from(envelope.encoded_2718());

        tracing::debug!(
            from = %self.address,
            nonce = request.nonce,
            chain_id = chain_id.0,
            tx_hash = %hash,
            "Transaction signed"
        );

        Ok(SignedTransaction {
            from: self.address,
            to: request.to,
            nonce: request.nonce,
            kind: request.kind,
            envelope,
            raw,
            hash,
        })
    }
}

impl std::fmt::Debug for AccountSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    fn destination() -> Address {
        "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse().unwrap()
    }

    #[test]
    fn test_resolve_address() {
        let address = resolve_address(&KeyMaterial::new(TEST_PRIVATE_KEY)).unwrap();
        assert_eq!(address.to_string().to_lowercase(), TEST_ADDRESS);
    }

    #[test]
    fn test_resolve_with_0x_prefix() {
        let key = KeyMaterial::new(format!("0x{}", TEST_PRIVATE_KEY));
        let address = resolve_address(&key).unwrap();
        assert_eq!(address.to_string().to_lowercase(), TEST_ADDRESS);
        // Deterministic across calls.
        assert_eq!(resolve_address(&key).unwrap(), address);
    }

    #[test]
    fn test_invalid_keys() {
        for bad in ["invalid_key", "0x1234", "", &"00".repeat(32)] {
            let err = resolve_address(&KeyMaterial::new(bad)).unwrap_err();
            assert!(err.to_string().contains("Invalid private key"));
        }
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = KeyMaterial::new(TEST_PRIVATE_KEY);
        assert!(!format!("{:?}", key).contains(TEST_PRIVATE_KEY));

        let credential = AccountCredential::from_key(&key).unwrap();
        let text = format!("{:?}", credential);
        assert!(!text.contains(TEST_PRIVATE_KEY));
        assert!(text.to_lowercase().contains(TEST_ADDRESS));
    }

    #[test]
    fn test_sign_binds_chain_id_and_sender() {
        let signer = AccountCredential::from_key(&KeyMaterial::new(TEST_PRIVATE_KEY))
            .unwrap()
            .into_signer();
        let request = signer.native_transfer(destination(), U256::from(1000), 7, U256::from(1));

        let signed = signer.sign(&request, ChainId(31337)).unwrap();
        assert_eq!(signed.from, signer.address());
        assert_eq!(signed.nonce, 7);

        let legacy = signed.envelope.as_legacy().unwrap();
        assert_eq!(legacy.tx().chain_id, Some(31337));
        assert_eq!(legacy.tx().gas_limit, NATIVE_TRANSFER_GAS);

        let recovered = legacy
            .signature()
            .recover_address_from_prehash(&legacy.signature_hash())
            .unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[test]
    fn test_same_transfer_differs_per_chain() {
        let signer = AccountCredential::from_key(&KeyMaterial::new(TEST_PRIVATE_KEY))
            .unwrap()
            .into_signer();
        let request = signer.native_transfer(destination(), U256::from(1), 0, U256::from(1));

        let mainnet = signer.sign(&request, ChainId(1)).unwrap();
        let local = signer.sign(&request, ChainId(31337)).unwrap();
        assert_ne!(mainnet.hash, local.hash);
    }

    #[test]
    fn test_sign_rejects_foreign_sender() {
        let signer = AccountCredential::from_key(&KeyMaterial::new(TEST_PRIVATE_KEY))
            .unwrap()
            .into_signer();
        let mut request = signer.native_transfer(destination(), U256::from(1), 0, U256::from(1));
        request.from = destination();

        let err = signer.sign(&request, ChainId(1)).unwrap_err();
        assert!(matches!(
            err,
            SigningError::SenderMismatch { expected, actual }
                if expected == signer.address() && actual == destination()
        ));
    }

    #[test]
    fn test_sign_rejects_oversized_gas_price() {
        let signer = AccountCredential::from_key(&KeyMaterial::new(TEST_PRIVATE_KEY))
            .unwrap()
            .into_signer();
        let request = signer.native_transfer(destination(), U256::from(1), 0, U256::MAX);
        assert!(matches!(
            signer.sign(&request, ChainId(1)),
            Err(SigningError::GasPriceOverflow(_))
        ));
    }
}
