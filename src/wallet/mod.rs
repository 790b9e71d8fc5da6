// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

//! # Wallet Operations
//!
//! Orchestration of the three custodial operations: create wallet, sign
//! message, send transaction. Every operation is a single request/response
//! cycle with no state carried between calls.
//!
//! ## Ordering Guarantee
//!
//! All input validation (chain support, address format, amount) completes
//! before any signer or network call is issued, so malformed requests
//! never reach the external signer or consume its rate limit.
//!
//! ## Key-Share Handling
//!
//! Decrypted key shares live only for the duration of one operation. They
//! are held in zeroizing buffers, passed to the signer by reference, and
//! wiped on every exit path. They never appear in logs or errors.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::chains::{self, AddressError, ChainId, RpcError};
use crate::crypto::EncryptionService;
use crate::signer::{ExternalSigner, SignerError, TransactionPayload};
use crate::storage::{StorageError, StoredWallet, WalletStore};

/// Wallet operation errors.
///
/// Distinguishable kinds so the HTTP layer can map them to status codes
/// deterministically. Validation failures are always detected locally,
/// before the external signer is involved.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("invalid amount: must be a positive finite number")]
    InvalidAmount,

    #[error("wallet {0} not found")]
    WalletNotFound(String),

    /// Stored key-share envelope failed to decrypt. Fatal: indicates key
    /// rotation drift or data corruption, never retryable.
    #[error("wallet key shares are corrupted or the encryption key has changed")]
    KeyShareCorrupted,

    #[error(transparent)]
    ExternalSigner(#[from] SignerError),

    #[error(transparent)]
    NoEndpoint(#[from] RpcError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Custodial wallet operation service.
///
/// Stateless between requests; safe to share across concurrent
/// operations. Holds no locks and performs no retries.
pub struct WalletService {
    store: Arc<dyn WalletStore>,
    signer: Arc<dyn ExternalSigner>,
    encryption: EncryptionService,
    alchemy_api_key: Option<String>,
    /// Per-chain RPC overrides (`RPC_URL_<id>`), collected at config load.
    rpc_overrides: HashMap<String, String>,
}

impl WalletService {
    pub fn new(
        store: Arc<dyn WalletStore>,
        signer: Arc<dyn ExternalSigner>,
        encryption: EncryptionService,
        alchemy_api_key: Option<String>,
        rpc_overrides: HashMap<String, String>,
    ) -> Self {
        Self {
            store,
            signer,
            encryption,
            alchemy_api_key,
            rpc_overrides,
        }
    }

    /// Create a new custodial wallet on the given chain.
    ///
    /// Not idempotent: a signer failure is propagated without retry, and
    /// retrying on the caller's side risks duplicate wallet creation.
    pub async fn create_wallet(
        &self,
        user_id: &str,
        chain_id: &ChainId,
    ) -> Result<StoredWallet, WalletError> {
        let descriptor = chains::lookup(chain_id)
            .ok_or_else(|| WalletError::UnsupportedChain(chain_id.to_string()))?;

        let account = self
            .signer
            .create_account(descriptor.family, &descriptor.chain_id)
            .await?;

        // The signer must hand back an address matching the family's
        // format; anything else is a broken response, not a stored wallet.
        chains::validate_address(&account.address, descriptor.family).map_err(|e| {
            WalletError::ExternalSigner(SignerError::InvalidResponse(format!(
                "signer returned malformed address: {e}"
            )))
        })?;

        let shares_json = Zeroizing::new(
            serde_json::to_string(&account.external_key_shares)
                .map_err(|e| WalletError::Internal(e.to_string()))?,
        );
        let envelope = self
            .encryption
            .encrypt(&shares_json)
            .map_err(|e| WalletError::Internal(e.to_string()))?;

        let wallet = StoredWallet {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            address: account.address,
            encrypted_key_share: envelope,
            chain_family: descriptor.family,
            network: descriptor.chain_id.clone(),
            created_at: Utc::now(),
        };

        self.store.save(&wallet).await?;

        tracing::info!(
            wallet_id = %wallet.id,
            chain = %wallet.network,
            family = %wallet.chain_family,
            "wallet created"
        );

        Ok(wallet)
    }

    /// Sign an arbitrary message with a wallet's key shares.
    pub async fn sign_message(
        &self,
        user_id: &str,
        wallet_id: &str,
        message: &str,
    ) -> Result<String, WalletError> {
        let wallet = self.load_wallet(user_id, wallet_id).await?;
        let shares = self.decrypt_key_shares(&wallet)?;

        let signature = self
            .signer
            .sign_message(&wallet.address, &shares, message)
            .await?;

        Ok(signature)
    }

    /// Sign and broadcast a transaction; returns the transaction hash.
    pub async fn send_transaction(
        &self,
        user_id: &str,
        wallet_id: &str,
        to: &str,
        amount: f64,
        data: Option<String>,
    ) -> Result<String, WalletError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(WalletError::InvalidAmount);
        }

        let wallet = self.load_wallet(user_id, wallet_id).await?;
        chains::validate_address(to, wallet.chain_family)?;

        let rpc_url = self.resolve_rpc(&wallet.network)?;
        let shares = self.decrypt_key_shares(&wallet)?;

        let payload = TransactionPayload {
            to: to.trim().to_string(),
            amount,
            data,
            rpc_url: Some(rpc_url),
        };

        let tx_hash = self
            .signer
            .sign_transaction(&wallet.address, &shares, &payload)
            .await?;

        tracing::info!(
            wallet_id = %wallet.id,
            chain = %wallet.network,
            tx_hash = %tx_hash,
            "transaction submitted"
        );

        Ok(tx_hash)
    }

    /// List a user's wallets.
    pub async fn list_wallets(&self, user_id: &str) -> Result<Vec<StoredWallet>, WalletError> {
        Ok(self.store.list_by_user(user_id).await?)
    }

    /// Fetch a single wallet, owner-scoped.
    pub async fn get_wallet(
        &self,
        user_id: &str,
        wallet_id: &str,
    ) -> Result<StoredWallet, WalletError> {
        self.load_wallet(user_id, wallet_id).await
    }

    async fn load_wallet(
        &self,
        user_id: &str,
        wallet_id: &str,
    ) -> Result<StoredWallet, WalletError> {
        self.store
            .load(user_id, wallet_id)
            .await?
            .ok_or_else(|| WalletError::WalletNotFound(wallet_id.to_string()))
    }

    /// Decrypt a wallet's key-share envelope into a zeroizing buffer.
    fn decrypt_key_shares(
        &self,
        wallet: &StoredWallet,
    ) -> Result<Zeroizing<Vec<String>>, WalletError> {
        let shares_json = self
            .encryption
            .decrypt(&wallet.encrypted_key_share)
            .map_err(|_| WalletError::KeyShareCorrupted)?;

        let shares: Vec<String> =
            serde_json::from_str(&shares_json).map_err(|_| WalletError::KeyShareCorrupted)?;

        Ok(Zeroizing::new(shares))
    }

    /// RPC endpoint for a chain: env override first, then the resolver.
    fn resolve_rpc(&self, chain_id: &ChainId) -> Result<String, WalletError> {
        if let Some(url) = self.rpc_overrides.get(&chain_id.to_string()) {
            return Ok(url.clone());
        }
        Ok(chains::resolve_endpoint(
            chain_id,
            self.alchemy_api_key.as_deref(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::chains::ChainFamily;
    use crate::signer::CreatedAccount;
    use crate::storage::InMemoryWalletStore;

    const TEST_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
    const EVM_ADDR: &str = "0xAbC4567890123456789012345678901234567890";
    const SOLANA_ADDR: &str = "DYw8jCTfwHNRJhhmFcbXvVDTqWMEVFBX6ZKUmG5CNSKK";
    const RECIPIENT: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0";

    /// Scripted signer that counts calls and records the last payload.
    #[derive(Default)]
    struct MockSigner {
        calls: AtomicUsize,
        fail: bool,
        last_payload: Mutex<Option<TransactionPayload>>,
    }

    impl MockSigner {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ExternalSigner for MockSigner {
        async fn create_account(
            &self,
            family: ChainFamily,
            _network: &ChainId,
        ) -> Result<CreatedAccount, SignerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SignerError::Service {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            let address = match family {
                ChainFamily::Solana => SOLANA_ADDR.to_string(),
                _ => EVM_ADDR.to_string(),
            };
            Ok(CreatedAccount {
                address,
                external_key_shares: vec!["share-a".to_string(), "share-b".to_string()],
            })
        }

        async fn sign_message(
            &self,
            _address: &str,
            key_shares: &[String],
            message: &str,
        ) -> Result<String, SignerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SignerError::Transport("down".to_string()));
            }
            Ok(format!("sig({message},{})", key_shares.len()))
        }

        async fn sign_transaction(
            &self,
            _address: &str,
            _key_shares: &[String],
            payload: &TransactionPayload,
        ) -> Result<String, SignerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SignerError::Transport("down".to_string()));
            }
            *self.last_payload.lock().unwrap() = Some(payload.clone());
            Ok("0xtxhash".to_string())
        }
    }

    fn service_with(signer: Arc<MockSigner>) -> WalletService {
        WalletService::new(
            Arc::new(InMemoryWalletStore::new()),
            signer,
            EncryptionService::from_hex_key(TEST_KEY).unwrap(),
            None,
            HashMap::new(),
        )
    }

    #[tokio::test]
    async fn create_wallet_persists_encrypted_shares() {
        let signer = Arc::new(MockSigner::default());
        let svc = service_with(signer.clone());

        let wallet = svc
            .create_wallet("user-1", &ChainId::Evm(421614))
            .await
            .unwrap();

        assert_eq!(wallet.address, EVM_ADDR);
        assert_eq!(wallet.network, ChainId::Evm(421614));
        assert_eq!(wallet.chain_family, ChainFamily::Evm);
        chains::validate_address(&wallet.address, wallet.chain_family).unwrap();

        // Stored envelope decrypts back to the original shares.
        let encryption = EncryptionService::from_hex_key(TEST_KEY).unwrap();
        let decrypted = encryption.decrypt(&wallet.encrypted_key_share).unwrap();
        let shares: Vec<String> = serde_json::from_str(&decrypted).unwrap();
        assert_eq!(shares, vec!["share-a", "share-b"]);

        // And the wallet is readable through the service.
        let fetched = svc.get_wallet("user-1", &wallet.id).await.unwrap();
        assert_eq!(fetched.id, wallet.id);
    }

    #[tokio::test]
    async fn create_wallet_rejects_unsupported_chain_before_signer() {
        let signer = Arc::new(MockSigner::default());
        let svc = service_with(signer.clone());

        let err = svc
            .create_wallet("user-1", &ChainId::Evm(999_999_999))
            .await
            .unwrap_err();

        assert!(matches!(err, WalletError::UnsupportedChain(_)));
        assert_eq!(signer.call_count(), 0);
    }

    #[tokio::test]
    async fn create_wallet_propagates_signer_failure_without_retry() {
        let signer = Arc::new(MockSigner::failing());
        let svc = service_with(signer.clone());

        let err = svc
            .create_wallet("user-1", &ChainId::Evm(1))
            .await
            .unwrap_err();

        assert!(matches!(err, WalletError::ExternalSigner(_)));
        assert_eq!(signer.call_count(), 1);
    }

    #[tokio::test]
    async fn sign_message_round_trips_through_decrypted_shares() {
        let signer = Arc::new(MockSigner::default());
        let svc = service_with(signer.clone());

        let wallet = svc.create_wallet("user-1", &ChainId::Evm(1)).await.unwrap();
        let signature = svc
            .sign_message("user-1", &wallet.id, "hello")
            .await
            .unwrap();

        assert_eq!(signature, "sig(hello,2)");
    }

    #[tokio::test]
    async fn sign_message_unknown_wallet_fails() {
        let signer = Arc::new(MockSigner::default());
        let svc = service_with(signer.clone());

        let err = svc
            .sign_message("user-1", "nope", "hello")
            .await
            .unwrap_err();

        assert!(matches!(err, WalletError::WalletNotFound(id) if id == "nope"));
        assert_eq!(signer.call_count(), 0);
    }

    #[tokio::test]
    async fn sign_message_is_owner_scoped() {
        let signer = Arc::new(MockSigner::default());
        let svc = service_with(signer.clone());

        let wallet = svc.create_wallet("user-1", &ChainId::Evm(1)).await.unwrap();
        let err = svc
            .sign_message("user-2", &wallet.id, "hello")
            .await
            .unwrap_err();

        assert!(matches!(err, WalletError::WalletNotFound(_)));
    }

    #[tokio::test]
    async fn corrupted_envelope_is_fatal() {
        let signer = Arc::new(MockSigner::default());
        let store = Arc::new(InMemoryWalletStore::new());
        let svc = WalletService::new(
            store.clone(),
            signer.clone(),
            EncryptionService::from_hex_key(TEST_KEY).unwrap(),
            None,
            HashMap::new(),
        );

        let mut wallet = svc.create_wallet("user-1", &ChainId::Evm(1)).await.unwrap();
        wallet.encrypted_key_share = "not:an:envelope".to_string();
        store.save(&wallet).await.unwrap();
        let created_calls = signer.call_count();

        let err = svc
            .sign_message("user-1", &wallet.id, "hello")
            .await
            .unwrap_err();

        assert!(matches!(err, WalletError::KeyShareCorrupted));
        assert_eq!(signer.call_count(), created_calls);
    }

    #[tokio::test]
    async fn send_rejects_malformed_address_before_signer() {
        let signer = Arc::new(MockSigner::default());
        let svc = service_with(signer.clone());

        let wallet = svc.create_wallet("user-1", &ChainId::Evm(1)).await.unwrap();
        let calls_after_create = signer.call_count();

        let err = svc
            .send_transaction("user-1", &wallet.id, "not-an-address", 1.0, None)
            .await
            .unwrap_err();

        assert!(matches!(err, WalletError::InvalidAddress(_)));
        assert_eq!(signer.call_count(), calls_after_create);
    }

    #[tokio::test]
    async fn send_rejects_bad_amounts_before_any_call() {
        let signer = Arc::new(MockSigner::default());
        let svc = service_with(signer.clone());

        let wallet = svc.create_wallet("user-1", &ChainId::Evm(1)).await.unwrap();
        let calls_after_create = signer.call_count();

        for amount in [-5.0, 0.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = svc
                .send_transaction("user-1", &wallet.id, RECIPIENT, amount, None)
                .await
                .unwrap_err();
            assert!(matches!(err, WalletError::InvalidAmount), "amount {amount}");
        }
        assert_eq!(signer.call_count(), calls_after_create);
    }

    #[tokio::test]
    async fn send_returns_tx_hash_and_passes_rpc_endpoint() {
        let signer = Arc::new(MockSigner::default());
        let svc = service_with(signer.clone());

        // Ethereum mainnet resolves to its default RPC without a key.
        let wallet = svc.create_wallet("user-1", &ChainId::Evm(1)).await.unwrap();
        let tx_hash = svc
            .send_transaction("user-1", &wallet.id, RECIPIENT, 1.5, None)
            .await
            .unwrap();

        assert_eq!(tx_hash, "0xtxhash");
        let payload = signer.last_payload.lock().unwrap().clone().unwrap();
        assert_eq!(payload.to, RECIPIENT);
        assert_eq!(payload.amount, 1.5);
        assert_eq!(payload.rpc_url.as_deref(), Some("https://cloudflare-eth.com"));
    }

    #[tokio::test]
    async fn send_prefers_rpc_override() {
        let signer = Arc::new(MockSigner::default());
        let mut overrides = HashMap::new();
        overrides.insert("1".to_string(), "https://rpc.internal:8545".to_string());

        let svc = WalletService::new(
            Arc::new(InMemoryWalletStore::new()),
            signer.clone(),
            EncryptionService::from_hex_key(TEST_KEY).unwrap(),
            Some("alchemy-key".to_string()),
            overrides,
        );

        let wallet = svc.create_wallet("user-1", &ChainId::Evm(1)).await.unwrap();
        svc.send_transaction("user-1", &wallet.id, RECIPIENT, 0.1, None)
            .await
            .unwrap();

        let payload = signer.last_payload.lock().unwrap().clone().unwrap();
        assert_eq!(payload.rpc_url.as_deref(), Some("https://rpc.internal:8545"));
    }

    #[tokio::test]
    async fn send_fails_when_no_endpoint_available() {
        let signer = Arc::new(MockSigner::default());
        let svc = service_with(signer.clone());

        // Sepolia: no default RPC, no Alchemy key, no override.
        let wallet = svc
            .create_wallet("user-1", &ChainId::Evm(11155111))
            .await
            .unwrap();
        let calls_after_create = signer.call_count();

        let err = svc
            .send_transaction("user-1", &wallet.id, RECIPIENT, 1.0, None)
            .await
            .unwrap_err();

        assert!(matches!(err, WalletError::NoEndpoint(_)));
        assert_eq!(signer.call_count(), calls_after_create);
    }

    #[tokio::test]
    async fn list_wallets_is_owner_scoped() {
        let signer = Arc::new(MockSigner::default());
        let svc = service_with(signer.clone());

        svc.create_wallet("user-1", &ChainId::Evm(1)).await.unwrap();
        let sol = svc
            .create_wallet("user-1", &ChainId::from("solana-devnet"))
            .await
            .unwrap();
        assert_eq!(sol.chain_family, ChainFamily::Solana);
        assert_eq!(sol.network, ChainId::Network("solana-devnet".to_string()));

        let wallets = svc.list_wallets("user-1").await.unwrap();
        assert_eq!(wallets.len(), 2);
        assert!(svc.list_wallets("user-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn solana_wallet_created_via_cluster_alias_stores_canonical_network() {
        let signer = Arc::new(MockSigner::default());
        let svc = service_with(signer.clone());

        let wallet = svc
            .create_wallet("user-1", &ChainId::from("mainnet-beta"))
            .await
            .unwrap();

        assert_eq!(wallet.network, ChainId::Network("solana-mainnet".to_string()));
        chains::validate_address(&wallet.address, wallet.chain_family).unwrap();
    }
}
