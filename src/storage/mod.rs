// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

//! # Wallet Persistence
//!
//! Wallet records are small immutable JSON documents: written once at
//! creation, read on every sign/send operation, never mutated. The
//! `encrypted_key_share` field always holds an AES-256-GCM envelope;
//! plaintext key material never reaches this layer.
//!
//! ## Storage Layout (file-backed store)
//!
//! ```text
//! {DATA_DIR}/
//!   wallets/
//!     {wallet_id}.json
//! ```
//!
//! All queries are scoped by owning user: a wallet ID belonging to a
//! different user behaves exactly like a missing wallet.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chains::{ChainFamily, ChainId};

pub mod fs;
pub mod memory;

pub use fs::FsWalletStore;
pub use memory::InMemoryWalletStore;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Persisted wallet record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredWallet {
    /// Unique wallet identifier (UUID).
    pub id: String,
    /// Owning user identity.
    pub user_id: String,
    /// Chain-family-formatted account address.
    pub address: String,
    /// Key-share envelope (`iv:tag:ciphertext`, base64 parts). Never
    /// stored or logged in plaintext.
    pub encrypted_key_share: String,
    /// Address/transaction format family.
    pub chain_family: ChainFamily,
    /// Canonical chain identifier.
    pub network: ChainId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Wallet record store.
///
/// Implementations must serialize concurrent access at the record level;
/// the wallet layer holds no locks of its own.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Persist a newly created wallet.
    async fn save(&self, wallet: &StoredWallet) -> StorageResult<()>;

    /// Load a wallet by ID, scoped to its owner. `None` when the ID is
    /// unknown or owned by a different user.
    async fn load(&self, user_id: &str, wallet_id: &str) -> StorageResult<Option<StoredWallet>>;

    /// List all wallets owned by a user.
    async fn list_by_user(&self, user_id: &str) -> StorageResult<Vec<StoredWallet>>;
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;

    pub fn sample_wallet(id: &str, user_id: &str) -> StoredWallet {
        StoredWallet {
            id: id.to_string(),
            user_id: user_id.to_string(),
            address: "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0".to_string(),
            encrypted_key_share: "aXY=:dGFn:Y3Q=".to_string(),
            chain_family: ChainFamily::Evm,
            network: ChainId::Evm(421614),
            created_at: Utc::now(),
        }
    }
}
