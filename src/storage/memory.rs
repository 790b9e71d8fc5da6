// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

//! In-memory wallet store for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StorageResult, StoredWallet, WalletStore};

/// HashMap-backed wallet store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryWalletStore {
    wallets: RwLock<HashMap<String, StoredWallet>>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn save(&self, wallet: &StoredWallet) -> StorageResult<()> {
        self.wallets
            .write()
            .await
            .insert(wallet.id.clone(), wallet.clone());
        Ok(())
    }

    async fn load(&self, user_id: &str, wallet_id: &str) -> StorageResult<Option<StoredWallet>> {
        let wallets = self.wallets.read().await;
        Ok(wallets
            .get(wallet_id)
            .filter(|w| w.user_id == user_id)
            .cloned())
    }

    async fn list_by_user(&self, user_id: &str) -> StorageResult<Vec<StoredWallet>> {
        let wallets = self.wallets.read().await;
        let mut owned: Vec<StoredWallet> = wallets
            .values()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_fixtures::sample_wallet;

    #[tokio::test]
    async fn save_and_load() {
        let store = InMemoryWalletStore::new();
        let wallet = sample_wallet("w1", "user-1");
        store.save(&wallet).await.unwrap();

        assert_eq!(store.load("user-1", "w1").await.unwrap(), Some(wallet));
        assert!(store.load("user-2", "w1").await.unwrap().is_none());
        assert!(store.load("user-1", "w2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_owner_scoped() {
        let store = InMemoryWalletStore::new();
        store.save(&sample_wallet("w1", "user-1")).await.unwrap();
        store.save(&sample_wallet("w2", "user-2")).await.unwrap();

        let wallets = store.list_by_user("user-1").await.unwrap();
        assert_eq!(wallets.len(), 1);
        assert_eq!(wallets[0].id, "w1");
    }
}
