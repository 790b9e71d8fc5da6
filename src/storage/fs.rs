// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

//! JSON-file-backed wallet store.
//!
//! One file per wallet under `{root}/wallets/`. Writes go through a temp
//! file followed by an atomic rename, so a crash mid-write never leaves a
//! torn record on disk.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{StorageResult, StoredWallet, WalletStore};

/// File-backed wallet store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FsWalletStore {
    wallets_dir: PathBuf,
}

impl FsWalletStore {
    /// Create a store rooted at `data_dir`, creating the wallet directory
    /// if needed.
    pub fn new(data_dir: impl AsRef<Path>) -> StorageResult<Self> {
        let wallets_dir = data_dir.as_ref().join("wallets");
        fs::create_dir_all(&wallets_dir)?;
        Ok(Self { wallets_dir })
    }

    fn wallet_path(&self, wallet_id: &str) -> PathBuf {
        self.wallets_dir.join(format!("{wallet_id}.json"))
    }

    fn write_record(&self, wallet: &StoredWallet) -> StorageResult<()> {
        let path = self.wallet_path(&wallet.id);
        let temp_path = path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, wallet)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    fn read_record(&self, wallet_id: &str) -> StorageResult<Option<StoredWallet>> {
        let path = self.wallet_path(wallet_id);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let wallet = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(wallet))
    }
}

#[async_trait]
impl WalletStore for FsWalletStore {
    async fn save(&self, wallet: &StoredWallet) -> StorageResult<()> {
        self.write_record(wallet)
    }

    async fn load(&self, user_id: &str, wallet_id: &str) -> StorageResult<Option<StoredWallet>> {
        // Wallet IDs are UUIDs generated by this service; reject anything
        // that could traverse out of the wallets directory.
        if wallet_id.contains(['/', '\\', '.']) {
            return Ok(None);
        }

        match self.read_record(wallet_id)? {
            Some(wallet) if wallet.user_id == user_id => Ok(Some(wallet)),
            _ => Ok(None),
        }
    }

    async fn list_by_user(&self, user_id: &str) -> StorageResult<Vec<StoredWallet>> {
        let mut wallets = Vec::new();
        for entry in fs::read_dir(&self.wallets_dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let file = File::open(&path)?;
            let wallet: StoredWallet = serde_json::from_reader(BufReader::new(file))?;
            if wallet.user_id == user_id {
                wallets.push(wallet);
            }
        }
        wallets.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(wallets)
    }
}
