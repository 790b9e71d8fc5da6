// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

//! External signer abstraction.
//!
//! Actual cryptographic operations happen in an external custodial
//! key-management service holding counterpart key shares under a
//! threshold-signature scheme. This module treats that service as an
//! opaque capability: create an account, sign a message, sign and
//! broadcast a transaction. The threshold protocol itself is vendor
//! internals and is not modeled here.
//!
//! No retries are performed at this layer. Create/sign/send are not
//! guaranteed idempotent by the service, so retry policy belongs to the
//! caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chains::{ChainFamily, ChainId};

pub mod remote;

pub use remote::RemoteSignerClient;

/// Errors from the external signer service.
#[derive(Debug, Error)]
pub enum SignerError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("signer request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("signer service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    /// The service answered 2xx but the body was not understood.
    #[error("unexpected signer response: {0}")]
    InvalidResponse(String),
}

/// Result of creating a key-share account with the external signer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedAccount {
    /// Chain-family-formatted account address.
    pub address: String,
    /// Key shares held on behalf of this service. Stored encrypted;
    /// required for every subsequent signing operation.
    pub external_key_shares: Vec<String>,
}

/// Transaction payload forwarded to the signer for signing/broadcast.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    /// Recipient address, already validated against the chain family.
    pub to: String,
    /// Amount in the chain's native unit.
    pub amount: f64,
    /// Optional calldata (EVM) or memo payload, hex-encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// RPC endpoint the signer should broadcast through, when it needs
    /// one explicitly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
}

/// Interface to the custodial key-management service.
///
/// Implementations must be safe to share across concurrent wallet
/// operations; each call is independent.
#[async_trait]
pub trait ExternalSigner: Send + Sync {
    /// Generate a new key-share account for a chain family.
    async fn create_account(
        &self,
        family: ChainFamily,
        network: &ChainId,
    ) -> Result<CreatedAccount, SignerError>;

    /// Sign an arbitrary message with the account's key shares.
    async fn sign_message(
        &self,
        address: &str,
        key_shares: &[String],
        message: &str,
    ) -> Result<String, SignerError>;

    /// Sign and broadcast a transaction; returns the transaction hash.
    async fn sign_transaction(
        &self,
        address: &str,
        key_shares: &[String],
        payload: &TransactionPayload,
    ) -> Result<String, SignerError>;
}
