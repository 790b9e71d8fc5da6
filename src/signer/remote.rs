// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

//! HTTP client for the custodial key-management service.
//!
//! The service exposes a small REST surface: account creation, message
//! signing, and transaction signing/broadcast. Requests authenticate with
//! a bearer token from configuration. Timeouts live here; the wallet
//! layer never retries.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CreatedAccount, ExternalSigner, SignerError, TransactionPayload};
use crate::chains::{ChainFamily, ChainId};

/// Per-request timeout for signer calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed signer client.
#[derive(Clone)]
pub struct RemoteSignerClient {
    base_url: String,
    api_token: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountRequest<'a> {
    chain_family: ChainFamily,
    network: &'a ChainId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountResponse {
    address: String,
    external_key_shares: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignMessageRequest<'a> {
    key_shares: &'a [String],
    message: &'a str,
}

#[derive(Deserialize)]
struct SignMessageResponse {
    signature: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignTransactionRequest<'a> {
    key_shares: &'a [String],
    #[serde(flatten)]
    payload: &'a TransactionPayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignTransactionResponse {
    transaction_hash: String,
}

impl RemoteSignerClient {
    /// Create a client for the key service at `base_url`.
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    async fn post_json<Req: Serialize, Resp: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp, SignerError> {
        let url = format!("{}{path}", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await
            .map_err(|e| SignerError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Body text is diagnostic only; key shares never appear in
            // service error messages.
            let message = response.text().await.unwrap_or_default();
            return Err(SignerError::Service {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| SignerError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ExternalSigner for RemoteSignerClient {
    async fn create_account(
        &self,
        family: ChainFamily,
        network: &ChainId,
    ) -> Result<CreatedAccount, SignerError> {
        let response: CreateAccountResponse = self
            .post_json(
                "/v1/accounts",
                &CreateAccountRequest {
                    chain_family: family,
                    network,
                },
            )
            .await?;

        Ok(CreatedAccount {
            address: response.address,
            external_key_shares: response.external_key_shares,
        })
    }

    async fn sign_message(
        &self,
        address: &str,
        key_shares: &[String],
        message: &str,
    ) -> Result<String, SignerError> {
        let response: SignMessageResponse = self
            .post_json(
                &format!("/v1/accounts/{address}/sign"),
                &SignMessageRequest {
                    key_shares,
                    message,
                },
            )
            .await?;

        Ok(response.signature)
    }

    async fn sign_transaction(
        &self,
        address: &str,
        key_shares: &[String],
        payload: &TransactionPayload,
    ) -> Result<String, SignerError> {
        let response: SignTransactionResponse = self
            .post_json(
                &format!("/v1/accounts/{address}/transactions"),
                &SignTransactionRequest {
                    key_shares,
                    payload,
                },
            )
            .await?;

        Ok(response.transaction_hash)
    }
}
