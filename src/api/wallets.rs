// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    auth::Auth,
    chains::{ChainFamily, ChainId},
    error::ApiError,
    state::AppState,
    storage::StoredWallet,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateWalletRequest {
    /// Chain to create the wallet on. Accepts a numeric EVM chain ID
    /// (as number or string) or a named network like `solana-mainnet`.
    #[serde(rename = "chainId")]
    pub chain_id: ChainId,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignMessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignMessageResponse {
    pub signature: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendTransactionRequest {
    /// Destination address, validated against the wallet's chain family.
    pub to: String,
    /// Amount in the chain's native currency.
    pub amount: f64,
    /// Optional hex-encoded call data.
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SendTransactionResponse {
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
}

/// Wallet representation returned to clients.
///
/// The encrypted key-share envelope never leaves the server.
#[derive(Debug, Serialize, ToSchema)]
pub struct WalletResponse {
    pub id: String,
    pub address: String,
    #[serde(rename = "chainFamily")]
    pub chain_family: ChainFamily,
    pub network: ChainId,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<StoredWallet> for WalletResponse {
    fn from(wallet: StoredWallet) -> Self {
        Self {
            id: wallet.id,
            address: wallet.address,
            chain_family: wallet.chain_family,
            network: wallet.network,
            created_at: wallet.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/wallets",
    request_body = CreateWalletRequest,
    tag = "Wallets",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = WalletResponse),
        (status = 400, description = "Unsupported chain"),
        (status = 502, description = "Key service unavailable")
    )
)]
pub async fn create_wallet(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<CreateWalletRequest>,
) -> Result<(StatusCode, Json<WalletResponse>), ApiError> {
    let wallet = state
        .wallets
        .create_wallet(&user.user_id, &request.chain_id)
        .await?;
    Ok((StatusCode::CREATED, Json(wallet.into())))
}

#[utoipa::path(
    get,
    path = "/v1/wallets",
    tag = "Wallets",
    security(("bearer_auth" = [])),
    responses((status = 200, body = [WalletResponse]))
)]
pub async fn list_wallets(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<Vec<WalletResponse>>, ApiError> {
    let wallets = state.wallets.list_wallets(&user.user_id).await?;
    Ok(Json(wallets.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/v1/wallets/{wallet_id}",
    params(("wallet_id" = String, Path, description = "Wallet identifier")),
    tag = "Wallets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = WalletResponse),
        (status = 404, description = "Wallet not found")
    )
)]
pub async fn get_wallet(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(wallet_id): Path<String>,
) -> Result<Json<WalletResponse>, ApiError> {
    let wallet = state.wallets.get_wallet(&user.user_id, &wallet_id).await?;
    Ok(Json(wallet.into()))
}

#[utoipa::path(
    post,
    path = "/v1/wallets/{wallet_id}/sign",
    params(("wallet_id" = String, Path, description = "Wallet identifier")),
    request_body = SignMessageRequest,
    tag = "Wallets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = SignMessageResponse),
        (status = 404, description = "Wallet not found"),
        (status = 502, description = "Key service unavailable")
    )
)]
pub async fn sign_message(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(wallet_id): Path<String>,
    Json(request): Json<SignMessageRequest>,
) -> Result<Json<SignMessageResponse>, ApiError> {
    let signature = state
        .wallets
        .sign_message(&user.user_id, &wallet_id, &request.message)
        .await?;
    Ok(Json(SignMessageResponse { signature }))
}

#[utoipa::path(
    post,
    path = "/v1/wallets/{wallet_id}/send",
    params(("wallet_id" = String, Path, description = "Wallet identifier")),
    request_body = SendTransactionRequest,
    tag = "Wallets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = SendTransactionResponse),
        (status = 400, description = "Invalid recipient or amount"),
        (status = 404, description = "Wallet not found"),
        (status = 502, description = "Key service or RPC unavailable")
    )
)]
pub async fn send_transaction(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(wallet_id): Path<String>,
    Json(request): Json<SendTransactionRequest>,
) -> Result<Json<SendTransactionResponse>, ApiError> {
    let transaction_hash = state
        .wallets
        .send_transaction(
            &user.user_id,
            &wallet_id,
            &request.to,
            request.amount,
            request.data,
        )
        .await?;
    Ok(Json(SendTransactionResponse { transaction_hash }))
}
