// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

//! RPC endpoint resolution.
//!
//! Preference order: Alchemy (when an API key is configured and the chain
//! has a known network slug), then the chain's public default RPC URL.
//! Per-chain `RPC_URL_<id>` environment overrides take precedence over
//! both; they are collected at config load and checked by the caller
//! before this resolver runs.

use thiserror::Error;

use super::{lookup, ChainFamily, ChainId};

/// RPC resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("no RPC endpoint available for chain {0}")]
    NoEndpointAvailable(String),
}

/// EVM chain ID to Alchemy network slug.
const ALCHEMY_EVM_SLUGS: &[(u64, &str)] = &[
    (1, "eth-mainnet"),
    (11155111, "eth-sepolia"),
    (42161, "arb-mainnet"),
    (421614, "arb-sepolia"),
    (8453, "base-mainnet"),
    (84532, "base-sepolia"),
    (10, "opt-mainnet"),
    (11155420, "opt-sepolia"),
    (137, "polygon-mainnet"),
    (80002, "polygon-amoy"),
];

/// Solana network ID to Alchemy network slug.
const ALCHEMY_SOLANA_SLUGS: &[(&str, &str)] = &[
    ("solana-mainnet", "solana-mainnet"),
    ("solana-devnet", "solana-devnet"),
    ("solana-testnet", "solana-testnet"),
    // Cluster-name aliases resolve to the same slugs.
    ("mainnet-beta", "solana-mainnet"),
    ("devnet", "solana-devnet"),
    ("testnet", "solana-testnet"),
];

/// Build the Alchemy RPC URL for a chain, if Alchemy supports it.
///
/// Returns `None` for registered chains without a slug mapping; the caller
/// then degrades to the chain's default RPC URL.
fn alchemy_rpc_url(chain_id: &ChainId, api_key: &str) -> Option<String> {
    let descriptor = lookup(chain_id)?;

    let slug = match (&descriptor.family, chain_id) {
        (ChainFamily::Evm, ChainId::Evm(id)) => ALCHEMY_EVM_SLUGS
            .iter()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, slug)| *slug),
        (ChainFamily::Solana, ChainId::Network(id)) => ALCHEMY_SOLANA_SLUGS
            .iter()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, slug)| *slug),
        _ => None,
    }?;

    Some(format!("https://{slug}.g.alchemy.com/v2/{api_key}"))
}

/// Resolve an RPC endpoint for a chain.
///
/// With an API key, Alchemy is preferred; otherwise (or for chains Alchemy
/// does not cover) the registry's default RPC URL is used. A chain with
/// neither fails with [`RpcError::NoEndpointAvailable`].
pub fn resolve_endpoint(chain_id: &ChainId, api_key: Option<&str>) -> Result<String, RpcError> {
    if let Some(key) = api_key {
        if let Some(url) = alchemy_rpc_url(chain_id, key) {
            return Ok(url);
        }
    }

    if let Some(url) = lookup(chain_id).and_then(|d| d.default_rpc_url) {
        return Ok(url.to_string());
    }

    Err(RpcError::NoEndpointAvailable(chain_id.to_string()))
}
