// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

//! # Chain Registry
//!
//! Static table of supported chains keyed by chain identifier. EVM chains
//! are identified by numeric chain IDs, other networks by case-sensitive
//! string network IDs. The table is built once at first use and never
//! mutated afterwards.
//!
//! Lookups are exact-match only. An unknown identifier yields `None`, not
//! an error, so callers can turn it into a user-facing validation failure.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

pub mod address;
pub mod rpc;

pub use address::{validate_address, AddressError};
pub use rpc::{resolve_endpoint, RpcError};

/// Category of blockchain sharing an address and transaction format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    Evm,
    Solana,
    Cosmos,
    Bitcoin,
    Flow,
    Starknet,
    Algorand,
    Sui,
    Spark,
    Tron,
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChainFamily::Evm => "evm",
            ChainFamily::Solana => "solana",
            ChainFamily::Cosmos => "cosmos",
            ChainFamily::Bitcoin => "bitcoin",
            ChainFamily::Flow => "flow",
            ChainFamily::Starknet => "starknet",
            ChainFamily::Algorand => "algorand",
            ChainFamily::Sui => "sui",
            ChainFamily::Spark => "spark",
            ChainFamily::Tron => "tron",
        };
        write!(f, "{name}")
    }
}

/// Chain identifier: numeric for EVM chains, string network ID otherwise.
///
/// The public API accepts either a JSON number or a JSON string. A string
/// that parses as an unsigned integer is normalized to the numeric form
/// before any registry lookup, so `"137"` and `137` address the same chain.
/// Non-numeric strings are matched case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChainId {
    /// Numeric EVM chain ID (EIP-155).
    Evm(u64),
    /// String network ID for non-EVM networks (e.g. `solana-mainnet`).
    Network(String),
}

impl ChainId {
    /// Normalize a string identifier: numeric strings become EVM chain IDs.
    pub fn from_str_normalized(value: &str) -> Self {
        match value.parse::<u64>() {
            Ok(n) => ChainId::Evm(n),
            Err(_) => ChainId::Network(value.to_string()),
        }
    }
}

impl From<u64> for ChainId {
    fn from(value: u64) -> Self {
        ChainId::Evm(value)
    }
}

impl From<&str> for ChainId {
    fn from(value: &str) -> Self {
        ChainId::from_str_normalized(value)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainId::Evm(id) => write!(f, "{id}"),
            ChainId::Network(id) => write!(f, "{id}"),
        }
    }
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ChainId::Evm(id) => serializer.serialize_u64(*id),
            ChainId::Network(id) => serializer.serialize_str(id),
        }
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(ChainId::Evm(n)),
            Raw::Text(s) => Ok(ChainId::from_str_normalized(&s)),
        }
    }
}

impl ToSchema for ChainId {}

impl utoipa::PartialSchema for ChainId {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        // Documented as a free-form value: number (EVM) or string (network ID).
        utoipa::openapi::ObjectBuilder::new()
            .description(Some(
                "Chain identifier: numeric EVM chain ID or string network ID",
            ))
            .into()
    }
}

/// Immutable metadata for a supported chain.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChainDescriptor {
    /// Canonical chain identifier (the form stored on wallets).
    pub chain_id: ChainId,
    /// Human-readable chain name.
    pub name: &'static str,
    /// Address/transaction format family.
    pub family: ChainFamily,
    /// Native currency ticker.
    pub native_currency: &'static str,
    /// Whether this is a test network.
    pub is_testnet: bool,
    /// Public default RPC endpoint, if one exists.
    pub default_rpc_url: Option<&'static str>,
}

fn evm(
    id: u64,
    name: &'static str,
    currency: &'static str,
    is_testnet: bool,
    default_rpc_url: Option<&'static str>,
) -> ChainDescriptor {
    ChainDescriptor {
        chain_id: ChainId::Evm(id),
        name,
        family: ChainFamily::Evm,
        native_currency: currency,
        is_testnet,
        default_rpc_url,
    }
}

fn solana(
    network_id: &'static str,
    name: &'static str,
    is_testnet: bool,
    default_rpc_url: &'static str,
) -> ChainDescriptor {
    ChainDescriptor {
        chain_id: ChainId::Network(network_id.to_string()),
        name,
        family: ChainFamily::Solana,
        native_currency: "SOL",
        is_testnet,
        default_rpc_url: Some(default_rpc_url),
    }
}

/// Solana clusters are reachable both by cluster name (`mainnet-beta`) and
/// by the wallet-provider network ID (`solana-mainnet`). The provider form
/// is canonical and is what gets stored on wallets.
const SOLANA_ALIASES: &[(&str, &str)] = &[
    ("mainnet-beta", "solana-mainnet"),
    ("devnet", "solana-devnet"),
    ("testnet", "solana-testnet"),
];

static REGISTRY: LazyLock<HashMap<ChainId, ChainDescriptor>> = LazyLock::new(|| {
    let descriptors = vec![
        evm(1, "Ethereum Mainnet", "ETH", false, Some("https://cloudflare-eth.com")),
        evm(11155111, "Ethereum Sepolia", "ETH", true, None),
        evm(42161, "Arbitrum One", "ETH", false, None),
        evm(421614, "Arbitrum Sepolia", "ETH", true, None),
        evm(8453, "Base Mainnet", "ETH", false, None),
        evm(84532, "Base Sepolia", "ETH", true, None),
        evm(10, "Optimism", "ETH", false, None),
        evm(11155420, "Optimism Sepolia", "ETH", true, None),
        evm(137, "Polygon", "POL", false, None),
        evm(80002, "Polygon Amoy", "POL", true, None),
        solana(
            "solana-mainnet",
            "Solana Mainnet",
            false,
            "https://api.mainnet-beta.solana.com",
        ),
        solana(
            "solana-devnet",
            "Solana Devnet",
            true,
            "https://api.devnet.solana.com",
        ),
        solana(
            "solana-testnet",
            "Solana Testnet",
            true,
            "https://api.testnet.solana.com",
        ),
    ];

    let mut table = HashMap::new();
    for descriptor in descriptors {
        table.insert(descriptor.chain_id.clone(), descriptor);
    }
    for (cluster, network_id) in SOLANA_ALIASES {
        let canonical = table
            .get(&ChainId::Network((*network_id).to_string()))
            .cloned()
            .expect("alias target must be registered");
        table.insert(ChainId::Network((*cluster).to_string()), canonical);
    }
    table
});

/// Look up the descriptor for a chain identifier. Exact match only.
pub fn lookup(chain_id: &ChainId) -> Option<&'static ChainDescriptor> {
    REGISTRY.get(chain_id)
}

/// Whether a chain identifier is in the supported set.
pub fn is_supported(chain_id: &ChainId) -> bool {
    REGISTRY.contains_key(chain_id)
}
