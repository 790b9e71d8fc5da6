// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

//! Address format validation per chain family.
//!
//! Validation is pure string checking: no checksum verification, no curve
//! checks, no network I/O. Families without a dedicated rule fall back to
//! EVM-style hex validation, mirroring the behavior of the wallet provider
//! integration this service fronts.

use thiserror::Error;

use super::ChainFamily;

/// Reasons an address fails format validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address required")]
    Required,

    #[error("invalid EVM address format (must be 0x followed by 40 hex characters)")]
    InvalidEvmFormat,

    #[error("invalid Solana address format (must be 32-44 base58 characters)")]
    InvalidSolanaFormat,
}

/// Validate an address string against a chain family's format rules.
///
/// The input is trimmed first; an empty or whitespace-only address is
/// rejected with [`AddressError::Required`] before any format check runs.
pub fn validate_address(address: &str, family: ChainFamily) -> Result<(), AddressError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(AddressError::Required);
    }

    match family {
        ChainFamily::Solana => validate_solana(address),
        _ => validate_evm(address),
    }
}

/// `0x` prefix plus exactly 40 hex characters. No checksum validation.
fn validate_evm(address: &str) -> Result<(), AddressError> {
    let hex_part = address
        .strip_prefix("0x")
        .ok_or(AddressError::InvalidEvmFormat)?;

    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AddressError::InvalidEvmFormat);
    }

    Ok(())
}

/// Base58 alphabet (no `0`, `I`, `O`, `l`), 32-44 characters inclusive.
fn validate_solana(address: &str) -> Result<(), AddressError> {
    if !(32..=44).contains(&address.len()) {
        return Err(AddressError::InvalidSolanaFormat);
    }

    if bs58::decode(address).into_vec().is_err() {
        return Err(AddressError::InvalidSolanaFormat);
    }

    Ok(())
}
