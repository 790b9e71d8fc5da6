// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

//! Custodia - Chain-Abstracted Custodial Wallet Service
//!
//! This crate provides a custodial wallet service over an external MPC
//! key service, with a static chain registry abstracting EVM networks
//! and Solana clusters behind one wallet API.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Authentication (identity-provider JWT)
//! - `chains` - Chain registry, address validation, RPC resolution
//! - `crypto` - Key-share envelope encryption (AES-256-GCM)
//! - `signer` - External key service client
//! - `storage` - Wallet record persistence
//! - `wallet` - Wallet operation orchestration

pub mod api;
pub mod auth;
pub mod chains;
pub mod config;
pub mod crypto;
pub mod error;
pub mod signer;
pub mod state;
pub mod storage;
pub mod wallet;
