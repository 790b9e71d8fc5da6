// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

//! # Authentication Module
//!
//! Bearer JWT authentication for the wallet API.
//!
//! ## Auth Flow
//!
//! 1. The frontend authenticates the user with the identity provider
//! 2. The frontend sends `Authorization: Bearer <JWT>`
//! 3. This service:
//!    - Fetches the provider JWKS via HTTPS (cached with TTL)
//!    - Verifies signature, expiry, issuer, audience
//!    - Extracts `sub` as the canonical `user_id`
//!
//! ## Modes
//!
//! - **Production** (`AUTH_JWKS_URL` set): full signature verification
//! - **Development** (unset): structure validation only, no signature
//!   check. Never enable in production builds.

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;

pub use claims::AuthenticatedUser;
pub use error::AuthError;
pub use extractor::Auth;
pub use jwks::JwksManager;
