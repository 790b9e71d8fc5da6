// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

use std::sync::Arc;

use crate::auth::JwksManager;
use crate::wallet::WalletService;

/// JWT verification settings shared by the request extractor.
///
/// When `jwks` is `None` the server runs in development mode and accepts
/// unverified tokens.
#[derive(Clone, Default)]
pub struct AuthConfig {
    pub jwks: Option<JwksManager>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub wallets: Arc<WalletService>,
    pub auth_config: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(wallets: WalletService, auth_config: AuthConfig) -> Self {
        Self {
            wallets: Arc::new(wallets),
            auth_config: Arc::new(auth_config),
        }
    }
}
