// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use custodia_server::api::router;
use custodia_server::auth::JwksManager;
use custodia_server::config::{AppConfig, LogFormat};
use custodia_server::crypto::EncryptionService;
use custodia_server::signer::RemoteSignerClient;
use custodia_server::state::{AppState, AuthConfig};
use custodia_server::storage::FsWalletStore;
use custodia_server::wallet::WalletService;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);

    let encryption = match EncryptionService::from_hex_key(&config.encryption_key) {
        Ok(encryption) => encryption,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let store = match FsWalletStore::new(&config.data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("failed to open wallet store at {:?}: {e}", config.data_dir);
            return ExitCode::FAILURE;
        }
    };

    let signer = RemoteSignerClient::new(&config.signer_api_url, &config.signer_api_token);

    let service = WalletService::new(
        Arc::new(store),
        Arc::new(signer),
        encryption,
        config.alchemy_api_key.clone(),
        config.rpc_overrides.clone(),
    );

    let auth_config = AuthConfig {
        jwks: config.auth_jwks_url.as_deref().map(JwksManager::new),
        issuer: config.auth_issuer.clone(),
        audience: config.auth_audience.clone(),
    };

    if auth_config.jwks.is_none() {
        tracing::warn!("AUTH_JWKS_URL not set, running with unverified tokens (development mode)");
    }

    let app = router(AppState::new(service, auth_config));

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("invalid bind address {}:{}: {e}", config.host, config.port);
            return ExitCode::FAILURE;
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("failed to bind {addr}: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%addr, "custodia server listening (docs at /docs)");

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("server error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
