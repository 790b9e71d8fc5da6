// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup and
//! validated eagerly: the process refuses to start when the encryption
//! key is missing or malformed or the signer credentials are absent.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ENCRYPTION_KEY` | 64 hex chars keying key-share envelopes | Required |
//! | `SIGNER_API_URL` | Custodial key service base URL | Required |
//! | `SIGNER_API_TOKEN` | Bearer token for the key service | Required |
//! | `ALCHEMY_API_KEY` | Provider key for RPC resolution | Optional |
//! | `RPC_URL_<id>` | Per-chain RPC override | Optional |
//! | `AUTH_JWKS_URL` | JWKS endpoint for JWT verification | Dev mode when unset |
//! | `AUTH_ISSUER` | Expected JWT issuer claim | Optional |
//! | `AUTH_AUDIENCE` | Expected JWT audience claim | Optional |
//! | `DATA_DIR` | Root directory for the wallet store | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Environment variable name for the envelope encryption key.
pub const ENCRYPTION_KEY_ENV: &str = "ENCRYPTION_KEY";
/// Environment variable name for the signer service base URL.
pub const SIGNER_API_URL_ENV: &str = "SIGNER_API_URL";
/// Environment variable name for the signer service bearer token.
pub const SIGNER_API_TOKEN_ENV: &str = "SIGNER_API_TOKEN";
/// Environment variable name for the Alchemy API key.
pub const ALCHEMY_API_KEY_ENV: &str = "ALCHEMY_API_KEY";
/// Prefix for per-chain RPC override variables (`RPC_URL_<chain id>`).
pub const RPC_URL_PREFIX: &str = "RPC_URL_";
/// Environment variable name for the wallet store root directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Configuration errors. All fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("ENCRYPTION_KEY must be exactly 64 hex characters")]
    InvalidEncryptionKey,

    #[error("PORT must be a valid port number")]
    InvalidPort,
}

/// Logging output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Validated runtime configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// 64-char hex key for key-share envelopes. Never logged.
    pub encryption_key: String,
    pub signer_api_url: String,
    pub signer_api_token: String,
    pub alchemy_api_key: Option<String>,
    /// Per-chain RPC overrides keyed by chain identifier string.
    pub rpc_overrides: HashMap<String, String>,
    pub auth_jwks_url: Option<String>,
    pub auth_issuer: Option<String>,
    pub auth_audience: Option<String>,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Secrets are redacted; everything else is fair game.
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("data_dir", &self.data_dir)
            .field("encryption_key", &"<redacted>")
            .field("signer_api_url", &self.signer_api_url)
            .field("signer_api_token", &"<redacted>")
            .field(
                "alchemy_api_key",
                &self.alchemy_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("rpc_overrides", &self.rpc_overrides.keys())
            .field("auth_jwks_url", &self.auth_jwks_url)
            .field("auth_issuer", &self.auth_issuer)
            .field("auth_audience", &self.auth_audience)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl AppConfig {
    /// Load and validate configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let encryption_key = require(ENCRYPTION_KEY_ENV)?;
        validate_encryption_key(&encryption_key)?;

        let signer_api_url = require(SIGNER_API_URL_ENV)?;
        let signer_api_token = require(SIGNER_API_TOKEN_ENV)?;

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort)?,
            Err(_) => 8080,
        };

        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            data_dir: env::var(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/data")),
            encryption_key,
            signer_api_url,
            signer_api_token,
            alchemy_api_key: env::var(ALCHEMY_API_KEY_ENV).ok().filter(|v| !v.is_empty()),
            rpc_overrides: collect_rpc_overrides(env::vars()),
            auth_jwks_url: env::var("AUTH_JWKS_URL").ok().filter(|v| !v.is_empty()),
            auth_issuer: env::var("AUTH_ISSUER").ok().filter(|v| !v.is_empty()),
            auth_audience: env::var("AUTH_AUDIENCE").ok().filter(|v| !v.is_empty()),
            log_format,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

/// Exactly 64 hex characters (32 bytes). Checked at startup, not first use.
fn validate_encryption_key(key: &str) -> Result<(), ConfigError> {
    if key.len() != 64 || !key.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::InvalidEncryptionKey);
    }
    Ok(())
}

/// Collect `RPC_URL_<id>` overrides into a chain-id-keyed map.
fn collect_rpc_overrides(vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
    vars.filter_map(|(name, value)| {
        let id = name.strip_prefix(RPC_URL_PREFIX)?;
        if id.is_empty() || value.is_empty() {
            return None;
        }
        Some((id.to_string(), value))
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encryption_key_validation() {
        assert!(validate_encryption_key(&"a".repeat(64)).is_ok());
        assert_eq!(
            validate_encryption_key(&"a".repeat(63)),
            Err(ConfigError::InvalidEncryptionKey)
        );
        assert_eq!(
            validate_encryption_key(&"z".repeat(64)),
            Err(ConfigError::InvalidEncryptionKey)
        );
        assert_eq!(
            validate_encryption_key(""),
            Err(ConfigError::InvalidEncryptionKey)
        );
    }

    #[test]
    fn rpc_overrides_are_collected_by_chain_id() {
        let vars = vec![
            ("RPC_URL_1".to_string(), "https://rpc.one".to_string()),
            (
                "RPC_URL_solana-mainnet".to_string(),
                "https://rpc.sol".to_string(),
            ),
            ("RPC_URL_".to_string(), "ignored".to_string()),
            ("RPC_URL_2".to_string(), String::new()),
            ("UNRELATED".to_string(), "x".to_string()),
        ];

        let overrides = collect_rpc_overrides(vars.into_iter());
        assert_eq!(overrides.len(), 2);
        assert_eq!(overrides["1"], "https://rpc.one");
        assert_eq!(overrides["solana-mainnet"], "https://rpc.sol");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_dir: PathBuf::from("/data"),
            encryption_key: "a".repeat(64),
            signer_api_url: "https://signer.example.com".to_string(),
            signer_api_token: "super-secret".to_string(),
            alchemy_api_key: Some("alchemy-secret".to_string()),
            rpc_overrides: HashMap::new(),
            auth_jwks_url: None,
            auth_issuer: None,
            auth_audience: None,
            log_format: LogFormat::Pretty,
        };

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("alchemy-secret"));
        assert!(!rendered.contains(&"a".repeat(64)));
    }
}
