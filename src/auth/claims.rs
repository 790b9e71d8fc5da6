// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims extracted from an identity-provider JWT.
///
/// Standard OIDC claims; the `sub` claim is the canonical user
/// identifier that wallet ownership is keyed by.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Issued at timestamp
    #[serde(default)]
    #[allow(dead_code)]
    pub iat: i64,

    /// Expiration timestamp
    #[serde(default)]
    pub exp: i64,

    /// Issuer
    #[serde(default)]
    pub iss: String,

    /// Audience (validated by the jsonwebtoken crate, not read directly)
    #[serde(default)]
    #[allow(dead_code)]
    pub aud: Option<serde_json::Value>,

    /// Session ID (provider-specific)
    #[serde(default)]
    pub sid: Option<String>,
}

/// Authenticated user information extracted from a verified JWT.
///
/// This is the type handlers receive; wallet ownership checks compare
/// against `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Canonical user ID (`sub` claim)
    pub user_id: String,

    /// Session ID (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Original issuer (used for logging, not serialized)
    #[serde(skip)]
    pub issuer: String,

    /// Token expiration (Unix timestamp, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Create from verified provider claims.
    pub fn from_claims(claims: ProviderClaims) -> Self {
        Self {
            user_id: claims.sub,
            session_id: claims.sid,
            issuer: claims.iss,
            expires_at: claims.exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_claims_extracts_identity() {
        let claims = ProviderClaims {
            sub: "user_123".to_string(),
            iat: 1700000000,
            exp: 1700003600,
            iss: "https://auth.example.com".to_string(),
            aud: None,
            sid: Some("sess_abc".to_string()),
        };

        let user = AuthenticatedUser::from_claims(claims);
        assert_eq!(user.user_id, "user_123");
        assert_eq!(user.session_id.as_deref(), Some("sess_abc"));
        assert_eq!(user.expires_at, 1700003600);
    }
}
