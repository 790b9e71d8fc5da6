// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

//! AES-256-GCM envelope encryption for custodial key shares at rest.
//!
//! ## Envelope Format
//!
//! ```text
//! {iv_base64}:{tag_base64}:{ciphertext_base64}
//! ```
//!
//! A fresh 12-byte nonce is generated per encrypt call and embedded in the
//! envelope together with the 16-byte authentication tag, so decryption is
//! self-contained. The 32-byte key comes from configuration as a 64-char
//! hex string, validated at startup; it is zeroized on drop and never
//! logged.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// GCM nonce length in bytes.
const NONCE_LEN: usize = 12;
/// GCM authentication tag length in bytes.
const TAG_LEN: usize = 16;

/// The configured encryption key is not exactly 64 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("encryption key must be exactly 64 hex characters (32 bytes)")]
pub struct InvalidKeyError;

/// Envelope encryption failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("key share encryption failed")]
pub struct EncryptionError;

/// Envelope decryption failed: malformed envelope or key mismatch.
///
/// Deliberately carries no detail. A tampered ciphertext, a truncated
/// envelope, and a rotated key are indistinguishable to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("key share decryption failed")]
pub struct DecryptionError;

/// 32-byte symmetric key, zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
struct EncryptionKey([u8; 32]);

/// Authenticated symmetric encryption for key-share material.
pub struct EncryptionService {
    key: EncryptionKey,
}

impl EncryptionService {
    /// Build the service from a 64-character hex key string.
    pub fn from_hex_key(hex_key: &str) -> Result<Self, InvalidKeyError> {
        if hex_key.len() != 64 {
            return Err(InvalidKeyError);
        }

        let bytes = hex::decode(hex_key).map_err(|_| InvalidKeyError)?;
        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);

        Ok(Self {
            key: EncryptionKey(key),
        })
    }

    /// Encrypt a plaintext into a self-contained envelope string.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let cipher = Aes256Gcm::new_from_slice(&self.key.0).map_err(|_| EncryptionError)?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let mut sealed = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| EncryptionError)?;

        // aes-gcm appends the tag to the ciphertext; split it out so the
        // envelope carries the three parts separately.
        let tag = sealed.split_off(sealed.len() - TAG_LEN);

        Ok(format!(
            "{}:{}:{}",
            BASE64.encode(nonce),
            BASE64.encode(tag),
            BASE64.encode(sealed)
        ))
    }

    /// Decrypt an envelope string back into the plaintext.
    ///
    /// Returns [`DecryptionError`] for any malformed envelope, tag mismatch,
    /// or key mismatch. Never returns partially decrypted data.
    pub fn decrypt(&self, envelope: &str) -> Result<Zeroizing<String>, DecryptionError> {
        let mut parts = envelope.split(':');
        let (iv_b64, tag_b64, ct_b64) = match (parts.next(), parts.next(), parts.next(), parts.next())
        {
            (Some(iv), Some(tag), Some(ct), None) => (iv, tag, ct),
            _ => return Err(DecryptionError),
        };

        let iv = BASE64.decode(iv_b64).map_err(|_| DecryptionError)?;
        let tag = BASE64.decode(tag_b64).map_err(|_| DecryptionError)?;
        let ciphertext = BASE64.decode(ct_b64).map_err(|_| DecryptionError)?;

        if iv.len() != NONCE_LEN || tag.len() != TAG_LEN {
            return Err(DecryptionError);
        }

        let cipher = Aes256Gcm::new_from_slice(&self.key.0).map_err(|_| DecryptionError)?;
        let nonce = Nonce::from_slice(&iv);

        let mut sealed = ciphertext;
        sealed.extend_from_slice(&tag);

        let plaintext = cipher
            .decrypt(nonce, sealed.as_slice())
            .map_err(|_| DecryptionError)?;

        String::from_utf8(plaintext)
            .map(Zeroizing::new)
            .map_err(|_| DecryptionError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    fn service() -> EncryptionService {
        EncryptionService::from_hex_key(TEST_KEY).unwrap()
    }

    #[test]
    fn round_trip_preserves_plaintext() {
        let svc = service();
        for plaintext in [
            "",
            "hello",
            r#"["share-1","share-2"]"#,
            "unicode: \u{1F511} \u{00e9}\u{00e8}",
        ] {
            let envelope = svc.encrypt(plaintext).unwrap();
            let decrypted = svc.decrypt(&envelope).unwrap();
            assert_eq!(&*decrypted, plaintext);
        }
    }

    #[test]
    fn round_trip_multi_kilobyte_plaintext() {
        let svc = service();
        let plaintext = "x".repeat(64 * 1024);
        let envelope = svc.encrypt(&plaintext).unwrap();
        assert_eq!(&*svc.decrypt(&envelope).unwrap(), &plaintext);
    }

    #[test]
    fn envelope_has_three_base64_parts() {
        let svc = service();
        let envelope = svc.encrypt("payload").unwrap();
        let parts: Vec<&str> = envelope.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(BASE64.decode(parts[0]).unwrap().len(), NONCE_LEN);
        assert_eq!(BASE64.decode(parts[1]).unwrap().len(), TAG_LEN);
    }

    #[test]
    fn fresh_nonce_per_call() {
        let svc = service();
        let a = svc.encrypt("same input").unwrap();
        let b = svc.encrypt("same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn tampered_ciphertext_fails_closed() {
        let svc = service();
        let envelope = svc.encrypt("sensitive").unwrap();
        let parts: Vec<&str> = envelope.split(':').collect();

        let mut ct = BASE64.decode(parts[2]).unwrap();
        ct[0] ^= 0x01;
        let tampered = format!("{}:{}:{}", parts[0], parts[1], BASE64.encode(ct));

        assert!(svc.decrypt(&tampered).is_err());
    }

    #[test]
    fn tampered_tag_fails_closed() {
        let svc = service();
        let envelope = svc.encrypt("sensitive").unwrap();
        let parts: Vec<&str> = envelope.split(':').collect();

        let mut tag = BASE64.decode(parts[1]).unwrap();
        tag[TAG_LEN - 1] ^= 0x80;
        let tampered = format!("{}:{}:{}", parts[0], BASE64.encode(tag), parts[2]);

        assert!(svc.decrypt(&tampered).is_err());
    }

    #[test]
    fn malformed_envelopes_fail() {
        let svc = service();
        for bad in ["", "abc", "a:b", "a:b:c:d", "!!!:???:###"] {
            assert!(svc.decrypt(bad).is_err(), "input {bad:?}");
        }
    }

    #[test]
    fn wrong_key_fails() {
        let svc = service();
        let other = EncryptionService::from_hex_key(
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
        )
        .unwrap();

        let envelope = svc.encrypt("secret").unwrap();
        assert!(other.decrypt(&envelope).is_err());
    }

    #[test]
    fn key_validation_rejects_bad_lengths_and_non_hex() {
        assert!(EncryptionService::from_hex_key("").is_err());
        assert!(EncryptionService::from_hex_key("abcd").is_err());
        assert!(EncryptionService::from_hex_key(&"a".repeat(63)).is_err());
        assert!(EncryptionService::from_hex_key(&"a".repeat(65)).is_err());
        assert!(EncryptionService::from_hex_key(&"g".repeat(64)).is_err());
        assert!(EncryptionService::from_hex_key(&"a".repeat(64)).is_ok());
    }
}
