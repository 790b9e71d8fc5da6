// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Custodia

//! Key-share envelope cryptography.

pub mod encryption;

pub use encryption::{DecryptionError, EncryptionError, EncryptionService, InvalidKeyError};
