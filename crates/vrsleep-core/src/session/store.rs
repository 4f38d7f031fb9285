//! Encrypted-at-rest persistence for the authentication session.
//!
//! The session file is one JSON blob whose payload is encrypted with
//! XChaCha20-Poly1305; the 256-bit file key never touches disk and lives in
//! the OS credential store (Keychain / Credential Manager / Secret Service).

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use keyring::Entry;
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

use super::Session;

const FILE_NAME: &str = "auth.json";
const SERVICE_NAME: &str = "dev.vrsleep.app";
const KEY_NAME: &str = "session-key";

#[derive(Serialize, Deserialize)]
struct EncryptedBlob {
    nonce: String,
    data: String,
}

/// Stores the [`Session`] as a single encrypted file.
///
/// `load` fails closed: a missing file, a missing key, or any decryption or
/// parse failure all read as "no session". `save` fails loudly when the host
/// has no usable credential store, because writing an unencrypted credential
/// file is not allowed.
pub struct SessionStore {
    path: PathBuf,
    cache: Mutex<Option<Option<Session>>>,
}

impl SessionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(FILE_NAME),
            cache: Mutex::new(None),
        }
    }

    /// Load the persisted session, if any. Never errors: callers must treat
    /// absence as "must log in again".
    pub fn load(&self) -> Option<Session> {
        let mut cache = self.cache.lock();
        if let Some(cached) = cache.as_ref() {
            return cached.clone();
        }
        let loaded = self.load_from_disk();
        *cache = Some(loaded.clone());
        loaded
    }

    fn load_from_disk(&self) -> Option<Session> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let blob: EncryptedBlob = serde_json::from_str(&raw).ok()?;
        let nonce = BASE64.decode(blob.nonce).ok()?;
        let ciphertext = BASE64.decode(blob.data).ok()?;
        if nonce.len() != 24 {
            return None;
        }

        let key = self.encryption_key(false).ok()??;
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&key));
        let plaintext = cipher
            .decrypt(XNonce::from_slice(&nonce), ciphertext.as_slice())
            .ok()?;
        serde_json::from_slice(&plaintext).ok()
    }

    /// Encrypt and persist the session, updating the in-memory cache.
    pub fn save(&self, session: &Session) -> Result<()> {
        let key = self
            .encryption_key(true)?
            .ok_or(CoreError::EncryptionUnavailable)?;

        let plaintext = serde_json::to_vec(session).map_err(CoreError::storage)?;
        let mut nonce = [0u8; 24];
        OsRng.fill_bytes(&mut nonce);

        let cipher = XChaCha20Poly1305::new(Key::from_slice(&key));
        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext.as_slice())
            .map_err(|_| CoreError::Storage {
                message: "session encryption failed".to_string(),
            })?;

        let blob = EncryptedBlob {
            nonce: BASE64.encode(nonce),
            data: BASE64.encode(ciphertext),
        };
        let raw = serde_json::to_string(&blob).map_err(CoreError::storage)?;
        std::fs::write(&self.path, raw).map_err(CoreError::storage)?;

        *self.cache.lock() = Some(Some(session.clone()));
        Ok(())
    }

    /// Delete the persisted session and drop the cache. Idempotent.
    pub fn clear(&self) {
        *self.cache.lock() = Some(None);
        if let Err(err) = std::fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("failed to delete session file: {err}");
            }
        }
    }

    /// Fetch the file key from the OS credential store. With `create` set, a
    /// missing key is generated and stored; otherwise a missing key reads as
    /// `Ok(None)`. Any other credential-store failure means the platform has
    /// no usable encryption facility.
    fn encryption_key(&self, create: bool) -> Result<Option<[u8; 32]>> {
        let entry =
            Entry::new(SERVICE_NAME, KEY_NAME).map_err(|_| CoreError::EncryptionUnavailable)?;

        match entry.get_password() {
            Ok(encoded) => {
                let bytes = BASE64
                    .decode(encoded)
                    .map_err(|_| CoreError::EncryptionUnavailable)?;
                let key: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| CoreError::EncryptionUnavailable)?;
                Ok(Some(key))
            }
            Err(keyring::Error::NoEntry) => {
                if !create {
                    return Ok(None);
                }
                let mut key = [0u8; 32];
                OsRng.fill_bytes(&mut key);
                entry
                    .set_password(&BASE64.encode(key))
                    .map_err(|_| CoreError::EncryptionUnavailable)?;
                Ok(Some(key))
            }
            Err(_) => Err(CoreError::EncryptionUnavailable),
        }
    }
}
