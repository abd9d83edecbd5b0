//! # Sealed Envelope
//!
//! Encryption and decryption of filter payloads using AES-256-GCM.
//!
//! ## Envelope Format
//!
//! ```text
//! [\0GITSEAL\0][version:1][format tag:1][12-byte nonce][ciphertext + 16-byte GCM tag]
//! ```
//!
//! The AEAD key is not the repository key itself: each format gets its own
//! subkey derived with HKDF-SHA256 (`info = "git-seal/<format>"`). Opening an
//! envelope under the wrong format therefore fails authentication instead of
//! returning plaintext of the wrong shape.
//!
//! Nonces are random, so sealing the same plaintext twice gives different
//! bytes. The clean filter relies on [`crate::reconcile`] to hide that from
//! git history.

use crate::error::{DecodeError, Result, SealError};
use crate::format::Format;
use crate::reconcile::PlaintextRecoverer;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::{Digest, Sha256};

pub const KEY_SIZE: usize = 32; // 256 bits
pub const NONCE_SIZE: usize = 12; // 96 bits for GCM

// NUL-bracketed so no text file can start with it
const MAGIC_HEADER: &[u8] = b"\0GITSEAL\0";
const VERSION: u8 = 1;
const HEADER_SIZE: usize = MAGIC_HEADER.len() + 2;

#[derive(Clone)]
pub struct CryptoKey {
    key: [u8; KEY_SIZE],
}

impl CryptoKey {
    /// Generate a new random key
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        Self { key }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| SealError::InvalidKeyFormat)?;
        Ok(Self { key })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    /// Short identifier safe to print: first 8 bytes of SHA-256, hex encoded
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.key);
        hex::encode(&digest[..8])
    }

    fn cipher_for(&self, format: Format) -> Result<Aes256Gcm> {
        let hk = Hkdf::<Sha256>::new(None, &self.key);
        let mut subkey = [0u8; KEY_SIZE];
        hk.expand(format!("git-seal/{format}").as_bytes(), &mut subkey)
            .map_err(|e| SealError::Crypto(e.to_string()))?;
        Aes256Gcm::new_from_slice(&subkey).map_err(|e| SealError::Crypto(e.to_string()))
    }

    /// Seal plaintext written in `format`
    pub fn encrypt(&self, plaintext: &[u8], format: Format) -> Result<Vec<u8>> {
        let cipher = self.cipher_for(format)?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| SealError::Crypto(e.to_string()))?;

        let mut result = Vec::with_capacity(HEADER_SIZE + NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(MAGIC_HEADER);
        result.push(VERSION);
        result.push(format.tag());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&ciphertext);

        Ok(result)
    }

    /// Open an envelope that was sealed as `format`
    pub fn decrypt(&self, sealed: &[u8], format: Format) -> Result<Vec<u8>> {
        if sealed.len() < HEADER_SIZE + NONCE_SIZE {
            return Err(SealError::Crypto("Ciphertext too short".into()));
        }
        if !Self::is_encrypted(sealed) {
            return Err(SealError::Crypto("Invalid encrypted data format".into()));
        }
        if sealed[MAGIC_HEADER.len()] != VERSION {
            return Err(SealError::Crypto(format!(
                "Unsupported envelope version {}",
                sealed[MAGIC_HEADER.len()]
            )));
        }
        match Self::sealed_format(sealed) {
            Some(found) if found == format => {}
            Some(found) => {
                return Err(SealError::Crypto(format!(
                    "Sealed as {found}, expected {format}"
                )))
            }
            None => return Err(SealError::Crypto("Unknown format tag".into())),
        }

        let cipher = self.cipher_for(format)?;
        let (nonce_bytes, encrypted) = sealed[HEADER_SIZE..].split_at(NONCE_SIZE);

        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), encrypted)
            .map_err(|e| SealError::Crypto(e.to_string()))
    }

    /// Check if data starts with the envelope magic
    pub fn is_encrypted(data: &[u8]) -> bool {
        data.starts_with(MAGIC_HEADER)
    }

    /// Whether `data` is a complete envelope that opens under this key
    pub fn can_open(&self, data: &[u8]) -> bool {
        Self::sealed_format(data).is_some_and(|format| self.decrypt(data, format).is_ok())
    }

    /// Format recorded in an envelope header, if any
    pub fn sealed_format(data: &[u8]) -> Option<Format> {
        if data.len() < HEADER_SIZE || !Self::is_encrypted(data) {
            return None;
        }
        Format::from_tag(data[HEADER_SIZE - 1])
    }
}

impl PlaintextRecoverer for CryptoKey {
    fn recover(&self, stored: &[u8], format: Format) -> std::result::Result<Vec<u8>, DecodeError> {
        self.decrypt(stored, format)
            .map_err(|e| DecodeError(e.to_string()))
    }
}
