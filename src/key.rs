//! # Key Storage
//!
//! The repository key lives inside the git directory and is never committed:
//!
//! - **Default key path**: `.git/git-seal/keys/default`
//! - **Format**: raw 32 bytes (base64 text is accepted on import)
//! - **Permissions**: 0600 on Unix
//!
//! Two overrides take precedence over the default path, in this order:
//!
//! 1. an inline base64 key (`GIT_SEAL_KEY`, or `key` in the config file),
//!    meant for CI where no key file exists;
//! 2. a configured `key_file`.

use crate::crypto::{CryptoKey, KEY_SIZE};
use crate::error::{Result, SealError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs;
use std::path::{Path, PathBuf};

pub struct KeyStore {
    git_dir: PathBuf,
    key_file: Option<PathBuf>,
    inline_key: Option<String>,
}

impl KeyStore {
    pub fn new(git_dir: impl AsRef<Path>) -> Self {
        Self {
            git_dir: git_dir.as_ref().to_path_buf(),
            key_file: None,
            inline_key: None,
        }
    }

    pub fn with_key_file(mut self, key_file: Option<PathBuf>) -> Self {
        self.key_file = key_file;
        self
    }

    pub fn with_inline_key(mut self, key: Option<String>) -> Self {
        self.inline_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn seal_dir(&self) -> PathBuf {
        self.git_dir.join("git-seal")
    }

    pub fn default_key_path(&self) -> PathBuf {
        self.seal_dir().join("keys").join("default")
    }

    pub fn is_initialized(&self) -> bool {
        self.seal_dir().exists()
    }

    /// Create the key directory and a fresh key
    pub fn init(&self) -> Result<CryptoKey> {
        if self.is_initialized() {
            return Err(SealError::AlreadyInitialized);
        }
        fs::create_dir_all(self.seal_dir().join("keys"))?;

        let key = CryptoKey::generate();
        self.save(&key)?;
        Ok(key)
    }

    /// Write `key` to the default key path
    pub fn save(&self, key: &CryptoKey) -> Result<()> {
        let key_path = self.default_key_path();
        if let Some(parent) = key_path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_private(&key_path, key.as_bytes())
    }

    /// Resolve the key from the inline override, the key file, or the default path
    pub fn load(&self) -> Result<CryptoKey> {
        if let Some(inline) = &self.inline_key {
            return decode_key(inline.as_bytes());
        }
        if let Some(key_file) = &self.key_file {
            if !key_file.exists() {
                return Err(SealError::KeyNotFound(key_file.display().to_string()));
            }
            return decode_key(&fs::read(key_file)?);
        }

        let key_path = self.default_key_path();
        if !key_path.exists() {
            if !self.is_initialized() {
                return Err(SealError::NotInitialized);
            }
            return Err(SealError::KeyNotFound("default".into()));
        }
        CryptoKey::from_bytes(&fs::read(key_path)?)
    }

    pub fn export(&self, output_path: impl AsRef<Path>) -> Result<()> {
        let key = self.load()?;
        write_private(output_path.as_ref(), key.as_bytes())
    }

    /// Replace the stored key with the one in `input_path`
    pub fn import(&self, input_path: impl AsRef<Path>) -> Result<CryptoKey> {
        let key = decode_key(&fs::read(input_path)?)?;
        self.save(&key)?;
        Ok(key)
    }
}

/// Accept either the raw key bytes or their base64 text.
fn decode_key(bytes: &[u8]) -> Result<CryptoKey> {
    if bytes.len() == KEY_SIZE {
        return CryptoKey::from_bytes(bytes);
    }
    let text = std::str::from_utf8(bytes).map_err(|_| SealError::InvalidKeyFormat)?;
    let raw = STANDARD
        .decode(text.trim())
        .map_err(|_| SealError::InvalidKeyFormat)?;
    CryptoKey::from_bytes(&raw)
}

fn write_private(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
