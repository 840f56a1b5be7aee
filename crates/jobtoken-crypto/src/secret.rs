//! Encryption of secrets at rest
//!
//! Key records never hold plaintext key bytes: each component is passed
//! through a [`SecretCipher`] before it is persisted. [`MasterKeyCipher`]
//! is the AES-256-GCM implementation used by the server and CLI, keyed by
//! a process-wide master key that lives in its own file.
//!
//! Ciphertext layout:
//! ```text
//! base64( nonce(12) || ciphertext+tag )
//! ```

use crate::error::{KeyError, Result};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;
use zeroize::Zeroizing;

const NONCE_LEN: usize = 12;

/// Opaque encrypt/decrypt capability for persisted secrets.
///
/// Implementations must be safe to share between concurrent token and
/// JWKS requests.
pub trait SecretCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String>;

    fn decrypt(&self, ciphertext: &str) -> Result<Zeroizing<String>>;
}

/// AES-256-GCM cipher keyed by a 32-byte master key.
pub struct MasterKeyCipher {
    cipher: Aes256Gcm,
}

impl MasterKeyCipher {
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    /// Derive the master key from a passphrase.
    pub fn from_passphrase(passphrase: &str) -> Self {
        let key = Zeroizing::new(derive_key(passphrase));
        Self::new(&key)
    }

    /// Load the master key from `path`, generating and persisting a fresh
    /// one when the file does not exist yet.
    pub fn load_or_generate(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let encoded = Zeroizing::new(std::fs::read_to_string(path)?);
            let bytes = Zeroizing::new(
                hex::decode(encoded.trim())
                    .map_err(|e| KeyError::KeyDecode(format!("master key: {}", e)))?,
            );
            let key: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
                KeyError::KeyDecode(format!("master key must be 32 bytes, got {}", bytes.len()))
            })?;
            let key = Zeroizing::new(key);
            return Ok(Self::new(&key));
        }

        let key = Zeroizing::new(rand::random::<[u8; 32]>());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, hex::encode(key.as_slice()))?;

        // Restrict permissions on the key file (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::info!(path = %path.display(), "Generated new master key");
        Ok(Self::new(&key))
    }
}

impl SecretCipher for MasterKeyCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::random();
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| KeyError::Encryption(format!("encryption failed: {}", e)))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(out))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<Zeroizing<String>> {
        let data = STANDARD
            .decode(ciphertext)
            .map_err(|e| KeyError::Encryption(format!("invalid ciphertext encoding: {}", e)))?;

        if data.len() < NONCE_LEN {
            return Err(KeyError::Encryption("data too short".into()));
        }
        let (nonce, body) = data.split_at(NONCE_LEN);

        let plaintext = Zeroizing::new(
            self.cipher
                .decrypt(Nonce::from_slice(nonce), body)
                .map_err(|_| {
                    KeyError::Encryption(
                        "authentication failed: wrong master key or corrupted secret".into(),
                    )
                })?,
        );

        let text = std::str::from_utf8(&plaintext)
            .map_err(|e| KeyError::Encryption(format!("invalid UTF-8: {}", e)))?;
        Ok(Zeroizing::new(text.to_string()))
    }
}

/// Derive a 32-byte key from a passphrase using SHA3-256.
fn derive_key(passphrase: &str) -> [u8; 32] {
    use sha3::{Digest, Sha3_256};
    let mut hasher = Sha3_256::new();
    hasher.update(b"jobtoken-master-key-v1:");
    hasher.update(passphrase.as_bytes());
    hasher.finalize().into()
}
