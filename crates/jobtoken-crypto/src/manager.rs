//! Encrypted-at-rest key records
//!
//! Each key component is DER encoded, base64 encoded and then encrypted
//! independently. Records are immutable: they are produced whole from a
//! [`KeyPair`] and restored whole, never patched.
//!
//! Persisted shapes:
//! ```text
//! current: {"algorithm": "ES256", "privateKey": <encrypted>, "publicKey": <encrypted>}
//! legacy:  {"privateKey": <encrypted>}   (RSA PKCS#8, implicitly RS256)
//! ```

use crate::error::{KeyError, Result};
use crate::keys::KeyPair;
use crate::secret::SecretCipher;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jobtoken_core::KeyAlgorithm;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;
use zeroize::Zeroizing;

/// Current algorithm-tagged key record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedKeyRecord {
    /// Algorithm name; parsed on restore so unknown names fail loudly
    pub algorithm: String,

    /// Encrypted base64 of the PKCS#8 private key
    pub private_key: String,

    /// Encrypted base64 of the X.509 public key
    pub public_key: String,
}

/// Record written before multiple algorithms were supported
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LegacyKeyRecord {
    /// Encrypted base64 of an RSA PKCS#8 private key
    pub private_key: String,
}

/// Any key record shape found in persisted state.
///
/// Only the current shape can be written back.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StoredKeyRecord {
    Current(EncryptedKeyRecord),
    Legacy(LegacyKeyRecord),
}

impl StoredKeyRecord {
    pub fn is_legacy(&self) -> bool {
        matches!(self, StoredKeyRecord::Legacy(_))
    }
}

impl From<EncryptedKeyRecord> for StoredKeyRecord {
    fn from(record: EncryptedKeyRecord) -> Self {
        StoredKeyRecord::Current(record)
    }
}

impl Serialize for StoredKeyRecord {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            StoredKeyRecord::Current(record) => record.serialize(serializer),
            StoredKeyRecord::Legacy(_) => Err(serde::ser::Error::custom(
                "legacy key records must be migrated before they are persisted",
            )),
        }
    }
}

/// Result of loading a stored record
#[derive(Debug, Clone)]
pub struct LoadedKey {
    pub key_pair: KeyPair,

    /// Record in the current shape, to persist from now on
    pub record: EncryptedKeyRecord,

    /// Whether the stored record had the legacy shape
    pub migrated: bool,
}

/// Generates key pairs and moves them in and out of encrypted records.
#[derive(Clone)]
pub struct KeyManager {
    cipher: Arc<dyn SecretCipher>,
}

impl KeyManager {
    pub fn new(cipher: Arc<dyn SecretCipher>) -> Self {
        Self { cipher }
    }

    pub fn generate(&self, algorithm: KeyAlgorithm) -> Result<KeyPair> {
        KeyPair::generate(algorithm)
    }

    /// Encrypt both halves of `key_pair` into a record
    pub fn to_record(&self, key_pair: &KeyPair) -> Result<EncryptedKeyRecord> {
        let private_der = key_pair.private_key_der()?;
        let public_der = key_pair.public_key_der()?;

        let private_b64 = Zeroizing::new(STANDARD.encode(private_der.as_slice()));
        let public_b64 = STANDARD.encode(&public_der);

        Ok(EncryptedKeyRecord {
            algorithm: key_pair.algorithm().name().to_string(),
            private_key: self.cipher.encrypt(&private_b64)?,
            public_key: self.cipher.encrypt(&public_b64)?,
        })
    }

    /// Restore the key pair held by `record`
    pub fn to_key_pair(&self, record: &EncryptedKeyRecord) -> Result<KeyPair> {
        let algorithm: KeyAlgorithm = record.algorithm.parse()?;
        let private_der = self.decrypt_der(&record.private_key, "private key")?;
        let public_der = self.decrypt_der(&record.public_key, "public key")?;
        KeyPair::decode(algorithm, &private_der, &public_der)
    }

    /// Rebuild an RS256 key pair from a legacy private-key-only record.
    ///
    /// Deterministic in its input, so running it again on the same record
    /// yields the same key pair.
    pub fn migrate_legacy(&self, legacy: &LegacyKeyRecord) -> Result<KeyPair> {
        let private_der = self.decrypt_der(&legacy.private_key, "legacy private key")?;
        KeyPair::from_rsa_private_der(&private_der)
    }

    /// Load any stored shape, migrating legacy records to the current one
    pub fn load(&self, stored: &StoredKeyRecord) -> Result<LoadedKey> {
        match stored {
            StoredKeyRecord::Current(record) => Ok(LoadedKey {
                key_pair: self.to_key_pair(record)?,
                record: record.clone(),
                migrated: false,
            }),
            StoredKeyRecord::Legacy(legacy) => {
                let key_pair = self.migrate_legacy(legacy)?;
                let record = self.to_record(&key_pair)?;
                tracing::debug!("Migrated legacy RSA key record to {}", key_pair.algorithm());
                Ok(LoadedKey {
                    key_pair,
                    record,
                    migrated: true,
                })
            }
        }
    }

    fn decrypt_der(&self, ciphertext: &str, what: &str) -> Result<Zeroizing<Vec<u8>>> {
        let encoded = self.cipher.decrypt(ciphertext)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Zeroizing::new)
            .map_err(|e| KeyError::KeyDecode(format!("{}: {}", what, e)))
    }
}
