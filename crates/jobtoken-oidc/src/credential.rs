//! ID token credentials
//!
//! A credential is a named signing identity: one key pair plus optional
//! issuer and audience overrides. Credentials are immutable once built;
//! the execution context of a token request is passed alongside, never
//! stored on them.

use crate::error::Result;
use jobtoken_core::KeyAlgorithm;
use jobtoken_crypto::{EncryptedKeyRecord, KeyManager, KeyPair, StoredKeyRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Persisted form of a credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,

    pub keys: StoredKeyRecord,
}

/// A signing identity
#[derive(Clone)]
pub struct Credential {
    id: String,
    description: Option<String>,
    issuer: Option<String>,
    audience: Option<String>,
    key_pair: KeyPair,
    record: EncryptedKeyRecord,
}

impl Credential {
    /// Create a credential with a freshly generated key pair
    pub fn generate(id: impl Into<String>, algorithm: KeyAlgorithm, keys: &KeyManager) -> Result<Self> {
        let key_pair = keys.generate(algorithm)?;
        Self::from_key_pair(id, key_pair, keys)
    }

    /// Create a credential around an existing key pair
    pub fn from_key_pair(id: impl Into<String>, key_pair: KeyPair, keys: &KeyManager) -> Result<Self> {
        let record = keys.to_record(&key_pair)?;
        Ok(Self {
            id: id.into(),
            description: None,
            issuer: None,
            audience: None,
            key_pair,
            record,
        })
    }

    /// Restore a persisted credential.
    ///
    /// The flag is `true` when the record used the legacy key shape; the
    /// caller should persist [`Credential::to_record`] so the migration is
    /// not repeated.
    pub fn restore(record: &CredentialRecord, keys: &KeyManager) -> Result<(Self, bool)> {
        let loaded = keys.load(&record.keys)?;
        if loaded.migrated {
            tracing::info!(credential = %record.id, "Migrated legacy key record to RS256");
        }
        let credential = Self {
            id: record.id.clone(),
            description: fix_empty(record.description.clone()),
            issuer: fix_empty(record.issuer.clone()),
            audience: fix_empty(record.audience.clone()),
            key_pair: loaded.key_pair,
            record: loaded.record,
        };
        Ok((credential, loaded.migrated))
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = fix_empty(description);
        self
    }

    /// Serve this credential's tokens under an externally hosted issuer URL
    pub fn with_issuer(mut self, issuer: Option<String>) -> Self {
        self.issuer = fix_empty(issuer);
        self
    }

    pub fn with_audience(mut self, audience: Option<String>) -> Self {
        self.audience = fix_empty(audience);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Issuer override, if any
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// Audience override, if any
    pub fn audience(&self) -> Option<&str> {
        self.audience.as_deref()
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.key_pair.algorithm()
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Encrypted key record backing this credential
    pub fn key_record(&self) -> &EncryptedKeyRecord {
        &self.record
    }

    /// Persisted form, always in the current key record shape
    pub fn to_record(&self) -> CredentialRecord {
        CredentialRecord {
            id: self.id.clone(),
            description: self.description.clone(),
            issuer: self.issuer.clone(),
            audience: self.audience.clone(),
            keys: StoredKeyRecord::Current(self.record.clone()),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("algorithm", &self.algorithm())
            .finish()
    }
}

fn fix_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
