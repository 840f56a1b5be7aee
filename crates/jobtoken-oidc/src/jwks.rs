//! JSON Web Key Set publication

use crate::credential::Credential;
use crate::error::Result;
use crate::issuer::Issuer;
use jobtoken_crypto::Jwk;
use serde::{Deserialize, Serialize};

/// JWKS (JSON Web Key Set) container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKeySet {
    pub keys: Vec<Jwk>,
}

impl JsonWebKeySet {
    /// Keys of every credential served under the issuer's own URL.
    ///
    /// Credentials with an issuer override are skipped: their keys are
    /// published wherever that override points.
    pub fn for_issuer(issuer: &dyn Issuer) -> Result<Self> {
        let mut keys = Vec::new();
        for credential in issuer.credentials() {
            if let Some(elsewhere) = credential.issuer() {
                tracing::debug!(
                    credential = credential.id(),
                    "Declining to serve key since it would be served from {}",
                    elsewhere
                );
                continue;
            }
            keys.push(encode(&credential)?);
        }
        Ok(Self { keys })
    }

    /// Single-key set for one credential
    pub fn for_credential(credential: &Credential) -> Result<Self> {
        Ok(Self {
            keys: vec![encode(credential)?],
        })
    }

    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid() == kid)
    }
}

/// JWK for a credential, keyed by the credential id
pub fn encode(credential: &Credential) -> Result<Jwk> {
    Ok(Jwk::encode(credential.id(), credential.key_pair())?)
}
