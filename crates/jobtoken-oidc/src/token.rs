//! ID token issuance
//!
//! Tokens are JWS compact serializations signed with the credential's own
//! key, so the signature algorithm always follows the credential.
//! jsonwebtoken signs everything except ES512, which goes through p521.

use crate::config::OidcConfig;
use crate::credential::Credential;
use crate::error::Result;
use crate::resolver::IssuerResolver;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use jobtoken_core::{ExecutionContext, KeyAlgorithm};
use jobtoken_crypto::KeyPair;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Validity of an issued token
pub const TOKEN_LIFETIME_SECONDS: u64 = 3600;

/// ID token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Issuer (iss)
    pub iss: String,

    /// Audience (aud), absent unless the credential overrides it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    /// Expiration time (exp)
    pub exp: u64,

    /// Issued at (iat)
    pub iat: u64,

    /// Subject (sub): the job URL, or the root URL outside a job
    pub sub: String,

    /// Run number of the job, only inside a job
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_number: Option<u64>,
}

/// JOSE header of ES512 tokens, matching what jsonwebtoken emits
#[derive(Debug, Serialize)]
struct Es512Header<'a> {
    alg: &'a str,
    kid: &'a str,
}

/// A signed ID token
#[derive(Debug, Clone)]
pub struct IdToken {
    /// The encoded JWT string
    pub token: String,

    /// The claims (decoded)
    pub claims: IdTokenClaims,
}

impl IdToken {
    pub fn as_str(&self) -> &str {
        &self.token
    }
}

/// Builds and signs ID tokens
#[derive(Clone)]
pub struct TokenIssuer {
    resolver: Arc<IssuerResolver>,
    config: OidcConfig,
}

impl TokenIssuer {
    pub fn new(resolver: Arc<IssuerResolver>, config: OidcConfig) -> Self {
        Self { resolver, config }
    }

    /// Claims for `credential` issued at `now` (seconds since the epoch)
    pub fn claims(
        &self,
        credential: &Credential,
        context: Option<&ExecutionContext>,
        now: u64,
    ) -> Result<IdTokenClaims> {
        let iss = match credential.issuer() {
            Some(issuer) => issuer.to_string(),
            None => self
                .resolver
                .for_credential(credential, context)?
                .url()
                .to_string(),
        };

        Ok(IdTokenClaims {
            iss,
            aud: credential.audience().map(str::to_string),
            exp: now + TOKEN_LIFETIME_SECONDS,
            iat: now,
            sub: match context {
                Some(context) => context.subject.clone(),
                None => self.config.root_subject(),
            },
            build_number: context.map(|c| c.build_number),
        })
    }

    /// Issue a token for `credential`, optionally on behalf of a running job
    pub fn issue(
        &self,
        credential: &Credential,
        context: Option<&ExecutionContext>,
    ) -> Result<IdToken> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = self.claims(credential, context, now)?;
        let token = sign(credential, &claims)?;

        tracing::debug!(
            credential = credential.id(),
            algorithm = %credential.algorithm(),
            iss = %claims.iss,
            sub = %claims.sub,
            "Issued ID token"
        );

        Ok(IdToken { token, claims })
    }
}

fn sign(credential: &Credential, claims: &IdTokenClaims) -> Result<String> {
    let key_pair = credential.key_pair();
    let (algorithm, key) = match credential.algorithm() {
        KeyAlgorithm::Rs256 => (Algorithm::RS256, rsa_encoding_key(key_pair)?),
        KeyAlgorithm::Rs384 => (Algorithm::RS384, rsa_encoding_key(key_pair)?),
        KeyAlgorithm::Rs512 => (Algorithm::RS512, rsa_encoding_key(key_pair)?),
        KeyAlgorithm::Es256 => (Algorithm::ES256, ec_encoding_key(key_pair)?),
        KeyAlgorithm::Es384 => (Algorithm::ES384, ec_encoding_key(key_pair)?),
        KeyAlgorithm::Es512 => return sign_es512(credential, claims),
    };

    let header = Header {
        typ: None,
        kid: Some(credential.id().to_string()),
        ..Header::new(algorithm)
    };
    Ok(encode(&header, claims, &key)?)
}

fn rsa_encoding_key(key_pair: &KeyPair) -> Result<EncodingKey> {
    Ok(EncodingKey::from_rsa_der(&key_pair.rsa_private_key_der()?))
}

fn ec_encoding_key(key_pair: &KeyPair) -> Result<EncodingKey> {
    Ok(EncodingKey::from_ec_der(&key_pair.private_key_der()?))
}

fn sign_es512(credential: &Credential, claims: &IdTokenClaims) -> Result<String> {
    let header = Es512Header {
        alg: KeyAlgorithm::Es512.name(),
        kid: credential.id(),
    };
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?)
    );
    let signature = credential.key_pair().sign(signing_input.as_bytes())?;
    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}
