//! JSON Web Key encoding of public keys
//!
//! RSA keys publish `n`/`e` as unpadded base64url. EC keys publish `x`/`y`
//! as padded standard base64, which is what existing relying parties of
//! this provider have been configured against.

use crate::error::{KeyError, Result};
use crate::keys::{KeyPair, PublicComponents};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use jobtoken_core::KeyFamily;
use serde::{Deserialize, Serialize};

/// RSA public JWK
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaJwk {
    pub kid: String,
    pub kty: String,
    pub alg: String,
    #[serde(rename = "use")]
    pub key_use: String,
    pub n: String,
    pub e: String,
}

/// Elliptic-curve public JWK
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcJwk {
    pub alg: String,
    pub kty: String,
    #[serde(rename = "use")]
    pub key_use: String,
    pub kid: String,
    pub crv: String,
    pub x: String,
    pub y: String,
}

/// Public signing key as served in a JWKS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Jwk {
    Rsa(RsaJwk),
    Ec(EcJwk),
}

impl Jwk {
    /// Encode the public half of `key_pair` under key id `kid`
    pub fn encode(kid: &str, key_pair: &KeyPair) -> Result<Self> {
        let algorithm = key_pair.algorithm();
        match (algorithm.family(), key_pair.public_components()?) {
            (KeyFamily::Rsa { .. }, PublicComponents::Rsa { n, e }) => Ok(Jwk::Rsa(RsaJwk {
                kid: kid.to_string(),
                kty: "RSA".to_string(),
                alg: algorithm.name().to_string(),
                key_use: "sig".to_string(),
                n: URL_SAFE_NO_PAD.encode(n),
                e: URL_SAFE_NO_PAD.encode(e),
            })),
            (KeyFamily::EllipticCurve { curve }, PublicComponents::Ec { curve: actual, x, y })
                if curve == actual =>
            {
                Ok(Jwk::Ec(EcJwk {
                    alg: algorithm.name().to_string(),
                    kty: "EC".to_string(),
                    key_use: "sig".to_string(),
                    kid: kid.to_string(),
                    crv: curve.name().to_string(),
                    x: STANDARD.encode(x),
                    y: STANDARD.encode(y),
                }))
            }
            _ => Err(KeyError::AlgorithmMismatch { algorithm }),
        }
    }

    pub fn kid(&self) -> &str {
        match self {
            Jwk::Rsa(jwk) => &jwk.kid,
            Jwk::Ec(jwk) => &jwk.kid,
        }
    }

    pub fn alg(&self) -> &str {
        match self {
            Jwk::Rsa(jwk) => &jwk.alg,
            Jwk::Ec(jwk) => &jwk.alg,
        }
    }
}
