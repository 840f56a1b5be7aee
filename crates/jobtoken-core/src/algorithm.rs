//! Signing algorithm catalog
//!
//! The fixed set of JWS algorithms a credential may sign with. Each
//! algorithm belongs to exactly one family, and the family decides key
//! generation, key decoding and the shape of the published JWK.

use crate::error::UnsupportedAlgorithm;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named elliptic curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    P256,
    P384,
    P521,
}

impl Curve {
    /// JWK `crv` identifier
    pub fn name(&self) -> &'static str {
        match self {
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Algorithm family with its family-specific metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    /// RSASSA-PKCS1-v1_5; modulus size in bits
    Rsa { key_size: usize },

    /// ECDSA over a named curve
    EllipticCurve { curve: Curve },
}

/// Supported JWS signing algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    #[serde(rename = "ES256")]
    Es256,
    #[serde(rename = "ES384")]
    Es384,
    #[serde(rename = "ES512")]
    Es512,
    #[serde(rename = "RS256")]
    Rs256,
    #[serde(rename = "RS384")]
    Rs384,
    #[serde(rename = "RS512")]
    Rs512,
}

impl KeyAlgorithm {
    /// Every supported algorithm, in declaration order
    pub const ALL: [KeyAlgorithm; 6] = [
        KeyAlgorithm::Es256,
        KeyAlgorithm::Es384,
        KeyAlgorithm::Es512,
        KeyAlgorithm::Rs256,
        KeyAlgorithm::Rs384,
        KeyAlgorithm::Rs512,
    ];

    /// JWS `alg` name
    pub fn name(&self) -> &'static str {
        match self {
            KeyAlgorithm::Es256 => "ES256",
            KeyAlgorithm::Es384 => "ES384",
            KeyAlgorithm::Es512 => "ES512",
            KeyAlgorithm::Rs256 => "RS256",
            KeyAlgorithm::Rs384 => "RS384",
            KeyAlgorithm::Rs512 => "RS512",
        }
    }

    pub fn family(&self) -> KeyFamily {
        match self {
            KeyAlgorithm::Es256 => KeyFamily::EllipticCurve { curve: Curve::P256 },
            KeyAlgorithm::Es384 => KeyFamily::EllipticCurve { curve: Curve::P384 },
            KeyAlgorithm::Es512 => KeyFamily::EllipticCurve { curve: Curve::P521 },
            KeyAlgorithm::Rs256 => KeyFamily::Rsa { key_size: 2048 },
            KeyAlgorithm::Rs384 => KeyFamily::Rsa { key_size: 3072 },
            KeyAlgorithm::Rs512 => KeyFamily::Rsa { key_size: 4096 },
        }
    }

    /// Curve for elliptic-curve algorithms, `None` for RSA
    pub fn curve(&self) -> Option<Curve> {
        match self.family() {
            KeyFamily::EllipticCurve { curve } => Some(curve),
            KeyFamily::Rsa { .. } => None,
        }
    }

    pub fn is_rsa(&self) -> bool {
        matches!(self.family(), KeyFamily::Rsa { .. })
    }

    pub fn is_elliptic_curve(&self) -> bool {
        matches!(self.family(), KeyFamily::EllipticCurve { .. })
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyAlgorithm::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| UnsupportedAlgorithm(s.to_string()))
    }
}
