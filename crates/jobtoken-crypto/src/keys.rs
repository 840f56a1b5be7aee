//! Asymmetric key pairs bound to a signing algorithm
//!
//! A [`KeyPair`] always pairs a [`KeyAlgorithm`] with key material of the
//! matching family. Private keys travel as PKCS#8 DER, public keys as X.509
//! SubjectPublicKeyInfo DER.

use crate::error::{KeyError, Result};
use jobtoken_core::{Curve, KeyAlgorithm, KeyFamily};
use rand::rngs::OsRng;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::signature::{SignatureEncoding, Signer};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Sha256, Sha384, Sha512};
use std::fmt;
use zeroize::Zeroizing;

/// Raw key material, one variant per key type
#[derive(Clone)]
pub enum KeyMaterial {
    Rsa {
        private: RsaPrivateKey,
        public: RsaPublicKey,
    },
    P256 {
        private: p256::SecretKey,
        public: p256::PublicKey,
    },
    P384 {
        private: p384::SecretKey,
        public: p384::PublicKey,
    },
    P521 {
        private: p521::SecretKey,
        public: p521::PublicKey,
    },
}

impl KeyMaterial {
    /// Whether this material can serve the given algorithm family
    fn fits(&self, family: KeyFamily) -> bool {
        matches!(
            (family, self),
            (KeyFamily::Rsa { .. }, KeyMaterial::Rsa { .. })
                | (KeyFamily::EllipticCurve { curve: Curve::P256 }, KeyMaterial::P256 { .. })
                | (KeyFamily::EllipticCurve { curve: Curve::P384 }, KeyMaterial::P384 { .. })
                | (KeyFamily::EllipticCurve { curve: Curve::P521 }, KeyMaterial::P521 { .. })
        )
    }

    fn kind(&self) -> &'static str {
        match self {
            KeyMaterial::Rsa { .. } => "RSA",
            KeyMaterial::P256 { .. } => "EC P-256",
            KeyMaterial::P384 { .. } => "EC P-384",
            KeyMaterial::P521 { .. } => "EC P-521",
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial({}, [REDACTED])", self.kind())
    }
}

/// Public key components as published in a JWK
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicComponents {
    /// Big-endian modulus and public exponent
    Rsa { n: Vec<u8>, e: Vec<u8> },

    /// Big-endian affine coordinates
    Ec { curve: Curve, x: Vec<u8>, y: Vec<u8> },
}

/// Key material tied to exactly one signing algorithm
#[derive(Clone)]
pub struct KeyPair {
    algorithm: KeyAlgorithm,
    material: KeyMaterial,
}

impl KeyPair {
    /// Pair material with an algorithm, rejecting family mismatches
    pub fn from_parts(algorithm: KeyAlgorithm, material: KeyMaterial) -> Result<Self> {
        if !material.fits(algorithm.family()) {
            return Err(KeyError::AlgorithmMismatch { algorithm });
        }
        Ok(Self {
            algorithm,
            material,
        })
    }

    /// Generate a fresh key pair from the OS entropy source.
    ///
    /// RSA modulus sizes follow the algorithm (2048/3072/4096 bits).
    pub fn generate(algorithm: KeyAlgorithm) -> Result<Self> {
        let material = match algorithm.family() {
            KeyFamily::Rsa { key_size } => {
                let private = RsaPrivateKey::new(&mut OsRng, key_size)
                    .map_err(|e| KeyError::Generation(e.to_string()))?;
                let public = RsaPublicKey::from(&private);
                KeyMaterial::Rsa { private, public }
            }
            KeyFamily::EllipticCurve { curve: Curve::P256 } => {
                let private = p256::SecretKey::random(&mut OsRng);
                let public = private.public_key();
                KeyMaterial::P256 { private, public }
            }
            KeyFamily::EllipticCurve { curve: Curve::P384 } => {
                let private = p384::SecretKey::random(&mut OsRng);
                let public = private.public_key();
                KeyMaterial::P384 { private, public }
            }
            KeyFamily::EllipticCurve { curve: Curve::P521 } => {
                let private = p521::SecretKey::random(&mut OsRng);
                let public = private.public_key();
                KeyMaterial::P521 { private, public }
            }
        };
        Self::from_parts(algorithm, material)
    }

    /// Decode a key pair from PKCS#8 private and X.509 public DER bytes.
    ///
    /// The public key must be the one belonging to the private key.
    pub fn decode(algorithm: KeyAlgorithm, private_der: &[u8], public_der: &[u8]) -> Result<Self> {
        let material = match algorithm.family() {
            KeyFamily::Rsa { .. } => {
                let private = RsaPrivateKey::from_pkcs8_der(private_der)
                    .map_err(|e| KeyError::KeyDecode(format!("RSA private key: {}", e)))?;
                let public = RsaPublicKey::from_public_key_der(public_der)
                    .map_err(|e| KeyError::KeyDecode(format!("RSA public key: {}", e)))?;
                if RsaPublicKey::from(&private) != public {
                    return Err(mismatched_halves());
                }
                KeyMaterial::Rsa { private, public }
            }
            KeyFamily::EllipticCurve { curve: Curve::P256 } => {
                let private = p256::SecretKey::from_pkcs8_der(private_der)
                    .map_err(|e| KeyError::KeyDecode(format!("P-256 private key: {}", e)))?;
                let public = p256::PublicKey::from_public_key_der(public_der)
                    .map_err(|e| KeyError::KeyDecode(format!("P-256 public key: {}", e)))?;
                if private.public_key() != public {
                    return Err(mismatched_halves());
                }
                KeyMaterial::P256 { private, public }
            }
            KeyFamily::EllipticCurve { curve: Curve::P384 } => {
                let private = p384::SecretKey::from_pkcs8_der(private_der)
                    .map_err(|e| KeyError::KeyDecode(format!("P-384 private key: {}", e)))?;
                let public = p384::PublicKey::from_public_key_der(public_der)
                    .map_err(|e| KeyError::KeyDecode(format!("P-384 public key: {}", e)))?;
                if private.public_key() != public {
                    return Err(mismatched_halves());
                }
                KeyMaterial::P384 { private, public }
            }
            KeyFamily::EllipticCurve { curve: Curve::P521 } => {
                let private = p521::SecretKey::from_pkcs8_der(private_der)
                    .map_err(|e| KeyError::KeyDecode(format!("P-521 private key: {}", e)))?;
                let public = p521::PublicKey::from_public_key_der(public_der)
                    .map_err(|e| KeyError::KeyDecode(format!("P-521 public key: {}", e)))?;
                if private.public_key() != public {
                    return Err(mismatched_halves());
                }
                KeyMaterial::P521 { private, public }
            }
        };
        Self::from_parts(algorithm, material)
    }

    /// Rebuild an RS256 key pair from a bare PKCS#8 RSA private key.
    ///
    /// The public key is derived from the private key's modulus and public
    /// exponent.
    pub fn from_rsa_private_der(private_der: &[u8]) -> Result<Self> {
        let private = RsaPrivateKey::from_pkcs8_der(private_der)
            .map_err(|e| KeyError::KeyDecode(format!("RSA private key: {}", e)))?;
        let public = RsaPublicKey::new(private.n().clone(), private.e().clone())
            .map_err(|e| KeyError::KeyDecode(format!("RSA public key: {}", e)))?;
        Self::from_parts(KeyAlgorithm::Rs256, KeyMaterial::Rsa { private, public })
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn material(&self) -> &KeyMaterial {
        &self.material
    }

    /// PKCS#8 DER encoding of the private key
    pub fn private_key_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        let doc = match &self.material {
            KeyMaterial::Rsa { private, .. } => private.to_pkcs8_der(),
            KeyMaterial::P256 { private, .. } => private.to_pkcs8_der(),
            KeyMaterial::P384 { private, .. } => private.to_pkcs8_der(),
            KeyMaterial::P521 { private, .. } => private.to_pkcs8_der(),
        }
        .map_err(|e| KeyError::KeyDecode(format!("private key encoding: {}", e)))?;
        Ok(Zeroizing::new(doc.as_bytes().to_vec()))
    }

    /// PKCS#1 DER encoding of an RSA private key
    pub fn rsa_private_key_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        let KeyMaterial::Rsa { private, .. } = &self.material else {
            return Err(KeyError::AlgorithmMismatch {
                algorithm: self.algorithm,
            });
        };
        let doc = private
            .to_pkcs1_der()
            .map_err(|e| KeyError::KeyDecode(format!("private key encoding: {}", e)))?;
        Ok(Zeroizing::new(doc.as_bytes().to_vec()))
    }

    /// X.509 SubjectPublicKeyInfo DER encoding of the public key
    pub fn public_key_der(&self) -> Result<Vec<u8>> {
        let doc = match &self.material {
            KeyMaterial::Rsa { public, .. } => public.to_public_key_der(),
            KeyMaterial::P256 { public, .. } => public.to_public_key_der(),
            KeyMaterial::P384 { public, .. } => public.to_public_key_der(),
            KeyMaterial::P521 { public, .. } => public.to_public_key_der(),
        }
        .map_err(|e| KeyError::KeyDecode(format!("public key encoding: {}", e)))?;
        Ok(doc.as_bytes().to_vec())
    }

    /// Components of the public key, as a JWK publishes them
    pub fn public_components(&self) -> Result<PublicComponents> {
        use p256::elliptic_curve::sec1::ToEncodedPoint;

        fn coordinates(x: Option<&[u8]>, y: Option<&[u8]>) -> Result<(Vec<u8>, Vec<u8>)> {
            match (x, y) {
                (Some(x), Some(y)) => Ok((x.to_vec(), y.to_vec())),
                _ => Err(KeyError::KeyDecode("public key is the identity point".into())),
            }
        }

        match &self.material {
            KeyMaterial::Rsa { public, .. } => Ok(PublicComponents::Rsa {
                n: public.n().to_bytes_be(),
                e: public.e().to_bytes_be(),
            }),
            KeyMaterial::P256 { public, .. } => {
                let point = public.to_encoded_point(false);
                let (x, y) = coordinates(point.x().map(|c| c.as_slice()), point.y().map(|c| c.as_slice()))?;
                Ok(PublicComponents::Ec { curve: Curve::P256, x, y })
            }
            KeyMaterial::P384 { public, .. } => {
                let point = public.to_encoded_point(false);
                let (x, y) = coordinates(point.x().map(|c| c.as_slice()), point.y().map(|c| c.as_slice()))?;
                Ok(PublicComponents::Ec { curve: Curve::P384, x, y })
            }
            KeyMaterial::P521 { public, .. } => {
                let point = public.to_encoded_point(false);
                let (x, y) = coordinates(point.x().map(|c| c.as_slice()), point.y().map(|c| c.as_slice()))?;
                Ok(PublicComponents::Ec { curve: Curve::P521, x, y })
            }
        }
    }

    /// Produce a JWS signature over `message`.
    ///
    /// ECDSA signatures use the fixed-width `r || s` form JWS requires.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        match (self.algorithm, &self.material) {
            (KeyAlgorithm::Rs256, KeyMaterial::Rsa { private, .. }) => {
                Ok(SigningKey::<Sha256>::new(private.clone()).sign(message).to_vec())
            }
            (KeyAlgorithm::Rs384, KeyMaterial::Rsa { private, .. }) => {
                Ok(SigningKey::<Sha384>::new(private.clone()).sign(message).to_vec())
            }
            (KeyAlgorithm::Rs512, KeyMaterial::Rsa { private, .. }) => {
                Ok(SigningKey::<Sha512>::new(private.clone()).sign(message).to_vec())
            }
            (KeyAlgorithm::Es256, KeyMaterial::P256 { private, .. }) => {
                let signature: p256::ecdsa::Signature =
                    p256::ecdsa::SigningKey::from(private).sign(message);
                Ok(signature.to_vec())
            }
            (KeyAlgorithm::Es384, KeyMaterial::P384 { private, .. }) => {
                let signature: p384::ecdsa::Signature =
                    p384::ecdsa::SigningKey::from(private).sign(message);
                Ok(signature.to_vec())
            }
            (KeyAlgorithm::Es512, KeyMaterial::P521 { private, .. }) => {
                let signing_key = p521::ecdsa::SigningKey::from_bytes(&private.to_bytes())
                    .map_err(|e| KeyError::KeyDecode(format!("P-521 signing key: {}", e)))?;
                let signature: p521::ecdsa::Signature = signing_key.sign(message);
                Ok(signature.to_vec())
            }
            (algorithm, _) => Err(KeyError::AlgorithmMismatch { algorithm }),
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &self.algorithm)
            .field("material", &self.material)
            .finish()
    }
}

fn mismatched_halves() -> KeyError {
    KeyError::KeyDecode("public key does not belong to private key".into())
}
