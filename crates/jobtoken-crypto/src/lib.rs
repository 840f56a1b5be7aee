//! jobtoken Crypto
//!
//! Asymmetric signing keys for ID tokens: generation per algorithm family,
//! encrypted-at-rest storage (including the legacy RSA-only record shape),
//! JWS signing and JWK encoding of the public half.

pub mod error;
pub mod jwk;
pub mod keys;
pub mod manager;
pub mod secret;

pub use error::{KeyError, Result};
pub use jwk::{EcJwk, Jwk, RsaJwk};
pub use keys::{KeyMaterial, KeyPair, PublicComponents};
pub use manager::{EncryptedKeyRecord, KeyManager, LegacyKeyRecord, LoadedKey, StoredKeyRecord};
pub use secret::{MasterKeyCipher, SecretCipher};
