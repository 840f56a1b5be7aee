//! Error types for token issuance and metadata

use jobtoken_crypto::KeyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OidcError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("Could not find issuer corresponding to {credential} for {context}")]
    IssuerNotFound { credential: String, context: String },

    #[error("Token signing failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OidcError>;
