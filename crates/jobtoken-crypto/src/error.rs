//! Error types for key handling

use jobtoken_core::{KeyAlgorithm, UnsupportedAlgorithm};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyError {
    #[error(transparent)]
    UnsupportedAlgorithm(#[from] UnsupportedAlgorithm),

    #[error("Key decode failed: {0}")]
    KeyDecode(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Key material does not belong to the {algorithm} family")]
    AlgorithmMismatch { algorithm: KeyAlgorithm },

    #[error("Key generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, KeyError>;
