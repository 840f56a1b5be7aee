//! Error types shared across jobtoken crates

use thiserror::Error;

/// Raised when a stored record or a request names an algorithm outside
/// the supported catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported key algorithm: {0}")]
pub struct UnsupportedAlgorithm(pub String);
