//! jobtoken Core
//!
//! Core domain types for the jobtoken workload identity provider.
//! This crate defines the signing algorithm catalog and the execution
//! context shared by the key, token and HTTP crates.

pub mod algorithm;
pub mod context;
pub mod error;

pub use algorithm::{Curve, KeyAlgorithm, KeyFamily};
pub use context::ExecutionContext;
pub use error::UnsupportedAlgorithm;
