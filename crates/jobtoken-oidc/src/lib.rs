//! jobtoken OIDC Provider
//!
//! Issues OpenID Connect ID tokens for running jobs and serves the
//! discovery document and JWKS relying parties need to validate them.

pub mod admin;
pub mod config;
pub mod credential;
pub mod discovery;
pub mod error;
pub mod issuer;
pub mod jwks;
pub mod metadata;
pub mod resolver;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

pub use admin::FormValidation;
pub use config::OidcConfig;
pub use credential::{Credential, CredentialRecord};
pub use discovery::DiscoveryDocument;
pub use error::OidcError;
pub use issuer::{ConfigRequest, Issuer, IssuerFactory, StaticIssuer};
pub use jwks::JsonWebKeySet;
pub use metadata::{MetadataDocument, MetadataResponse};
pub use resolver::IssuerResolver;
pub use token::{IdToken, IdTokenClaims, TokenIssuer};
