//! OIDC Discovery document
//!
//! See "OpenID Provider Metadata" in OpenID Connect Discovery 1.0. Only
//! ID token validation is supported; the authorization and token
//! endpoints are required fields and are advertised with a placeholder.

use crate::metadata::MetadataDocument;
use serde::{Deserialize, Serialize};

/// Value of endpoints this provider does not implement
pub const UNIMPLEMENTED_ENDPOINT: &str = "https://unimplemented";

/// OIDC Discovery document (OpenID Provider Configuration)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryDocument {
    /// Issuer identifier
    pub issuer: String,

    /// JWKS URI
    pub jwks_uri: String,

    /// Supported response types
    pub response_types_supported: Vec<String>,

    /// Supported subject types
    pub subject_types_supported: Vec<String>,

    /// Supported ID token signing algorithms
    pub id_token_signing_alg_values_supported: Vec<String>,

    pub authorization_endpoint: String,

    pub token_endpoint: String,
}

impl DiscoveryDocument {
    /// Build the document for the issuer at `issuer_url`
    pub fn for_issuer(issuer_url: &str) -> Self {
        Self {
            issuer: issuer_url.to_string(),
            jwks_uri: format!("{}{}", issuer_url, MetadataDocument::Jwks.suffix()),
            response_types_supported: vec!["code".to_string()],
            subject_types_supported: vec!["public".to_string()],
            // TODO: advertise the algorithms of the issuer's credentials instead of RS256 only
            id_token_signing_alg_values_supported: vec!["RS256".to_string()],
            authorization_endpoint: UNIMPLEMENTED_ENDPOINT.to_string(),
            token_endpoint: UNIMPLEMENTED_ENDPOINT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_document() {
        let doc = DiscoveryDocument::for_issuer("https://ci.example.org/oidc");

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["issuer"], "https://ci.example.org/oidc");
        assert_eq!(json["jwks_uri"], "https://ci.example.org/oidc/jwks");
        assert_eq!(json["response_types_supported"], serde_json::json!(["code"]));
        assert_eq!(json["subject_types_supported"], serde_json::json!(["public"]));
        assert_eq!(
            json["id_token_signing_alg_values_supported"],
            serde_json::json!(["RS256"])
        );
        assert_eq!(json["authorization_endpoint"], UNIMPLEMENTED_ENDPOINT);
        assert_eq!(json["token_endpoint"], UNIMPLEMENTED_ENDPOINT);
    }

    #[test]
    fn test_discovery_document_for_scoped_issuer() {
        let doc = DiscoveryDocument::for_issuer("https://ci.example.org/oidc/job/team");
        assert_eq!(doc.jwks_uri, "https://ci.example.org/oidc/job/team/jwks");
    }
}
